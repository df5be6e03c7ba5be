//! Batch forecasting for notification scheduling
//!
//! Forecasts every habit concurrently. A failure for one habit is recorded as
//! an [`ForecastOutcome::Unavailable`] entry carrying the default forecast and
//! never aborts the rest of the batch.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::{StreakForecast, StreakPredictionEngine};
use crate::risk::RiskProfile;

/// Result of forecasting one habit in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    Available(StreakForecast),
    Unavailable {
        habit_id: String,
        reason: String,
        /// Default forecast for display
        fallback: StreakForecast,
    },
}

impl ForecastOutcome {
    pub fn habit_id(&self) -> &str {
        match self {
            ForecastOutcome::Available(forecast) => &forecast.habit_id,
            ForecastOutcome::Unavailable { habit_id, .. } => habit_id,
        }
    }

    /// The real forecast, or the default one if data was unavailable
    pub fn forecast(&self) -> &StreakForecast {
        match self {
            ForecastOutcome::Available(forecast) => forecast,
            ForecastOutcome::Unavailable { fallback, .. } => fallback,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ForecastOutcome::Available(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub as_of: NaiveDate,
    /// One entry per requested habit, in request order
    pub outcomes: Vec<ForecastOutcome>,
}

impl BatchReport {
    pub fn available(&self) -> impl Iterator<Item = &StreakForecast> {
        self.outcomes.iter().filter_map(|o| match o {
            ForecastOutcome::Available(forecast) => Some(forecast),
            ForecastOutcome::Unavailable { .. } => None,
        })
    }

    /// Habit ids whose analytics could not be computed
    pub fn unavailable(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_available())
            .map(|o| o.habit_id())
            .collect()
    }

    /// Forecasts needing a nudge within `horizon_days`: high risk first, then
    /// earliest critical date
    pub fn due_for_nudge(&self, horizon_days: u32) -> Vec<&StreakForecast> {
        let Some(cutoff) = self.as_of.checked_add_days(Days::new(horizon_days as u64)) else {
            return Vec::new();
        };

        let mut due: Vec<&StreakForecast> = self
            .available()
            .filter(|f| f.next_critical_date.is_some_and(|date| date <= cutoff))
            .collect();

        due.sort_by(|a, b| {
            risk_rank(a.risk_profile)
                .cmp(&risk_rank(b.risk_profile))
                .then(a.next_critical_date.cmp(&b.next_critical_date))
                .then(a.habit_id.cmp(&b.habit_id))
        });
        due
    }
}

fn risk_rank(risk: RiskProfile) -> u8 {
    match risk {
        RiskProfile::High => 0,
        RiskProfile::Medium => 1,
        RiskProfile::Low => 2,
    }
}

/// Forecast all `habit_ids` concurrently
pub async fn forecast_habits(
    engine: &StreakPredictionEngine,
    habit_ids: &[String],
    as_of: NaiveDate,
) -> BatchReport {
    let handles: Vec<_> = habit_ids
        .iter()
        .map(|habit_id| {
            let engine = engine.clone();
            let habit_id = habit_id.clone();
            tokio::spawn(async move { engine.try_generate_streak_forecast(&habit_id, as_of).await })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (habit_id, handle) in habit_ids.iter().zip(handles) {
        let outcome = match handle.await {
            Ok(Ok(forecast)) => ForecastOutcome::Available(forecast),
            Ok(Err(err)) => {
                warn!(habit_id = %habit_id, error = %err, "habit analytics unavailable");
                unavailable(habit_id, err.to_string())
            }
            Err(join_err) => {
                warn!(habit_id = %habit_id, error = %join_err, "forecast task failed");
                unavailable(habit_id, join_err.to_string())
            }
        };
        outcomes.push(outcome);
    }

    let report = BatchReport { as_of, outcomes };
    info!(
        requested = habit_ids.len(),
        unavailable = report.unavailable().len(),
        "batch forecast complete"
    );
    report
}

fn unavailable(habit_id: &str, reason: String) -> ForecastOutcome {
    ForecastOutcome::Unavailable {
        habit_id: habit_id.to_string(),
        reason,
        fallback: StreakForecast::default_for(habit_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ForecastPrediction;

    fn forecast(id: &str, risk: RiskProfile, critical: Option<NaiveDate>) -> StreakForecast {
        StreakForecast {
            habit_id: id.to_string(),
            current_streak: 3,
            predictions: ForecastPrediction::new(0.5, 0.5, 0.5),
            risk_profile: risk,
            key_risk_factors: vec![],
            streak_sustainability_score: 40,
            optimal_interventions: vec![],
            next_critical_date: critical,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn test_due_for_nudge_ordering() {
        let report = BatchReport {
            as_of: date(10),
            outcomes: vec![
                ForecastOutcome::Available(forecast("late", RiskProfile::Medium, Some(date(17)))),
                ForecastOutcome::Available(forecast("soon", RiskProfile::Medium, Some(date(13)))),
                ForecastOutcome::Available(forecast("urgent", RiskProfile::High, Some(date(12)))),
                ForecastOutcome::Available(forecast("fine", RiskProfile::Low, None)),
                unavailable("broken", "timeout".to_string()),
            ],
        };

        let due: Vec<&str> = report
            .due_for_nudge(3)
            .iter()
            .map(|f| f.habit_id.as_str())
            .collect();
        assert_eq!(due, vec!["urgent", "soon"]);
        assert_eq!(report.unavailable(), vec!["broken"]);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = unavailable("walk", "store offline".to_string());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(outcome.forecast(), &StreakForecast::default_for("walk"));
    }
}

//! Streak prediction engine
//!
//! Wires the data collaborators to the pure scoring components. The engine
//! holds no mutable state: every call fetches fresh inputs and computes a new
//! result, so one instance can be shared freely across tasks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn, Level};

use crate::config::EngineConfig;
use crate::error::{DataError, Result, StreakRsError};
use crate::forecast::{EnsembleForecastModel, ForecastPrediction};
use crate::intervention::InterventionPlanner;
use crate::models::{Complexity, Mood, TimeOfDay, TimingPattern};
use crate::mood::{MoodAdjustment, MoodDifficultyAdjuster};
use crate::performance::RecentPerformanceAnalyzer;
use crate::recovery::{RecoveryPlan, RecoveryPlanGenerator};
use crate::risk::{RiskClassifier, RiskFactor, RiskProfile};
use crate::source::HabitDataSource;
use crate::sustainability::SustainabilityScorer;

/// Full forecast for one habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakForecast {
    pub habit_id: String,
    pub current_streak: u32,
    pub predictions: ForecastPrediction,
    pub risk_profile: RiskProfile,
    pub key_risk_factors: Vec<RiskFactor>,
    /// Composite 0-100 score
    pub streak_sustainability_score: u8,
    pub optimal_interventions: Vec<String>,
    pub next_critical_date: Option<NaiveDate>,
}

impl StreakForecast {
    /// Forecast returned when habit data cannot be fetched
    pub fn default_for(habit_id: &str) -> Self {
        StreakForecast {
            habit_id: habit_id.to_string(),
            current_streak: 0,
            predictions: ForecastPrediction::new(0.5, 0.4, 0.3),
            risk_profile: RiskProfile::Medium,
            key_risk_factors: vec![RiskFactor::new(
                "insufficient data",
                0.5,
                "track consistently",
            )],
            streak_sustainability_score: 50,
            optimal_interventions: vec!["start with consistency over complexity".to_string()],
            next_critical_date: None,
        }
    }
}

/// Forecasting and recommendation engine over an injected data source
#[derive(Clone)]
pub struct StreakPredictionEngine {
    source: Arc<dyn HabitDataSource>,
    config: EngineConfig,
    model: EnsembleForecastModel,
    classifier: RiskClassifier,
    recovery: RecoveryPlanGenerator,
}

impl StreakPredictionEngine {
    pub fn new(source: Arc<dyn HabitDataSource>) -> Self {
        Self::with_config(source, EngineConfig::default())
    }

    /// Build an engine from `config`. Inconsistent calibration tables are
    /// reported here; scoring still orders every clamp range so forecasting
    /// cannot panic on them.
    pub fn with_config(source: Arc<dyn HabitDataSource>, config: EngineConfig) -> Self {
        if let Err(err) = config.validate() {
            warn!(error = %err, "engine built with an inconsistent configuration");
        }
        StreakPredictionEngine {
            source,
            model: EnsembleForecastModel::with_calibration(config.forecast.clone()),
            classifier: RiskClassifier::with_thresholds(config.risk.clone()),
            recovery: RecoveryPlanGenerator::with_thresholds(config.recovery.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Forecast a habit as of `as_of`, substituting the default forecast when
    /// habit data is unavailable. Never fails.
    #[instrument(skip(self))]
    pub async fn generate_streak_forecast(&self, habit_id: &str, as_of: NaiveDate) -> StreakForecast {
        match self.try_generate_streak_forecast(habit_id, as_of).await {
            Ok(forecast) => forecast,
            Err(err) => {
                log_substitution(habit_id, &err);
                StreakForecast::default_for(habit_id)
            }
        }
    }

    /// Forecast a habit, reporting why data was unavailable instead of
    /// substituting defaults
    pub async fn try_generate_streak_forecast(
        &self,
        habit_id: &str,
        as_of: NaiveDate,
    ) -> Result<StreakForecast> {
        let (streak, pattern, history) = tokio::join!(
            self.source.streak_state(habit_id),
            self.source.timing_pattern(habit_id),
            self.source
                .completion_history(habit_id, self.config.history_days)
        );
        let streak = streak?;
        let pattern = sanitize(habit_id, pattern?)?;
        let history = history?;

        let recent = RecentPerformanceAnalyzer::analyze(&history);
        let predictions = self.model.predict(&streak, &pattern, &recent, as_of);
        let risk_profile = self.classifier.classify(&predictions);
        let key_risk_factors = self.classifier.key_risk_factors(&pattern, &recent);
        let score = SustainabilityScorer::score(&predictions, &pattern, &streak);
        let plan = InterventionPlanner::plan(risk_profile, &key_risk_factors, &predictions, as_of);

        info!(
            habit_id,
            current_streak = streak.current,
            %risk_profile,
            score,
            "streak forecast generated"
        );

        Ok(StreakForecast {
            habit_id: habit_id.to_string(),
            current_streak: streak.current,
            predictions,
            risk_profile,
            key_risk_factors,
            streak_sustainability_score: score,
            optimal_interventions: plan.interventions,
            next_critical_date: plan.next_critical_date,
        })
    }

    /// Rescale a habit's difficulty for the user's mood and time of day
    pub fn adjust_habit_difficulty(
        &self,
        habit_id: &str,
        habit_title: &str,
        current_mood: Mood,
        baseline_complexity: Complexity,
        time_of_day: TimeOfDay,
    ) -> MoodAdjustment {
        MoodDifficultyAdjuster::adjust(
            habit_id,
            habit_title,
            current_mood,
            baseline_complexity,
            time_of_day,
        )
    }

    /// Plan the comeback after a streak of `broken_streak_length` days broke
    pub fn generate_streak_recovery_plan(
        &self,
        habit_id: &str,
        broken_streak_length: u32,
    ) -> RecoveryPlan {
        self.recovery.generate(habit_id, broken_streak_length)
    }
}

fn sanitize(habit_id: &str, pattern: TimingPattern) -> Result<TimingPattern> {
    if pattern.has_non_finite_rates() {
        return Err(DataError::Malformed {
            habit_id: habit_id.to_string(),
            reason: "non-finite completion rate or streak potential".to_string(),
        }
        .into());
    }
    Ok(pattern.clamped())
}

fn log_substitution(habit_id: &str, err: &StreakRsError) {
    if err.severity().to_tracing_level() == Level::ERROR {
        tracing::error!(habit_id, error = %err, "forecast failed, using default forecast");
    } else {
        warn!(habit_id, error = %err, "habit data unavailable, using default forecast");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompletionEntry, EnergyPattern, StreakState};
    use crate::source::{HabitRecord, SnapshotStore};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
    }

    fn store_with(record: HabitRecord) -> Arc<SnapshotStore> {
        let mut store = SnapshotStore::new();
        store.insert("habit", record);
        Arc::new(store)
    }

    fn healthy_record() -> HabitRecord {
        HabitRecord {
            title: Some("Stretch".to_string()),
            streak: Some(StreakState::new(20, 20)),
            timing: Some(TimingPattern {
                completion_rate: 0.95,
                optimal_hours: vec![7],
                difficult_days: vec![],
                energy_pattern: EnergyPattern::Morning,
                streak_potential: 0.9,
            }),
            history: (0..14)
                .map(|i| CompletionEntry::new(as_of() - chrono::Duration::days(i), true))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_default_forecast_for_unknown_habit() {
        let engine = StreakPredictionEngine::new(Arc::new(SnapshotStore::new()));
        let first = engine.generate_streak_forecast("missing", as_of()).await;
        let second = engine.generate_streak_forecast("missing", as_of()).await;

        assert_eq!(first, StreakForecast::default_for("missing"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_try_forecast_surfaces_data_error() {
        let engine = StreakPredictionEngine::new(store_with(HabitRecord {
            streak: None,
            ..healthy_record()
        }));
        let err = engine
            .try_generate_streak_forecast("habit", as_of())
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_non_finite_rate_falls_back() {
        let mut record = healthy_record();
        if let Some(timing) = record.timing.as_mut() {
            timing.completion_rate = f64::NAN;
        }
        let engine = StreakPredictionEngine::new(store_with(record));

        let forecast = engine.generate_streak_forecast("habit", as_of()).await;
        assert_eq!(forecast, StreakForecast::default_for("habit"));
    }

    #[tokio::test]
    async fn test_healthy_habit_gets_weekly_check_in() {
        let engine = StreakPredictionEngine::new(store_with(healthy_record()));
        let forecast = engine.generate_streak_forecast("habit", as_of()).await;

        assert_eq!(forecast.current_streak, 20);
        assert_eq!(forecast.risk_profile, RiskProfile::Medium);
        assert!(forecast.predictions.day7 > 0.75);
        assert!(forecast.key_risk_factors.is_empty());
        assert_eq!(forecast.optimal_interventions.len(), 2);
        assert_eq!(
            forecast.next_critical_date,
            NaiveDate::from_ymd_opt(2024, 4, 17)
        );
    }

    #[tokio::test]
    async fn test_inverted_bounds_do_not_panic() {
        let mut config = EngineConfig::default();
        config.forecast.min_probability = 0.9;
        config.forecast.max_probability = 0.1;
        config.forecast.trend_factor_min = 1.5;
        config.forecast.trend_factor_max = 0.2;
        assert!(config.validate().is_err());

        let engine = StreakPredictionEngine::with_config(store_with(healthy_record()), config);
        let forecast = engine.generate_streak_forecast("habit", as_of()).await;

        for p in [
            forecast.predictions.day7,
            forecast.predictions.day14,
            forecast.predictions.day30,
        ] {
            assert!((0.1..=0.9).contains(&p));
        }
    }

    #[test]
    fn test_default_forecast_text() {
        let forecast = StreakForecast::default_for("habit");
        assert_eq!(forecast.key_risk_factors[0].factor, "insufficient data");
        assert_eq!(forecast.key_risk_factors[0].mitigation, "track consistently");
        assert_eq!(
            forecast.optimal_interventions,
            vec!["start with consistency over complexity".to_string()]
        );
    }

    #[test]
    fn test_sync_operations_delegate() {
        let engine = StreakPredictionEngine::new(Arc::new(SnapshotStore::new()));
        let plan = engine.generate_streak_recovery_plan("habit", 15);
        assert_eq!(plan.actions.len(), 5);

        let adjustment = engine.adjust_habit_difficulty(
            "habit",
            "Stretch",
            Mood::Frustrated,
            Complexity::Easy,
            TimeOfDay::Afternoon,
        );
        assert_eq!(adjustment.adjusted_complexity, Complexity::Easy);
    }
}

//! Turns a risk tier and its factors into an ordered action list and the date
//! by which the user should next be nudged.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::forecast::ForecastPrediction;
use crate::risk::{RiskFactor, RiskProfile};

pub const MAX_INTERVENTIONS: usize = 4;
const MAX_FACTOR_MITIGATIONS: usize = 2;

/// Low-risk habits above this 14-day survival need no check-in
const NO_INTERVENTION_DAY14: f64 = 0.7;
/// Below this 7-day survival the check-in is pulled forward
const SHAKY_DAY7: f64 = 0.6;

const HIGH_RISK_DAYS_AHEAD: u64 = 2;
const SHAKY_DAYS_AHEAD: u64 = 3;
const ROUTINE_DAYS_AHEAD: u64 = 7;

/// Suggested actions and next check-in date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionPlan {
    pub interventions: Vec<String>,
    pub next_critical_date: Option<NaiveDate>,
}

pub struct InterventionPlanner;

impl InterventionPlanner {
    pub fn plan(
        risk: RiskProfile,
        factors: &[RiskFactor],
        prediction: &ForecastPrediction,
        as_of: NaiveDate,
    ) -> InterventionPlan {
        InterventionPlan {
            interventions: Self::interventions(risk, factors),
            next_critical_date: Self::next_critical_date(risk, prediction, as_of),
        }
    }

    /// Tier suggestions first, then up to two distinct factor mitigations
    pub fn interventions(risk: RiskProfile, factors: &[RiskFactor]) -> Vec<String> {
        let mut actions: Vec<String> = tier_suggestions(risk)
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut added = 0;
        for factor in factors {
            if added == MAX_FACTOR_MITIGATIONS || actions.len() == MAX_INTERVENTIONS {
                break;
            }
            if !actions.contains(&factor.mitigation) {
                actions.push(factor.mitigation.clone());
                added += 1;
            }
        }

        actions.truncate(MAX_INTERVENTIONS);
        actions
    }

    pub fn next_critical_date(
        risk: RiskProfile,
        prediction: &ForecastPrediction,
        as_of: NaiveDate,
    ) -> Option<NaiveDate> {
        if risk == RiskProfile::Low && prediction.day14 > NO_INTERVENTION_DAY14 {
            return None;
        }

        let days_ahead = if risk == RiskProfile::High {
            HIGH_RISK_DAYS_AHEAD
        } else if prediction.day7 < SHAKY_DAY7 {
            SHAKY_DAYS_AHEAD
        } else {
            ROUTINE_DAYS_AHEAD
        };

        as_of.checked_add_days(Days::new(days_ahead))
    }
}

fn tier_suggestions(risk: RiskProfile) -> &'static [&'static str] {
    match risk {
        RiskProfile::High => &[
            "Reduce the habit to its smallest version that still counts",
            "Focus on a two-minute micro-habit until the streak stabilizes",
        ],
        RiskProfile::Medium => &[
            "Review when and where you do this habit",
            "Add environmental cues that make starting easier",
        ],
        RiskProfile::Low => &[
            "Consider gradually expanding the habit's scope",
            "Keep your current routine and celebrate the consistency",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tier_suggestions_come_first() {
        let factors = vec![
            RiskFactor::new("a", 0.9, "Consider a streak reset with an easier goal"),
            RiskFactor::new("b", 0.8, "Reduce habit complexity and build consistency first"),
            RiskFactor::new("c", 0.7, "Review what changed in your routine recently"),
        ];
        let actions = InterventionPlanner::interventions(RiskProfile::High, &factors);

        assert_eq!(actions.len(), 4);
        assert_eq!(actions[0], tier_suggestions(RiskProfile::High)[0]);
        assert_eq!(actions[2], "Consider a streak reset with an easier goal");
        assert_eq!(actions[3], "Reduce habit complexity and build consistency first");
    }

    #[test]
    fn test_duplicate_mitigations_are_skipped() {
        let factors = vec![
            RiskFactor::new("a", 0.9, "Same advice"),
            RiskFactor::new("b", 0.8, "Same advice"),
            RiskFactor::new("c", 0.7, "Different advice"),
        ];
        let actions = InterventionPlanner::interventions(RiskProfile::Medium, &factors);
        assert_eq!(
            actions[2..].to_vec(),
            vec!["Same advice".to_string(), "Different advice".to_string()]
        );
    }

    #[test]
    fn test_no_critical_date_for_safe_habit() {
        let prediction = ForecastPrediction::new(0.9, 0.85, 0.8);
        assert_eq!(
            InterventionPlanner::next_critical_date(RiskProfile::Low, &prediction, date(2024, 4, 10)),
            None
        );
    }

    #[test]
    fn test_critical_date_offsets() {
        let today = date(2024, 4, 10);

        let high = ForecastPrediction::new(0.4, 0.3, 0.2);
        assert_eq!(
            InterventionPlanner::next_critical_date(RiskProfile::High, &high, today),
            Some(date(2024, 4, 12))
        );

        let shaky = ForecastPrediction::new(0.55, 0.6, 0.5);
        assert_eq!(
            InterventionPlanner::next_critical_date(RiskProfile::Medium, &shaky, today),
            Some(date(2024, 4, 13))
        );

        let steady = ForecastPrediction::new(0.712, 0.621, 0.525);
        assert_eq!(
            InterventionPlanner::next_critical_date(RiskProfile::Medium, &steady, today),
            Some(date(2024, 4, 17))
        );

        // Low risk but 14-day survival not convincing
        let low = ForecastPrediction::new(0.95, 0.7, 0.65);
        assert_eq!(
            InterventionPlanner::next_critical_date(RiskProfile::Low, &low, today),
            Some(date(2024, 4, 17))
        );
    }
}

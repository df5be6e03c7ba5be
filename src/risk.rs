use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::forecast::ForecastPrediction;
use crate::models::TimingPattern;
use crate::performance::RecentPerformance;

/// Maximum number of risk factors reported per forecast
pub const MAX_RISK_FACTORS: usize = 3;

/// How likely the streak is to break soon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskProfile::Low => write!(f, "low"),
            RiskProfile::Medium => write!(f, "medium"),
            RiskProfile::High => write!(f, "high"),
        }
    }
}

/// A named contributor to streak risk with a suggested counter-measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    /// Relative weight of this factor (0-1)
    pub impact: f64,
    pub mitigation: String,
}

impl RiskFactor {
    pub fn new(factor: impl Into<String>, impact: f64, mitigation: impl Into<String>) -> Self {
        RiskFactor {
            factor: factor.into(),
            impact,
            mitigation: mitigation.into(),
        }
    }
}

/// Tier cut-offs and factor triggers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Average prediction above which risk is low
    pub low_risk_above: f64,
    /// Average prediction above which risk is medium
    pub medium_risk_above: f64,
    pub low_completion_rate: f64,
    pub declining_slope: f64,
    pub max_difficult_days: usize,
    pub poor_recent7: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            low_risk_above: 0.75,
            medium_risk_above: 0.5,
            low_completion_rate: 0.6,
            declining_slope: -0.1,
            max_difficult_days: 2,
            poor_recent7: 0.5,
        }
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> Result<(), String> {
        if self.medium_risk_above > self.low_risk_above {
            return Err("medium_risk_above exceeds low_risk_above".to_string());
        }
        Ok(())
    }
}

/// Maps forecasts to risk tiers and explains what drives the risk
#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    thresholds: RiskThresholds,
}

impl RiskClassifier {
    pub fn new() -> Self {
        RiskClassifier::default()
    }

    pub fn with_thresholds(thresholds: RiskThresholds) -> Self {
        RiskClassifier { thresholds }
    }

    /// Risk tier from the mean of the three horizons
    pub fn classify(&self, prediction: &ForecastPrediction) -> RiskProfile {
        let avg = prediction.average();
        if avg > self.thresholds.low_risk_above {
            RiskProfile::Low
        } else if avg > self.thresholds.medium_risk_above {
            RiskProfile::Medium
        } else {
            RiskProfile::High
        }
    }

    /// Up to three triggered factors, highest impact first
    pub fn key_risk_factors(
        &self,
        pattern: &TimingPattern,
        recent: &RecentPerformance,
    ) -> Vec<RiskFactor> {
        let t = &self.thresholds;
        let mut factors = Vec::new();

        if pattern.completion_rate < t.low_completion_rate {
            factors.push(RiskFactor::new(
                "Low overall completion rate",
                0.8,
                "Reduce habit complexity and build consistency first",
            ));
        }

        if recent.slope < t.declining_slope {
            factors.push(RiskFactor::new(
                "Declining recent performance",
                0.7,
                "Review what changed in your routine recently",
            ));
        }

        let difficult_days = pattern.distinct_difficult_days();
        if difficult_days.len() > t.max_difficult_days {
            factors.push(RiskFactor::new(
                "Struggles on specific days",
                0.6,
                format!(
                    "Create a specific strategy for {}",
                    weekday_name(difficult_days[0])
                ),
            ));
        }

        if recent.recent7 < t.poor_recent7 {
            factors.push(RiskFactor::new(
                "Poor performance in the last week",
                0.9,
                "Consider a streak reset with an easier goal",
            ));
        }

        // Stable sort keeps evaluation order among equal impacts
        factors.sort_by(|a, b| b.impact.total_cmp(&a.impact));
        factors.truncate(MAX_RISK_FACTORS);
        factors
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mondays",
        Weekday::Tue => "Tuesdays",
        Weekday::Wed => "Wednesdays",
        Weekday::Thu => "Thursdays",
        Weekday::Fri => "Fridays",
        Weekday::Sat => "Saturdays",
        Weekday::Sun => "Sundays",
    }
}

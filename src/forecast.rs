//! Ensemble streak-survival forecasting.
//!
//! Three independent estimators each predict the probability that the current
//! streak survives 7, 14 and 30 more days:
//!
//! - **Baseline**: long-run completion rate, streak stability and the analyzer's
//!   streak potential, decayed per horizon.
//! - **Trend**: recent completion rates scaled by the short-window slope.
//! - **Seasonal**: a flat prior adjusted for weekends and a per-month calibration.
//!
//! The three are combined with fixed per-horizon weights and clamped so no
//! forecast ever claims certainty either way.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{StreakState, TimingPattern};
use crate::performance::RecentPerformance;

/// Survival probabilities for the three forecast horizons
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPrediction {
    pub day7: f64,
    pub day14: f64,
    pub day30: f64,
}

impl ForecastPrediction {
    pub fn new(day7: f64, day14: f64, day30: f64) -> Self {
        ForecastPrediction { day7, day14, day30 }
    }

    /// Mean over the three horizons
    pub fn average(&self) -> f64 {
        (self.day7 + self.day14 + self.day30) / 3.0
    }

    fn clamp(&self, min: f64, max: f64) -> Self {
        ForecastPrediction {
            day7: bounded(self.day7, min, max),
            day14: bounded(self.day14, min, max),
            day30: bounded(self.day30, min, max),
        }
    }
}

/// Per-horizon triple of multipliers, caps or weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonTable {
    pub day7: f64,
    pub day14: f64,
    pub day30: f64,
}

impl HorizonTable {
    pub const fn new(day7: f64, day14: f64, day30: f64) -> Self {
        HorizonTable { day7, day14, day30 }
    }
}

/// Weight given to each sub-model at one horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    pub baseline: f64,
    pub trend: f64,
    pub seasonal: f64,
}

impl ModelWeights {
    pub const fn new(baseline: f64, trend: f64, seasonal: f64) -> Self {
        ModelWeights {
            baseline,
            trend,
            seasonal,
        }
    }

    pub fn sum(&self) -> f64 {
        self.baseline + self.trend + self.seasonal
    }
}

/// Month factors, January first
pub const MONTH_FACTORS: [f64; 12] = [
    0.9, 0.85, 0.95, 1.0, 1.05, 1.05, 0.95, 0.95, 1.0, 0.95, 0.85, 0.8,
];

/// Calibration constants for the ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastCalibration {
    /// Streak stability gained per day of current streak
    pub streak_stability_per_day: f64,

    /// Ceiling on streak stability
    pub streak_stability_cap: f64,

    /// Baseline decay per horizon
    pub baseline_decay: HorizonTable,

    /// Upper bound of the baseline and trend models per horizon
    pub horizon_caps: HorizonTable,

    /// Trend decay per horizon (day7 uses recent7, the rest recent14)
    pub trend_decay: HorizonTable,

    /// Allowed range of `1 + slope`
    pub trend_factor_min: f64,
    pub trend_factor_max: f64,

    /// Seasonal prior before adjustment
    pub base_seasonal: f64,

    /// Multiplier applied on Saturday and Sunday
    pub weekend_penalty: f64,

    /// Seasonal horizon decay (day30 never takes the weekend penalty)
    pub seasonal_decay: HorizonTable,

    /// January..December calibration
    pub month_factors: Vec<f64>,

    pub weights_day7: ModelWeights,
    pub weights_day14: ModelWeights,
    pub weights_day30: ModelWeights,

    /// Output clamp bounds
    pub min_probability: f64,
    pub max_probability: f64,
}

impl Default for ForecastCalibration {
    fn default() -> Self {
        ForecastCalibration {
            streak_stability_per_day: 0.05,
            streak_stability_cap: 0.3,
            baseline_decay: HorizonTable::new(0.95, 0.85, 0.70),
            horizon_caps: HorizonTable::new(0.95, 0.90, 0.85),
            trend_decay: HorizonTable::new(1.0, 0.9, 0.7),
            trend_factor_min: 0.1,
            trend_factor_max: 1.9,
            base_seasonal: 0.7,
            weekend_penalty: 0.9,
            seasonal_decay: HorizonTable::new(1.0, 0.9, 0.8),
            month_factors: MONTH_FACTORS.to_vec(),
            weights_day7: ModelWeights::new(0.4, 0.4, 0.2),
            weights_day14: ModelWeights::new(0.4, 0.4, 0.2),
            weights_day30: ModelWeights::new(0.3, 0.5, 0.2),
            min_probability: 0.05,
            max_probability: 0.95,
        }
    }
}

impl ForecastCalibration {
    /// Check the tables are internally consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.month_factors.len() != 12 {
            return Err(format!(
                "month_factors must have 12 entries, found {}",
                self.month_factors.len()
            ));
        }
        if self.min_probability > self.max_probability {
            return Err("min_probability exceeds max_probability".to_string());
        }
        if self.trend_factor_min > self.trend_factor_max {
            return Err("trend_factor_min exceeds trend_factor_max".to_string());
        }
        for (name, weights) in [
            ("weights_day7", &self.weights_day7),
            ("weights_day14", &self.weights_day14),
            ("weights_day30", &self.weights_day30),
        ] {
            if (weights.sum() - 1.0).abs() > 1e-6 {
                return Err(format!("{} must sum to 1.0, found {:.3}", name, weights.sum()));
            }
        }
        Ok(())
    }

    /// Factor for the month of `date`; 1.0 if the table is short
    pub fn month_factor(&self, date: NaiveDate) -> f64 {
        self.month_factors
            .get(date.month0() as usize)
            .copied()
            .unwrap_or(1.0)
    }
}

/// Outputs of every sub-model alongside the combined forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleBreakdown {
    pub baseline: ForecastPrediction,
    pub trend: ForecastPrediction,
    pub seasonal: ForecastPrediction,
    pub ensemble: ForecastPrediction,
}

/// Weighted ensemble of baseline, trend and seasonal estimators
#[derive(Debug, Clone, Default)]
pub struct EnsembleForecastModel {
    calibration: ForecastCalibration,
}

impl EnsembleForecastModel {
    pub fn new() -> Self {
        EnsembleForecastModel::default()
    }

    pub fn with_calibration(calibration: ForecastCalibration) -> Self {
        EnsembleForecastModel { calibration }
    }

    pub fn calibration(&self) -> &ForecastCalibration {
        &self.calibration
    }

    /// Forecast streak survival as of `as_of`
    pub fn predict(
        &self,
        streak: &StreakState,
        pattern: &TimingPattern,
        recent: &RecentPerformance,
        as_of: NaiveDate,
    ) -> ForecastPrediction {
        self.predict_with_breakdown(streak, pattern, recent, as_of)
            .ensemble
    }

    /// Forecast and keep the individual sub-model outputs
    pub fn predict_with_breakdown(
        &self,
        streak: &StreakState,
        pattern: &TimingPattern,
        recent: &RecentPerformance,
        as_of: NaiveDate,
    ) -> EnsembleBreakdown {
        let baseline = self.baseline_model(streak, pattern);
        let trend = self.trend_model(recent);
        let seasonal = self.seasonal_model(as_of);
        let ensemble = self.combine(&baseline, &trend, &seasonal);

        debug!(
            ?baseline,
            ?trend,
            ?seasonal,
            ?ensemble,
            "ensemble forecast computed"
        );

        EnsembleBreakdown {
            baseline,
            trend,
            seasonal,
            ensemble,
        }
    }

    pub fn baseline_model(
        &self,
        streak: &StreakState,
        pattern: &TimingPattern,
    ) -> ForecastPrediction {
        let c = &self.calibration;
        let streak_stability =
            (streak.current as f64 * c.streak_stability_per_day).min(c.streak_stability_cap);
        let consistency = pattern.streak_potential;
        let baseline = (pattern.completion_rate + streak_stability + consistency) / 3.0;

        ForecastPrediction {
            day7: (baseline * c.baseline_decay.day7).min(c.horizon_caps.day7),
            day14: (baseline * c.baseline_decay.day14).min(c.horizon_caps.day14),
            day30: (baseline * c.baseline_decay.day30).min(c.horizon_caps.day30),
        }
    }

    pub fn trend_model(&self, recent: &RecentPerformance) -> ForecastPrediction {
        let c = &self.calibration;
        let trend_factor = bounded(1.0 + recent.slope, c.trend_factor_min, c.trend_factor_max);

        ForecastPrediction {
            day7: (recent.recent7 * trend_factor * c.trend_decay.day7).min(c.horizon_caps.day7),
            day14: (recent.recent14 * trend_factor * c.trend_decay.day14)
                .min(c.horizon_caps.day14),
            day30: (recent.recent14 * trend_factor * c.trend_decay.day30)
                .min(c.horizon_caps.day30),
        }
    }

    pub fn seasonal_model(&self, as_of: NaiveDate) -> ForecastPrediction {
        let c = &self.calibration;
        let weekend_penalty = if is_weekend(as_of) {
            c.weekend_penalty
        } else {
            1.0
        };
        let month_factor = c.month_factor(as_of);
        let short_term = c.base_seasonal * weekend_penalty * month_factor;

        ForecastPrediction {
            day7: short_term * c.seasonal_decay.day7,
            day14: short_term * c.seasonal_decay.day14,
            day30: c.base_seasonal * month_factor * c.seasonal_decay.day30,
        }
    }

    fn combine(
        &self,
        baseline: &ForecastPrediction,
        trend: &ForecastPrediction,
        seasonal: &ForecastPrediction,
    ) -> ForecastPrediction {
        let c = &self.calibration;
        let weigh = |w: &ModelWeights, b: f64, t: f64, s: f64| {
            let total = w.sum();
            if total <= 0.0 {
                return (b + t + s) / 3.0;
            }
            (w.baseline * b + w.trend * t + w.seasonal * s) / total
        };

        ForecastPrediction {
            day7: weigh(&c.weights_day7, baseline.day7, trend.day7, seasonal.day7),
            day14: weigh(&c.weights_day14, baseline.day14, trend.day14, seasonal.day14),
            day30: weigh(&c.weights_day30, baseline.day30, trend.day30, seasonal.day30),
        }
        .clamp(c.min_probability, c.max_probability)
    }
}

/// Clamp into the range spanned by `a` and `b`, whichever order they come in
fn bounded(value: f64, a: f64, b: f64) -> f64 {
    value.max(a.min(b)).min(a.max(b))
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

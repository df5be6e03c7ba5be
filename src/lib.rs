// Library interface for StreakRS modules
// Forecasting and adaptive-recommendation core for habit streaks

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod forecast;
pub mod intervention;
pub mod logging;
pub mod models;
pub mod mood;
pub mod performance;
pub mod recovery;
pub mod risk;
pub mod source;
pub mod sustainability;

// Re-export commonly used types for convenience
pub use models::*;
pub use batch::{forecast_habits, BatchReport, ForecastOutcome};
pub use config::{AppConfig, EngineConfig};
pub use engine::{StreakForecast, StreakPredictionEngine};
pub use error::{DataError, Result, StreakRsError};
pub use forecast::{EnsembleForecastModel, ForecastCalibration, ForecastPrediction};
pub use intervention::{InterventionPlan, InterventionPlanner};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use mood::{MoodAdjustment, MoodDifficultyAdjuster, MotivationalApproach};
pub use performance::{RecentPerformance, RecentPerformanceAnalyzer};
pub use recovery::{RecoveryPlan, RecoveryPlanGenerator, RecoveryStrategy};
pub use risk::{RiskClassifier, RiskFactor, RiskProfile};
pub use source::{HabitDataSource, HabitRecord, SnapshotStore};
pub use sustainability::SustainabilityScorer;

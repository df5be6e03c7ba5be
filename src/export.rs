use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::batch::{BatchReport, ForecastOutcome};
use crate::error::{Result, StreakRsError};

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = StreakRsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(StreakRsError::Validation(format!(
                "Unsupported export format: {}",
                s
            ))),
        }
    }
}

/// One flattened CSV line per habit
#[derive(Debug, Serialize)]
struct ForecastRow<'a> {
    habit_id: &'a str,
    available: bool,
    current_streak: u32,
    day7: f64,
    day14: f64,
    day30: f64,
    risk_profile: String,
    sustainability_score: u8,
    next_critical_date: String,
    top_risk_factor: &'a str,
    interventions: String,
}

impl<'a> ForecastRow<'a> {
    fn from_outcome(outcome: &'a ForecastOutcome) -> Self {
        let forecast = outcome.forecast();
        ForecastRow {
            habit_id: outcome.habit_id(),
            available: outcome.is_available(),
            current_streak: forecast.current_streak,
            day7: round3(forecast.predictions.day7),
            day14: round3(forecast.predictions.day14),
            day30: round3(forecast.predictions.day30),
            risk_profile: forecast.risk_profile.to_string(),
            sustainability_score: forecast.streak_sustainability_score,
            next_critical_date: forecast
                .next_critical_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            top_risk_factor: forecast
                .key_risk_factors
                .first()
                .map(|f| f.factor.as_str())
                .unwrap_or(""),
            interventions: forecast.optimal_interventions.join("; "),
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub fn export_report<P: AsRef<Path>>(
    report: &BatchReport,
    format: ExportFormat,
    output_path: P,
) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(report, output_path),
        ExportFormat::Json => write_json(report, output_path),
    }
}

/// Write the full report, including unavailable habits, as pretty JSON
pub fn write_json<P: AsRef<Path>>(report: &BatchReport, output_path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&output_path, json)?;
    tracing::info!(path = %output_path.as_ref().display(), "forecast report written");
    Ok(())
}

/// Write one row per habit; unavailable habits carry their default forecast
pub fn write_csv<P: AsRef<Path>>(report: &BatchReport, output_path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(&output_path)?;
    for outcome in &report.outcomes {
        writer.serialize(ForecastRow::from_outcome(outcome))?;
    }
    writer.flush()?;
    tracing::info!(path = %output_path.as_ref().display(), "forecast report written");
    Ok(())
}

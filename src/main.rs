use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Timelike};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};

use streakrs::export::{export_report, ExportFormat};
use streakrs::logging::{init_logging, LogLevel};
use streakrs::error::ErrorSeverity;
use streakrs::{
    forecast_habits, AppConfig, Complexity, Mood, RecoveryPlan, RiskProfile, SnapshotStore,
    StreakForecast, StreakPredictionEngine, StreakRsError, TimeOfDay,
};

/// StreakRS - Habit Streak Forecasting CLI
///
/// Predicts whether habit streaks will hold, adapts difficulty to mood and
/// time of day, and plans recoveries after a streak breaks.
#[derive(Parser)]
#[command(name = "streakrs")]
#[command(author = "StreakRS Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Habit Streak Forecasting CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast streak survival for one habit
    Forecast {
        /// Habit snapshot file (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Habit ID
        #[arg(long)]
        habit: String,

        /// Evaluation date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Forecast every habit in a snapshot and list those due for a nudge
    Batch {
        /// Habit snapshot file (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Evaluation date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format (csv, json)
        #[arg(short = 'f', long, default_value = "csv")]
        format: String,
    },

    /// Adjust a habit's difficulty to the current mood
    Adjust {
        /// Habit ID
        #[arg(long)]
        habit: String,

        /// Habit title used in suggestions
        #[arg(long)]
        title: String,

        /// Current mood (content, neutral, sad, frustrated, excited)
        #[arg(short, long)]
        mood: Mood,

        /// Baseline complexity (easy, medium, hard)
        #[arg(short = 'x', long, default_value = "medium")]
        complexity: Complexity,

        /// Time of day (morning, afternoon, evening, night; default: now)
        #[arg(short, long)]
        time_of_day: Option<TimeOfDay>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Plan a recovery after a broken streak
    Recover {
        /// Habit ID
        #[arg(long)]
        habit: String,

        /// Length of the streak that broke, in days
        #[arg(short, long)]
        length: u32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(short, long)]
        init: bool,
    },
}

#[derive(Tabled)]
struct HorizonRow {
    #[tabled(rename = "Horizon")]
    horizon: &'static str,
    #[tabled(rename = "Survival")]
    probability: String,
}

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "Day")]
    day: u32,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Difficulty")]
    difficulty: String,
}

#[derive(Tabled)]
struct NudgeRow {
    #[tabled(rename = "Habit")]
    habit: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "Score")]
    score: u8,
    #[tabled(rename = "Check in by")]
    date: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        report_error(&err);
        std::process::exit(1);
    }
}

fn report_error(err: &anyhow::Error) {
    match StreakRsError::find_in(err) {
        Some(cause) => {
            let label = match cause.severity() {
                ErrorSeverity::Warning => "Warning:".yellow().bold(),
                ErrorSeverity::Error => "Error:".red().bold(),
            };
            eprintln!("{} {}", label, cause.user_message());
            tracing::debug!(error = %format!("{:#}", err), "command failed");
        }
        None => eprintln!("{} {:#}", "Error:".red().bold(), err),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };
    config.logging.level = LogLevel::from_verbosity(config.logging.level, cli.verbose);
    init_logging(&config.logging)?;

    let today = Local::now().date_naive();

    match cli.command {
        Commands::Forecast {
            data,
            habit,
            date,
            json,
        } => {
            let engine = engine_for(&data, &config)?;
            let forecast = engine
                .generate_streak_forecast(&habit, date.unwrap_or(today))
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
            } else {
                print_forecast(&forecast);
            }
        }

        Commands::Batch {
            data,
            date,
            output,
            format,
        } => {
            let store = load_store(&data)?;
            let habit_ids = store.habit_ids();
            let engine = StreakPredictionEngine::with_config(Arc::new(store), config.engine.clone());
            let as_of = date.unwrap_or(today);
            let report = forecast_habits(&engine, &habit_ids, as_of).await;

            println!(
                "{}",
                format!("Forecasted {} habits as of {}", habit_ids.len(), as_of)
                    .cyan()
                    .bold()
            );

            let unavailable = report.unavailable();
            if !unavailable.is_empty() {
                println!(
                    "{}",
                    format!("⚠ Analytics unavailable for: {}", unavailable.join(", ")).yellow()
                );
            }

            let rows: Vec<NudgeRow> = report
                .due_for_nudge(config.engine.nudge_horizon_days)
                .into_iter()
                .map(|f| NudgeRow {
                    habit: f.habit_id.clone(),
                    risk: f.risk_profile.to_string(),
                    score: f.streak_sustainability_score,
                    date: f
                        .next_critical_date
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                })
                .collect();

            if rows.is_empty() {
                println!("{}", "✓ No habits need a nudge".green());
            } else {
                println!("{}", Table::new(rows).with(Style::rounded()));
            }

            if let Some(path) = output {
                let format: ExportFormat = format.parse()?;
                export_report(&report, format, &path)?;
                println!("{}", format!("✓ Report written to {}", path.display()).green());
            }
        }

        Commands::Adjust {
            habit,
            title,
            mood,
            complexity,
            time_of_day,
            json,
        } => {
            let time_of_day =
                time_of_day.unwrap_or_else(|| TimeOfDay::from_hour(Local::now().hour()));
            let engine = StreakPredictionEngine::with_config(
                Arc::new(SnapshotStore::new()),
                config.engine.clone(),
            );
            let adjustment =
                engine.adjust_habit_difficulty(&habit, &title, mood, complexity, time_of_day);

            if json {
                println!("{}", serde_json::to_string_pretty(&adjustment)?);
            } else {
                println!(
                    "{} {} → {}",
                    title.bold(),
                    adjustment.baseline_complexity.to_string().dimmed(),
                    adjustment.adjusted_complexity.to_string().cyan().bold()
                );
                let modification = &adjustment.suggestion_modification;
                if let Some(pct) = modification.time_reduction_pct {
                    println!("  Shorten the session by {}%", pct);
                }
                println!("  {}", modification.energy_adjustment);
                if let Some(alt) = &modification.alternative_suggestion {
                    println!("  Alternative: {}", alt.italic());
                }
                println!("  Tone: {}", adjustment.motivational_approach);
                for tip in &adjustment.contextual_tips {
                    println!("  • {}", tip);
                }
            }
        }

        Commands::Recover {
            habit,
            length,
            json,
        } => {
            let engine = StreakPredictionEngine::with_config(
                Arc::new(SnapshotStore::new()),
                config.engine.clone(),
            );
            let plan = engine.generate_streak_recovery_plan(&habit, length);

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_recovery_plan(&plan);
            }
        }

        Commands::Config { show, init } => {
            if init {
                let mut fresh = AppConfig::default();
                let path = match &cli.config {
                    Some(path) => {
                        fresh.save_to_file(path)?;
                        path.clone()
                    }
                    None => {
                        fresh.save_default()?;
                        AppConfig::default_config_path()
                    }
                };
                println!("{}", format!("✓ Wrote {}", path.display()).green());
            }
            if show || !init {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn load_store(path: &Path) -> Result<SnapshotStore> {
    SnapshotStore::load_from_file(path)
        .with_context(|| format!("Failed to load habit snapshot: {}", path.display()))
}

fn engine_for(path: &Path, config: &AppConfig) -> Result<StreakPredictionEngine> {
    let store = load_store(path)?;
    Ok(StreakPredictionEngine::with_config(
        Arc::new(store),
        config.engine.clone(),
    ))
}

fn risk_label(risk: RiskProfile) -> ColoredString {
    match risk {
        RiskProfile::Low => "LOW".green().bold(),
        RiskProfile::Medium => "MEDIUM".yellow().bold(),
        RiskProfile::High => "HIGH".red().bold(),
    }
}

fn print_forecast(forecast: &StreakForecast) {
    println!(
        "{} {} (current streak: {} days)",
        "Streak forecast for".cyan().bold(),
        forecast.habit_id.bold(),
        forecast.current_streak
    );

    let rows = vec![
        HorizonRow {
            horizon: "7 days",
            probability: format!("{:.0}%", forecast.predictions.day7 * 100.0),
        },
        HorizonRow {
            horizon: "14 days",
            probability: format!("{:.0}%", forecast.predictions.day14 * 100.0),
        },
        HorizonRow {
            horizon: "30 days",
            probability: format!("{:.0}%", forecast.predictions.day30 * 100.0),
        },
    ];
    println!("{}", Table::new(rows).with(Style::rounded()));

    println!(
        "Risk: {}   Sustainability: {}/100",
        risk_label(forecast.risk_profile),
        forecast.streak_sustainability_score
    );

    if !forecast.key_risk_factors.is_empty() {
        println!("{}", "Risk factors:".bold());
        for factor in &forecast.key_risk_factors {
            println!(
                "  • {} ({:.0}%) → {}",
                factor.factor,
                factor.impact * 100.0,
                factor.mitigation.dimmed()
            );
        }
    }

    println!("{}", "Suggested actions:".bold());
    for action in &forecast.optimal_interventions {
        println!("  • {}", action);
    }

    match forecast.next_critical_date {
        Some(date) => println!("Next check-in: {}", date.to_string().yellow()),
        None => println!("{}", "✓ No intervention needed".green()),
    }
}

fn print_recovery_plan(plan: &RecoveryPlan) {
    println!(
        "{} {} after a {}-day streak",
        plan.strategy.to_string().magenta().bold(),
        "plan".magenta(),
        plan.broken_streak_length
    );
    println!("{}", plan.psychological_support.reframing_message.italic());

    let rows: Vec<ActionRow> = plan
        .actions
        .iter()
        .map(|a| ActionRow {
            day: a.day,
            action: a.action.clone(),
            difficulty: format!("{:?}", a.difficulty_level).to_lowercase(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

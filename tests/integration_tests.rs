use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Weekday};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use streakrs::{
    forecast_habits, CompletionEntry, DataError, EnergyPattern, EngineConfig,
    EnsembleForecastModel, ForecastOutcome, HabitDataSource, HabitRecord, InterventionPlanner,
    RecentPerformance, RiskClassifier, RiskProfile, SnapshotStore, StreakForecast,
    StreakPredictionEngine, StreakState, SustainabilityScorer, TimingPattern,
};

/// Integration tests that exercise the engine end-to-end

fn as_of() -> NaiveDate {
    // Wednesday, April: no weekend penalty and a month factor of 1.0
    NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
}

fn timing(completion_rate: f64, streak_potential: f64, difficult_days: Vec<Weekday>) -> TimingPattern {
    TimingPattern {
        completion_rate,
        optimal_hours: vec![7, 8],
        difficult_days,
        energy_pattern: EnergyPattern::Morning,
        streak_potential,
    }
}

/// Most-recent-first log from a chronological pattern ending on `as_of()`
fn history(chronological: &[bool]) -> Vec<CompletionEntry> {
    let len = chronological.len() as i64;
    chronological
        .iter()
        .enumerate()
        .rev()
        .map(|(i, done)| CompletionEntry::new(as_of() - Duration::days(len - 1 - i as i64), *done))
        .collect()
}

fn snapshot() -> SnapshotStore {
    let mut store = SnapshotStore::new();
    store.insert(
        "meditate",
        HabitRecord {
            title: Some("Meditate".to_string()),
            streak: Some(StreakState::new(12, 30)),
            timing: Some(timing(0.85, 0.7, vec![])),
            history: history(&[true; 14]),
        },
    );
    let mut struggling = vec![true; 7];
    struggling.extend([false, false, true, false, false, false, true]);
    store.insert(
        "run",
        HabitRecord {
            title: Some("Run".to_string()),
            streak: Some(StreakState::new(1, 6)),
            timing: Some(timing(
                0.4,
                0.3,
                vec![Weekday::Sat, Weekday::Sun, Weekday::Mon],
            )),
            history: history(&struggling),
        },
    );
    store.insert(
        "journal",
        HabitRecord {
            title: Some("Journal".to_string()),
            streak: None,
            timing: Some(timing(0.6, 0.5, vec![])),
            history: vec![],
        },
    );
    store
}

/// Data source that counts calls and can fail for chosen habits
struct FlakySource {
    inner: SnapshotStore,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FlakySource {
    fn new(inner: SnapshotStore, failing: &[&str]) -> Self {
        FlakySource {
            inner,
            failing: failing.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn check(&self, habit_id: &str, source_name: &str) -> Result<(), DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(habit_id) {
            return Err(DataError::Unavailable {
                habit_id: habit_id.to_string(),
                source_name: source_name.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl HabitDataSource for FlakySource {
    async fn streak_state(&self, habit_id: &str) -> Result<StreakState, DataError> {
        self.check(habit_id, "streak store")?;
        self.inner.streak_state(habit_id).await
    }

    async fn timing_pattern(&self, habit_id: &str) -> Result<TimingPattern, DataError> {
        self.check(habit_id, "timing analyzer")?;
        self.inner.timing_pattern(habit_id).await
    }

    async fn completion_history(
        &self,
        habit_id: &str,
        days: u32,
    ) -> Result<Vec<CompletionEntry>, DataError> {
        self.check(habit_id, "completion ledger")?;
        self.inner.completion_history(habit_id, days).await
    }
}

#[test]
fn test_worked_scenario_pipeline() {
    let streak = StreakState::new(10, 15);
    let pattern = timing(0.8, 0.6, vec![]);
    let recent = RecentPerformance {
        slope: 0.05,
        recent7: 0.85,
        recent14: 0.8,
    };

    let prediction = EnsembleForecastModel::new().predict(&streak, &pattern, &recent, as_of());
    assert!((prediction.day7 - 0.712).abs() < 0.001);
    assert!((prediction.day14 - 0.621).abs() < 0.001);
    assert!((prediction.day30 - 0.525).abs() < 0.001);

    let classifier = RiskClassifier::new();
    assert_eq!(classifier.classify(&prediction), RiskProfile::Medium);
    assert!(classifier.key_risk_factors(&pattern, &recent).is_empty());
    assert_eq!(SustainabilityScorer::score(&prediction, &pattern, &streak), 57);
}

#[tokio::test]
async fn test_struggling_habit_forecast() {
    let engine = StreakPredictionEngine::new(Arc::new(snapshot()));
    let forecast = engine.generate_streak_forecast("run", as_of()).await;

    assert_eq!(forecast.current_streak, 1);
    assert_eq!(forecast.risk_profile, RiskProfile::High);
    assert_eq!(forecast.key_risk_factors.len(), 3);
    assert_eq!(forecast.key_risk_factors[0].impact, 0.9);
    assert!(forecast
        .key_risk_factors
        .windows(2)
        .all(|w| w[0].impact >= w[1].impact));
    assert_eq!(forecast.optimal_interventions.len(), 4);
    assert_eq!(forecast.next_critical_date, NaiveDate::from_ymd_opt(2024, 4, 12));
    assert!(forecast.streak_sustainability_score <= 100);
}

#[tokio::test]
async fn test_interventions_are_reproducible_from_forecast() {
    let engine = StreakPredictionEngine::new(Arc::new(snapshot()));

    for habit in ["meditate", "run"] {
        let forecast = engine.generate_streak_forecast(habit, as_of()).await;
        let replanned = InterventionPlanner::plan(
            forecast.risk_profile,
            &forecast.key_risk_factors,
            &forecast.predictions,
            as_of(),
        );
        assert_eq!(replanned.interventions, forecast.optimal_interventions);
        assert_eq!(replanned.next_critical_date, forecast.next_critical_date);
    }
}

#[tokio::test]
async fn test_missing_streak_state_yields_default_forecast() {
    let engine = StreakPredictionEngine::new(Arc::new(snapshot()));
    let forecast = engine.generate_streak_forecast("journal", as_of()).await;

    assert_eq!(forecast, StreakForecast::default_for("journal"));
    assert_eq!(forecast.predictions.day7, 0.5);
    assert_eq!(forecast.predictions.day14, 0.4);
    assert_eq!(forecast.predictions.day30, 0.3);
    assert_eq!(forecast.streak_sustainability_score, 50);
    assert_eq!(forecast.key_risk_factors[0].impact, 0.5);
    assert_eq!(forecast.next_critical_date, None);
}

#[tokio::test]
async fn test_failing_source_never_raises() {
    let source = Arc::new(FlakySource::new(snapshot(), &["meditate"]));
    let engine = StreakPredictionEngine::new(source.clone());

    let forecast = engine.generate_streak_forecast("meditate", as_of()).await;
    assert_eq!(forecast, StreakForecast::default_for("meditate"));
    // All three collaborators are queried concurrently, even when one fails
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_batch_partial_failure() {
    let source = Arc::new(FlakySource::new(snapshot(), &["run"]));
    let engine = StreakPredictionEngine::new(source);
    let ids: Vec<String> = ["meditate", "run", "journal", "ghost"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let report = forecast_habits(&engine, &ids, as_of()).await;

    let order: Vec<&str> = report.outcomes.iter().map(|o| o.habit_id()).collect();
    assert_eq!(order, vec!["meditate", "run", "journal", "ghost"]);
    assert_eq!(report.unavailable(), vec!["run", "journal", "ghost"]);
    assert!(report.outcomes[0].is_available());

    match &report.outcomes[1] {
        ForecastOutcome::Unavailable { reason, fallback, .. } => {
            assert!(reason.contains("connection reset"));
            assert_eq!(fallback, &StreakForecast::default_for("run"));
        }
        other => panic!("expected unavailable outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_history_window_follows_config() {
    let mut config = EngineConfig::default();
    config.history_days = 7;

    let mut store = SnapshotStore::new();
    // Perfect last week, nothing before it
    let mut pattern = vec![false; 7];
    pattern.extend([true; 7]);
    store.insert(
        "walk",
        HabitRecord {
            title: None,
            streak: Some(StreakState::new(7, 7)),
            timing: Some(timing(0.5, 0.5, vec![])),
            history: history(&pattern),
        },
    );
    let store = Arc::new(store);

    let narrow = StreakPredictionEngine::with_config(store.clone(), config);
    let wide = StreakPredictionEngine::new(store);

    let narrow_forecast = narrow.generate_streak_forecast("walk", as_of()).await;
    let wide_forecast = wide.generate_streak_forecast("walk", as_of()).await;

    // A 7-day window only sees the perfect week
    assert!(narrow_forecast.predictions.day14 > wide_forecast.predictions.day14);
}

#[test]
fn test_recovery_boundaries_through_engine() {
    let engine = StreakPredictionEngine::new(Arc::new(SnapshotStore::new()));
    let strategy = |len| engine.generate_streak_recovery_plan("h", len).strategy.to_string();

    assert_eq!(strategy(3), "quick-restart");
    assert_eq!(strategy(4), "gradual-buildup");
    assert_eq!(strategy(14), "gradual-buildup");
    assert_eq!(strategy(15), "foundation-reset");
}

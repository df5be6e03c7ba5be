//! Habit data collaborators
//!
//! The engine never owns habit data. It reads streak state, timing patterns and
//! completion history through [`HabitDataSource`], which production code backs
//! with the completion ledger and timing analyzer. [`SnapshotStore`] is an
//! in-memory implementation loadable from a JSON snapshot, used by the CLI and
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{DataError, Result};
use crate::models::{CompletionEntry, StreakState, TimingPattern};

/// Read access to per-habit data. Implementations may fail at any call.
#[async_trait]
pub trait HabitDataSource: Send + Sync {
    async fn streak_state(&self, habit_id: &str) -> std::result::Result<StreakState, DataError>;

    async fn timing_pattern(
        &self,
        habit_id: &str,
    ) -> std::result::Result<TimingPattern, DataError>;

    /// The last `days` entries, most recent first
    async fn completion_history(
        &self,
        habit_id: &str,
        days: u32,
    ) -> std::result::Result<Vec<CompletionEntry>, DataError>;
}

/// Everything recorded about one habit in a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub streak: Option<StreakState>,
    #[serde(default)]
    pub timing: Option<TimingPattern>,
    /// Completion log, most recent first
    #[serde(default)]
    pub history: Vec<CompletionEntry>,
}

/// In-memory habit data, keyed by habit id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStore {
    pub habits: HashMap<String, HabitRecord>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        SnapshotStore::default()
    }

    /// Load a JSON snapshot from disk
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let store: SnapshotStore = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            habits = store.habits.len(),
            "habit snapshot loaded"
        );
        Ok(store)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn insert(&mut self, habit_id: impl Into<String>, record: HabitRecord) {
        self.habits.insert(habit_id.into(), record);
    }

    /// Habit ids in a stable order
    pub fn habit_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.habits.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn title(&self, habit_id: &str) -> Option<&str> {
        self.habits.get(habit_id).and_then(|r| r.title.as_deref())
    }

    fn record(&self, habit_id: &str) -> std::result::Result<&HabitRecord, DataError> {
        self.habits.get(habit_id).ok_or_else(|| DataError::HabitNotFound {
            habit_id: habit_id.to_string(),
        })
    }
}

fn missing(habit_id: &str, source_name: &str) -> DataError {
    DataError::Unavailable {
        habit_id: habit_id.to_string(),
        source_name: source_name.to_string(),
        reason: "no data recorded".to_string(),
    }
}

#[async_trait]
impl HabitDataSource for SnapshotStore {
    async fn streak_state(&self, habit_id: &str) -> std::result::Result<StreakState, DataError> {
        self.record(habit_id)?
            .streak
            .ok_or_else(|| missing(habit_id, "streak store"))
    }

    async fn timing_pattern(
        &self,
        habit_id: &str,
    ) -> std::result::Result<TimingPattern, DataError> {
        self.record(habit_id)?
            .timing
            .clone()
            .ok_or_else(|| missing(habit_id, "timing analyzer"))
    }

    async fn completion_history(
        &self,
        habit_id: &str,
        days: u32,
    ) -> std::result::Result<Vec<CompletionEntry>, DataError> {
        let record = self.record(habit_id)?;
        Ok(record.history.iter().take(days as usize).copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnergyPattern;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn record() -> HabitRecord {
        let start = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        HabitRecord {
            title: Some("Morning pages".to_string()),
            streak: Some(StreakState::new(4, 9)),
            timing: Some(TimingPattern {
                completion_rate: 0.7,
                optimal_hours: vec![6, 7],
                difficult_days: vec![],
                energy_pattern: EnergyPattern::Morning,
                streak_potential: 0.5,
            }),
            history: (0..20)
                .map(|i| CompletionEntry::new(start - chrono::Duration::days(i), i % 3 != 0))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_unknown_habit() {
        let store = SnapshotStore::new();
        let err = store.streak_state("ghost").await.unwrap_err();
        assert_eq!(
            err,
            DataError::HabitNotFound {
                habit_id: "ghost".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_section_is_unavailable() {
        let mut store = SnapshotStore::new();
        store.insert(
            "pages",
            HabitRecord {
                timing: None,
                ..record()
            },
        );
        assert!(store.streak_state("pages").await.is_ok());
        assert!(matches!(
            store.timing_pattern("pages").await,
            Err(DataError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_history_is_truncated_to_window() {
        let mut store = SnapshotStore::new();
        store.insert("pages", record());
        let history = store.completion_history("pages", 14).await.unwrap();
        assert_eq!(history.len(), 14);
        assert_eq!(history[0].date, NaiveDate::from_ymd_opt(2024, 4, 10).unwrap());
    }

    #[test]
    fn test_snapshot_file_io() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("habits.json");

        let mut store = SnapshotStore::new();
        store.insert("pages", record());
        store.save_to_file(&path).unwrap();

        let loaded = SnapshotStore::load_from_file(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.title("pages"), Some("Morning pages"));
        assert_eq!(loaded.habit_ids(), vec!["pages".to_string()]);
    }
}

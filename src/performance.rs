//! Short-window trend analysis over a habit's completion log.
//!
//! Produces the three numbers the trend sub-model consumes: the completion rate
//! over the last 7 and 14 entries, and a slope comparing the older half of the
//! window against the newer half.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::models::CompletionEntry;

/// Default number of days of history requested from the ledger
pub const DEFAULT_HISTORY_DAYS: u32 = 14;

const SHORT_WINDOW: usize = 7;
const LONG_WINDOW: usize = 14;

/// Recent completion trend for a habit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RecentPerformance {
    /// Change in completion rate between the older and newer half of the window,
    /// divided by the length of the older half. Positive means improving.
    ///
    /// The halves are taken in chronological order, not in the most-recent-first
    /// order the log arrives in, so an odd middle entry lands in the newer half.
    pub slope: f64,

    /// Completion rate over the 7 most recent entries
    pub recent7: f64,

    /// Completion rate over the 14 most recent entries
    pub recent14: f64,
}

/// Derives [`RecentPerformance`] from a completion log
pub struct RecentPerformanceAnalyzer;

impl RecentPerformanceAnalyzer {
    /// Analyze a log ordered most-recent-first.
    ///
    /// Logs shorter than a window use whatever entries exist; an empty log
    /// yields all zeros.
    pub fn analyze(history: &[CompletionEntry]) -> RecentPerformance {
        if history.is_empty() {
            return RecentPerformance::default();
        }

        let recent7 = completion_rate(&history[..history.len().min(SHORT_WINDOW)]);
        let recent14 = completion_rate(&history[..history.len().min(LONG_WINDOW)]);

        RecentPerformance {
            slope: Self::slope(history),
            recent7,
            recent14,
        }
    }

    /// (newer-half mean - older-half mean) / older-half length
    fn slope(history: &[CompletionEntry]) -> f64 {
        let chronological: Vec<f64> = history
            .iter()
            .rev()
            .map(|entry| if entry.completed { 1.0 } else { 0.0 })
            .collect();

        let first_len = chronological.len() / 2;
        if first_len == 0 {
            return 0.0;
        }

        let (older, newer) = chronological.split_at(first_len);
        let older_avg = older.iter().mean();
        let newer_avg = newer.iter().mean();

        (newer_avg - older_avg) / first_len as f64
    }
}

fn completion_rate(entries: &[CompletionEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().filter(|e| e.completed).count() as f64 / entries.len() as f64
}

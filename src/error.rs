//! Unified error hierarchy for StreakRS
//!
//! Upstream data failures are modelled separately from caller mistakes so the
//! engine can tell which ones it is allowed to paper over with defaults.

use thiserror::Error;

/// Top-level error type for all StreakRS operations
#[derive(Debug, Error)]
pub enum StreakRsError {
    /// Upstream habit data could not be used
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Caller supplied an input outside the supported domain
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors (JSON snapshots, CSV export)
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures of the habit data collaborators (streak store, timing analyzer, history ledger)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// A collaborator failed to answer
    #[error("{source_name} unavailable for habit {habit_id}: {reason}")]
    Unavailable {
        habit_id: String,
        source_name: String,
        reason: String,
    },

    /// The habit is unknown to the data source
    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    /// The collaborator answered with something unusable
    #[error("Malformed data for habit {habit_id}: {reason}")]
    Malformed { habit_id: String, reason: String },
}

impl DataError {
    /// Habit the failure relates to
    pub fn habit_id(&self) -> &str {
        match self {
            DataError::Unavailable { habit_id, .. }
            | DataError::HabitNotFound { habit_id }
            | DataError::Malformed { habit_id, .. } => habit_id,
        }
    }
}

/// Result type alias for StreakRS operations
pub type Result<T> = std::result::Result<T, StreakRsError>;

impl From<serde_json::Error> for StreakRsError {
    fn from(err: serde_json::Error) -> Self {
        StreakRsError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for StreakRsError {
    fn from(err: csv::Error) -> Self {
        StreakRsError::Serialization(err.to_string())
    }
}

impl StreakRsError {
    /// Whether the engine may substitute the default forecast for this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StreakRsError::Data(_))
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StreakRsError::Data(DataError::HabitNotFound { .. }) => ErrorSeverity::Warning,
            StreakRsError::Data(_) => ErrorSeverity::Warning,
            StreakRsError::Validation(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// First StreakRS error in an `anyhow` context chain
    pub fn find_in(err: &anyhow::Error) -> Option<&StreakRsError> {
        err.chain()
            .find_map(|cause| cause.downcast_ref::<StreakRsError>())
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            StreakRsError::Data(DataError::HabitNotFound { habit_id }) => {
                format!("No tracking data exists for habit '{}'.", habit_id)
            }
            StreakRsError::Data(DataError::Unavailable { source_name, .. }) => {
                format!(
                    "Habit analytics are temporarily unavailable ({}). Showing a default forecast.",
                    source_name
                )
            }
            StreakRsError::Data(DataError::Malformed { habit_id, .. }) => {
                format!("The tracking data for habit '{}' is damaged.", habit_id)
            }
            StreakRsError::Validation(reason) => format!("Invalid input: {}.", reason),
            StreakRsError::Configuration(reason) => {
                format!("Configuration problem: {}. Check your config.toml.", reason)
            }
            StreakRsError::Io(err) => format!("Could not access a file: {}.", err),
            StreakRsError::Serialization(reason) => {
                format!("Habit data could not be read or written: {}.", reason)
            }
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

//! Streak recovery planning
//!
//! After a streak breaks, the length of the lost streak decides how carefully
//! the habit should be rebuilt:
//!
//! - **Quick restart** (short streaks): repeat at half intensity, then resume.
//! - **Gradual buildup** (up to two weeks): climb from a two-minute version
//!   back to the full habit over a week.
//! - **Foundation reset** (long streaks): reflect on what broke, rebuild the
//!   smallest version, and re-expand over two weeks.
//!
//! The day-indexed action templates are static tables; only the selection of
//! template and psychological framing depends on the input.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Recovery strategy chosen from the broken streak length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryStrategy {
    QuickRestart,
    GradualBuildup,
    FoundationReset,
}

impl fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryStrategy::QuickRestart => write!(f, "quick-restart"),
            RecoveryStrategy::GradualBuildup => write!(f, "gradual-buildup"),
            RecoveryStrategy::FoundationReset => write!(f, "foundation-reset"),
        }
    }
}

/// Effort asked of the user on a recovery day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Minimal,
    Easy,
    Moderate,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncouragementLevel {
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusArea {
    Progress,
    Learning,
    Resilience,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryAction {
    /// Day of the plan, starting at 1
    pub day: u32,
    pub action: String,
    pub reasoning: String,
    pub difficulty_level: DifficultyLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsychologicalSupport {
    pub reframing_message: String,
    pub encouragement_level: EncouragementLevel,
    pub focus_area: FocusArea,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryPlan {
    pub habit_id: String,
    pub broken_streak_length: u32,
    pub strategy: RecoveryStrategy,
    pub actions: Vec<RecoveryAction>,
    pub psychological_support: PsychologicalSupport,
}

/// Streak-length cut-offs for strategy and support selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryThresholds {
    /// Longest streak still handled by a quick restart
    pub quick_restart_max: u32,
    /// Longest streak still handled by a gradual buildup
    pub gradual_buildup_max: u32,
    /// Longest streak whose support focuses on progress
    pub progress_support_max: u32,
    /// Longest streak whose support focuses on learning
    pub learning_support_max: u32,
}

impl Default for RecoveryThresholds {
    fn default() -> Self {
        RecoveryThresholds {
            quick_restart_max: 3,
            gradual_buildup_max: 14,
            progress_support_max: 7,
            learning_support_max: 21,
        }
    }
}

impl RecoveryThresholds {
    pub fn validate(&self) -> Result<(), String> {
        if self.quick_restart_max >= self.gradual_buildup_max {
            return Err("quick_restart_max must be below gradual_buildup_max".to_string());
        }
        if self.progress_support_max >= self.learning_support_max {
            return Err("progress_support_max must be below learning_support_max".to_string());
        }
        Ok(())
    }
}

struct ActionTemplate {
    day: u32,
    action: &'static str,
    reasoning: &'static str,
    difficulty: DifficultyLevel,
}

const QUICK_RESTART: &[ActionTemplate] = &[
    ActionTemplate {
        day: 1,
        action: "Do the habit at 50% intensity",
        reasoning: "A lighter repeat gets you back in motion without pressure",
        difficulty: DifficultyLevel::Easy,
    },
    ActionTemplate {
        day: 2,
        action: "Return to your normal routine",
        reasoning: "A short break has not cost you the skill, only the rhythm",
        difficulty: DifficultyLevel::Normal,
    },
    ActionTemplate {
        day: 3,
        action: "Repeat at the same time and place as before",
        reasoning: "Consistency matters more than the number on the streak counter",
        difficulty: DifficultyLevel::Normal,
    },
];

const GRADUAL_BUILDUP: &[ActionTemplate] = &[
    ActionTemplate {
        day: 1,
        action: "Do a 2-minute micro version of the habit",
        reasoning: "Starting tiny rebuilds the cue without any resistance",
        difficulty: DifficultyLevel::Minimal,
    },
    ActionTemplate {
        day: 3,
        action: "Do a quarter of the usual session (about 5 minutes)",
        reasoning: "Small, safe increases restore confidence",
        difficulty: DifficultyLevel::Easy,
    },
    ActionTemplate {
        day: 5,
        action: "Do half of the usual session (about 10 minutes)",
        reasoning: "The routine is forming again; add load while it feels easy",
        difficulty: DifficultyLevel::Moderate,
    },
    ActionTemplate {
        day: 7,
        action: "Return to the full habit",
        reasoning: "A week of buildup makes the full version feel familiar",
        difficulty: DifficultyLevel::Normal,
    },
];

const FOUNDATION_RESET: &[ActionTemplate] = &[
    ActionTemplate {
        day: 1,
        action: "Reflect on what caused the streak to break",
        reasoning: "Understanding the root cause prevents the same break twice",
        difficulty: DifficultyLevel::Minimal,
    },
    ActionTemplate {
        day: 3,
        action: "Restart with the smallest possible version of the habit",
        reasoning: "A fresh foundation matters more than the old intensity",
        difficulty: DifficultyLevel::Minimal,
    },
    ActionTemplate {
        day: 5,
        action: "Anchor the habit to a fixed daily cue",
        reasoning: "Reliable triggers carry the habit when motivation dips",
        difficulty: DifficultyLevel::Easy,
    },
    ActionTemplate {
        day: 10,
        action: "Increase to half of the original scope",
        reasoning: "Growth after a stable week keeps the habit sustainable",
        difficulty: DifficultyLevel::Moderate,
    },
    ActionTemplate {
        day: 14,
        action: "Re-expand to the full scope if the last week felt manageable",
        reasoning: "Two weeks of consistency is a solid base to build on",
        difficulty: DifficultyLevel::Normal,
    },
];

fn template(strategy: RecoveryStrategy) -> &'static [ActionTemplate] {
    match strategy {
        RecoveryStrategy::QuickRestart => QUICK_RESTART,
        RecoveryStrategy::GradualBuildup => GRADUAL_BUILDUP,
        RecoveryStrategy::FoundationReset => FOUNDATION_RESET,
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecoveryPlanGenerator {
    thresholds: RecoveryThresholds,
}

impl RecoveryPlanGenerator {
    pub fn new() -> Self {
        RecoveryPlanGenerator::default()
    }

    pub fn with_thresholds(thresholds: RecoveryThresholds) -> Self {
        RecoveryPlanGenerator { thresholds }
    }

    /// Build a recovery plan. A length of zero is treated as one.
    pub fn generate(&self, habit_id: &str, broken_streak_length: u32) -> RecoveryPlan {
        let length = if broken_streak_length == 0 {
            warn!(habit_id, "broken streak length of 0, planning as 1");
            1
        } else {
            broken_streak_length
        };

        let strategy = self.select_strategy(length);
        let actions = template(strategy)
            .iter()
            .map(|t| RecoveryAction {
                day: t.day,
                action: t.action.to_string(),
                reasoning: t.reasoning.to_string(),
                difficulty_level: t.difficulty,
            })
            .collect();

        RecoveryPlan {
            habit_id: habit_id.to_string(),
            broken_streak_length: length,
            strategy,
            actions,
            psychological_support: self.support(length),
        }
    }

    pub fn select_strategy(&self, broken_streak_length: u32) -> RecoveryStrategy {
        if broken_streak_length <= self.thresholds.quick_restart_max {
            RecoveryStrategy::QuickRestart
        } else if broken_streak_length <= self.thresholds.gradual_buildup_max {
            RecoveryStrategy::GradualBuildup
        } else {
            RecoveryStrategy::FoundationReset
        }
    }

    fn support(&self, broken_streak_length: u32) -> PsychologicalSupport {
        if broken_streak_length <= self.thresholds.progress_support_max {
            PsychologicalSupport {
                reframing_message: "Every day you showed up still counts. One missed day \
                                    is a pause, not a reset of who you are becoming."
                    .to_string(),
                encouragement_level: EncouragementLevel::Medium,
                focus_area: FocusArea::Progress,
            }
        } else if broken_streak_length <= self.thresholds.learning_support_max {
            PsychologicalSupport {
                reframing_message: "A streak this long proves you can do it. Use this \
                                    break to learn what tripped you up."
                    .to_string(),
                encouragement_level: EncouragementLevel::Medium,
                focus_area: FocusArea::Learning,
            }
        } else {
            PsychologicalSupport {
                reframing_message: "You built something remarkable, and that foundation \
                                    doesn't disappear. Coming back is what resilience looks like."
                    .to_string(),
                encouragement_level: EncouragementLevel::High,
                focus_area: FocusArea::Resilience,
            }
        }
    }
}

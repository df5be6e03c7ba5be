//! Mood- and time-aware difficulty adjustment.
//!
//! A habit's baseline complexity is rescaled by how the user feels right now
//! and how much energy the time of day usually leaves them, then mapped back
//! onto the easy/medium/hard scale together with tone and practical tips.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::models::{Complexity, Mood, TimeOfDay};

pub const MAX_CONTEXTUAL_TIPS: usize = 3;
const MAX_MOOD_TIPS: usize = 2;

/// Scores at or below this map back to easy
const EASY_CEILING: f64 = 0.4;
/// Scores at or below this map back to medium
const MEDIUM_CEILING: f64 = 0.7;

/// Numeric weight of a complexity level
pub fn complexity_score(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Easy => 0.3,
        Complexity::Medium => 0.6,
        Complexity::Hard => 0.9,
    }
}

/// How much of the usual difficulty the user can take on in this mood
pub fn mood_multiplier(mood: Mood) -> f64 {
    match mood {
        Mood::Content => 1.0,
        Mood::Neutral => 0.8,
        Mood::Sad => 0.5,
        Mood::Frustrated => 0.6,
        Mood::Excited => 1.2,
    }
}

pub fn energy_multiplier(time_of_day: TimeOfDay) -> f64 {
    match time_of_day {
        TimeOfDay::Morning => 1.1,
        TimeOfDay::Afternoon => 1.0,
        TimeOfDay::Evening => 0.9,
        TimeOfDay::Night => 0.7,
    }
}

/// Map an adjusted score back to a complexity level
pub fn complexity_for_score(score: f64) -> Complexity {
    if score <= EASY_CEILING {
        Complexity::Easy
    } else if score <= MEDIUM_CEILING {
        Complexity::Medium
    } else {
        Complexity::Hard
    }
}

/// Tone the coaching layer should take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotivationalApproach {
    Encouraging,
    Supportive,
    Gentle,
    Celebratory,
}

impl MotivationalApproach {
    pub fn for_mood(mood: Mood) -> Self {
        match mood {
            Mood::Content => MotivationalApproach::Encouraging,
            Mood::Neutral => MotivationalApproach::Supportive,
            Mood::Sad => MotivationalApproach::Gentle,
            Mood::Frustrated => MotivationalApproach::Supportive,
            Mood::Excited => MotivationalApproach::Celebratory,
        }
    }
}

impl fmt::Display for MotivationalApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotivationalApproach::Encouraging => write!(f, "encouraging"),
            MotivationalApproach::Supportive => write!(f, "supportive"),
            MotivationalApproach::Gentle => write!(f, "gentle"),
            MotivationalApproach::Celebratory => write!(f, "celebratory"),
        }
    }
}

/// How the habit itself should change for this session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionModification {
    /// Percentage to cut from the usual session length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_reduction_pct: Option<u8>,
    pub energy_adjustment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAdjustment {
    pub habit_id: String,
    pub baseline_complexity: Complexity,
    pub current_mood: Mood,
    pub adjusted_complexity: Complexity,
    pub suggestion_modification: SuggestionModification,
    pub motivational_approach: MotivationalApproach,
    pub contextual_tips: Vec<String>,
}

pub struct MoodDifficultyAdjuster;

impl MoodDifficultyAdjuster {
    pub fn adjust(
        habit_id: &str,
        habit_title: &str,
        mood: Mood,
        baseline: Complexity,
        time_of_day: TimeOfDay,
    ) -> MoodAdjustment {
        let adjusted_score =
            complexity_score(baseline) * mood_multiplier(mood) * energy_multiplier(time_of_day);
        let adjusted_complexity = complexity_for_score(adjusted_score);

        debug!(
            habit_id,
            %mood,
            %baseline,
            %time_of_day,
            adjusted_score,
            %adjusted_complexity,
            "difficulty adjusted"
        );

        MoodAdjustment {
            habit_id: habit_id.to_string(),
            baseline_complexity: baseline,
            current_mood: mood,
            adjusted_complexity,
            suggestion_modification: SuggestionModification {
                time_reduction_pct: time_reduction_pct(adjusted_complexity),
                energy_adjustment: energy_adjustment(mood).to_string(),
                alternative_suggestion: alternative_suggestion(mood, habit_title),
            },
            motivational_approach: MotivationalApproach::for_mood(mood),
            contextual_tips: contextual_tips(mood, time_of_day),
        }
    }
}

fn time_reduction_pct(adjusted: Complexity) -> Option<u8> {
    match adjusted {
        Complexity::Easy => Some(50),
        Complexity::Medium => Some(25),
        Complexity::Hard => None,
    }
}

fn energy_adjustment(mood: Mood) -> &'static str {
    match mood {
        Mood::Content => "Steady energy: keep your usual approach",
        Mood::Neutral => "Lower the barrier to starting and let momentum build",
        Mood::Sad => "Be gentle with yourself; a smaller version still counts",
        Mood::Frustrated => "Channel that energy into the habit as a focused release",
        Mood::Excited => "Ride the energy and consider extending the session",
    }
}

fn alternative_suggestion(mood: Mood, habit_title: &str) -> Option<String> {
    match mood {
        Mood::Content => None,
        Mood::Neutral => Some(format!(
            "Start with just the first step of {} and decide after",
            habit_title
        )),
        Mood::Sad => Some(format!(
            "Do one minute of {}; showing up is the win today",
            habit_title
        )),
        Mood::Frustrated => Some(format!(
            "Turn {} into a short, intense reset",
            habit_title
        )),
        Mood::Excited => Some(format!("Add a bonus round to {}", habit_title)),
    }
}

fn mood_tips(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Content => &[
            "Notice what made today feel good and repeat it",
            "Stack the habit onto something you already enjoy",
        ],
        Mood::Neutral => &[
            "Set a two-minute timer and just begin",
            "Pair the habit with music or a favorite drink",
        ],
        Mood::Sad => &[
            "Lower the bar: any attempt counts today",
            "Take a few slow breaths before starting",
        ],
        Mood::Frustrated => &[
            "Use physical movement to release tension first",
            "Focus on the part of the habit you can control",
        ],
        Mood::Excited => &[
            "Capture this energy by planning tomorrow's session now",
            "Share your progress with someone who cheers you on",
        ],
    }
}

fn time_tip(time_of_day: TimeOfDay) -> &'static str {
    match time_of_day {
        TimeOfDay::Morning => "Morning energy is high: tackle the habit before the day fills up",
        TimeOfDay::Afternoon => "Beat the afternoon slump with a quick stretch first",
        TimeOfDay::Evening => "Keep it light in the evening so it doesn't cost you sleep",
        TimeOfDay::Night => "It's late: do the smallest version and rest",
    }
}

fn contextual_tips(mood: Mood, time_of_day: TimeOfDay) -> Vec<String> {
    let mut tips: Vec<String> = mood_tips(mood)
        .iter()
        .take(MAX_MOOD_TIPS)
        .map(|tip| tip.to_string())
        .collect();
    tips.push(time_tip(time_of_day).to_string());
    tips.truncate(MAX_CONTEXTUAL_TIPS);
    tips
}

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current and best streak as reported by the completion ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive days completed up to now
    pub current: u32,

    /// Longest streak ever recorded for the habit
    pub longest: u32,
}

impl StreakState {
    pub fn new(current: u32, longest: u32) -> Self {
        StreakState { current, longest }
    }
}

/// Time of day at which a user tends to have the most energy for a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyPattern {
    Morning,
    Afternoon,
    Evening,
    Flexible,
}

/// Behavioral summary of a habit, produced by the timing-pattern analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingPattern {
    /// Share of scheduled days on which the habit was completed (0-1)
    pub completion_rate: f64,

    /// Hours (0-23) at which completions are most likely
    #[serde(default)]
    pub optimal_hours: Vec<u8>,

    /// Weekdays on which the habit is usually skipped, worst first
    #[serde(default)]
    pub difficult_days: Vec<Weekday>,

    pub energy_pattern: EnergyPattern,

    /// Analyzer's estimate of how well the habit holds a streak (0-1)
    pub streak_potential: f64,
}

impl TimingPattern {
    /// Distinct difficult weekdays, preserving the analyzer's order
    pub fn distinct_difficult_days(&self) -> Vec<Weekday> {
        let mut days: Vec<Weekday> = Vec::with_capacity(self.difficult_days.len());
        for day in &self.difficult_days {
            if !days.contains(day) {
                days.push(*day);
            }
        }
        days
    }

    /// Copy with both rates forced into [0, 1]
    pub fn clamped(&self) -> Self {
        TimingPattern {
            completion_rate: self.completion_rate.clamp(0.0, 1.0),
            streak_potential: self.streak_potential.clamp(0.0, 1.0),
            ..self.clone()
        }
    }

    /// True when either rate is NaN or infinite
    pub fn has_non_finite_rates(&self) -> bool {
        !self.completion_rate.is_finite() || !self.streak_potential.is_finite()
    }
}

/// One day in a habit's completion log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEntry {
    pub date: NaiveDate,
    pub completed: bool,
}

impl CompletionEntry {
    pub fn new(date: NaiveDate, completed: bool) -> Self {
        CompletionEntry { date, completed }
    }
}

/// Perceived difficulty of a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Easy => write!(f, "easy"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Complexity::Easy),
            "medium" => Ok(Complexity::Medium),
            "hard" => Ok(Complexity::Hard),
            _ => Err(format!("Unknown complexity: {}", s)),
        }
    }
}

/// The five moods a user can check in with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Content,
    Neutral,
    Sad,
    Frustrated,
    #[serde(alias = "grateful")]
    Excited,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Content,
        Mood::Neutral,
        Mood::Sad,
        Mood::Frustrated,
        Mood::Excited,
    ];
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mood::Content => write!(f, "content"),
            Mood::Neutral => write!(f, "neutral"),
            Mood::Sad => write!(f, "sad"),
            Mood::Frustrated => write!(f, "frustrated"),
            Mood::Excited => write!(f, "excited"),
        }
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "content" => Ok(Mood::Content),
            "neutral" => Ok(Mood::Neutral),
            "sad" => Ok(Mood::Sad),
            "frustrated" => Ok(Mood::Frustrated),
            "excited" | "grateful" => Ok(Mood::Excited),
            _ => Err(format!("Unknown mood: {}", s)),
        }
    }
}

/// Coarse part of the day used for energy scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket a 24h clock hour
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Morning => write!(f, "morning"),
            TimeOfDay::Afternoon => write!(f, "afternoon"),
            TimeOfDay::Evening => write!(f, "evening"),
            TimeOfDay::Night => write!(f, "night"),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morning" => Ok(TimeOfDay::Morning),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "evening" => Ok(TimeOfDay::Evening),
            "night" => Ok(TimeOfDay::Night),
            _ => Err(format!("Unknown time of day: {}", s)),
        }
    }
}

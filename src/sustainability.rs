use crate::forecast::ForecastPrediction;
use crate::models::{StreakState, TimingPattern};

const PREDICTION_WEIGHTS: (f64, f64, f64) = (0.3, 0.4, 0.3);
const EXPERIENCE_POINTS_PER_DAY: f64 = 2.0;
const EXPERIENCE_CAP: f64 = 30.0;

/// Composite 0-100 score combining forecast, consistency and experience
pub struct SustainabilityScorer;

impl SustainabilityScorer {
    pub fn score(
        prediction: &ForecastPrediction,
        pattern: &TimingPattern,
        streak: &StreakState,
    ) -> u8 {
        let (w7, w14, w30) = PREDICTION_WEIGHTS;
        let prediction_score =
            (prediction.day7 * w7 + prediction.day14 * w14 + prediction.day30 * w30) * 100.0;
        let consistency_score = pattern.completion_rate * 100.0;
        let experience_score =
            (streak.longest as f64 * EXPERIENCE_POINTS_PER_DAY).min(EXPERIENCE_CAP);

        let mean = (prediction_score + consistency_score + experience_score) / 3.0;
        mean.round().clamp(0.0, 100.0) as u8
    }
}

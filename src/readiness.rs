//! Daily readiness scoring from wellness and workload signals.
//!
//! Five components (sleep, HRV/heart-rate, recovery, psychological wellness,
//! workload) are each normalized to 0-100 and combined into a single
//! readiness score with a training-intensity recommendation.
//!
//! Physiological normalization is triangular: a value scores 100 at its
//! optimal point and falls off linearly toward asymmetric low/high
//! boundaries, clamping to 0 beyond them. Missing raw inputs default the
//! affected sub-component to a neutral 50 so that sparse questionnaires
//! neither depress nor inflate the composite.

use crate::models::{ReadinessResult, TrainingIntensity, WellnessEntry};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sleep duration normalization bounds (hours)
const SLEEP_HOURS_LOW: f64 = 4.0;
const SLEEP_HOURS_OPTIMAL: f64 = 8.0;
const SLEEP_HOURS_HIGH: f64 = 12.0;

/// HRV (RMSSD) normalization bounds (milliseconds)
const HRV_LOW: f64 = 20.0;
const HRV_OPTIMAL: f64 = 70.0;
const HRV_HIGH: f64 = 120.0;

/// Resting heart rate normalization bounds (bpm); lower is better, so the
/// optimal sits close to the low boundary
const RESTING_HR_LOW: f64 = 40.0;
const RESTING_HR_OPTIMAL: f64 = 55.0;
const RESTING_HR_HIGH: f64 = 90.0;

/// ACWR band considered optimal for the workload component
const ACWR_OPTIMAL_LOW: f64 = 0.8;
const ACWR_OPTIMAL_HIGH: f64 = 1.3;
const ACWR_OVERTRAINING: f64 = 2.0;

/// Neutral score substituted for missing sub-component inputs
const NEUTRAL_SCORE: f64 = 50.0;

/// Component weights for the composite readiness score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessWeights {
    pub sleep: f64,
    pub hrv: f64,
    pub recovery: f64,
    pub wellness: f64,
    pub workload: f64,
}

impl Default for ReadinessWeights {
    fn default() -> Self {
        ReadinessWeights {
            sleep: 0.25,
            hrv: 0.25,
            recovery: 0.20,
            wellness: 0.15,
            workload: 0.15,
        }
    }
}

/// Daily readiness scoring engine
pub struct ReadinessScorer {
    weights: ReadinessWeights,
}

impl ReadinessScorer {
    /// Create a scorer with default component weights
    pub fn new() -> Self {
        ReadinessScorer {
            weights: ReadinessWeights::default(),
        }
    }

    /// Create a scorer with custom component weights
    pub fn with_weights(weights: ReadinessWeights) -> Self {
        ReadinessScorer { weights }
    }

    /// Score readiness from the day's wellness entry and the current ACWR.
    ///
    /// A completely absent wellness entry still produces a result: every
    /// wellness-derived sub-component falls back to the neutral 50, and the
    /// workload component falls back to 100 when ACWR is unavailable
    /// (acceptable load is assumed absent evidence to the contrary).
    pub fn score(
        &self,
        wellness: Option<&WellnessEntry>,
        acwr: Option<Decimal>,
    ) -> ReadinessResult {
        if wellness.is_none() {
            debug!("no wellness entry available, scoring from neutral defaults");
        }

        let sleep_score = self.sleep_score(wellness);
        let hrv_score = self.hrv_score(wellness);
        let recovery_score = self.recovery_score(wellness);
        let wellness_score = self.wellness_score(wellness);
        let workload_score = self.workload_score(acwr);

        let composite = self.weights.sleep * sleep_score
            + self.weights.hrv * hrv_score
            + self.weights.recovery * recovery_score
            + self.weights.wellness * wellness_score
            + self.weights.workload * workload_score;
        let readiness_score = (composite * 10.0).round() / 10.0;

        let recommended_intensity = if readiness_score >= 80.0 {
            TrainingIntensity::Max
        } else if readiness_score >= 65.0 {
            TrainingIntensity::High
        } else if readiness_score >= 50.0 {
            TrainingIntensity::Moderate
        } else {
            TrainingIntensity::Low
        };

        let can_train_full = readiness_score >= 60.0;
        let injury_risk_flag =
            readiness_score < 40.0 || (recovery_score < 30.0 && workload_score < 50.0);

        ReadinessResult {
            sleep_score,
            hrv_score,
            recovery_score,
            wellness_score,
            workload_score,
            readiness_score,
            acwr,
            recommended_intensity,
            can_train_full,
            injury_risk_flag,
        }
    }

    /// 60% sleep duration (triangular around 8h), 40% sleep quality (1-5
    /// rescaled to 0-100)
    fn sleep_score(&self, wellness: Option<&WellnessEntry>) -> f64 {
        let hours = wellness
            .and_then(|w| w.sleep_hours)
            .map(|h| triangular(h, SLEEP_HOURS_LOW, SLEEP_HOURS_OPTIMAL, SLEEP_HOURS_HIGH))
            .unwrap_or(NEUTRAL_SCORE);
        let quality = wellness
            .and_then(|w| w.sleep_quality)
            .map(|q| (q as f64 - 1.0) / 4.0 * 100.0)
            .unwrap_or(NEUTRAL_SCORE);
        0.6 * hours + 0.4 * quality
    }

    /// 50% HRV (triangular around 70ms), 50% resting HR (triangular around
    /// 55bpm; the asymmetric boundaries encode that lower is better)
    fn hrv_score(&self, wellness: Option<&WellnessEntry>) -> f64 {
        let hrv = wellness
            .and_then(|w| w.hrv_ms)
            .map(|v| triangular(v, HRV_LOW, HRV_OPTIMAL, HRV_HIGH))
            .unwrap_or(NEUTRAL_SCORE);
        let resting_hr = wellness
            .and_then(|w| w.resting_hr_bpm)
            .map(|v| triangular(v, RESTING_HR_LOW, RESTING_HR_OPTIMAL, RESTING_HR_HIGH))
            .unwrap_or(NEUTRAL_SCORE);
        0.5 * hrv + 0.5 * resting_hr
    }

    /// 50% inverted DOMS, 50% inverted fatigue (1 best, 5 worst)
    fn recovery_score(&self, wellness: Option<&WellnessEntry>) -> f64 {
        let doms = wellness
            .and_then(|w| w.doms_rating)
            .map(invert_five_point)
            .unwrap_or(NEUTRAL_SCORE);
        let fatigue = wellness
            .and_then(|w| w.fatigue_rating)
            .map(invert_five_point)
            .unwrap_or(NEUTRAL_SCORE);
        0.5 * doms + 0.5 * fatigue
    }

    /// 50% inverted stress, 50% mood (1-10 rescaled to 0-100)
    fn wellness_score(&self, wellness: Option<&WellnessEntry>) -> f64 {
        let stress = wellness
            .and_then(|w| w.stress_rating)
            .map(invert_five_point)
            .unwrap_or(NEUTRAL_SCORE);
        let mood = wellness
            .and_then(|w| w.mood_rating)
            .map(|m| (m as f64 - 1.0) / 9.0 * 100.0)
            .unwrap_or(NEUTRAL_SCORE);
        0.5 * stress + 0.5 * mood
    }

    /// Workload component from ACWR: 100 inside the optimal band, falling
    /// linearly to 0 toward under-training (ACWR 0) and over-training
    /// (ACWR 2.0). Missing ACWR defaults to 100, not 50: absent load history
    /// is assumed acceptable rather than suspicious.
    fn workload_score(&self, acwr: Option<Decimal>) -> f64 {
        let Some(acwr) = acwr else {
            return 100.0;
        };
        let acwr = acwr.to_f64().unwrap_or(0.0);

        if (ACWR_OPTIMAL_LOW..=ACWR_OPTIMAL_HIGH).contains(&acwr) {
            100.0
        } else if acwr < ACWR_OPTIMAL_LOW {
            (acwr / ACWR_OPTIMAL_LOW * 100.0).clamp(0.0, 100.0)
        } else {
            ((ACWR_OVERTRAINING - acwr) / (ACWR_OVERTRAINING - ACWR_OPTIMAL_HIGH) * 100.0)
                .clamp(0.0, 100.0)
        }
    }
}

impl Default for ReadinessScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Triangular normalization: 100 at `optimal`, linear to 0 at the `low` and
/// `high` boundaries, clamped to 0 beyond them.
fn triangular(value: f64, low: f64, optimal: f64, high: f64) -> f64 {
    let score = if value <= optimal {
        (value - low) / (optimal - low) * 100.0
    } else {
        (high - value) / (high - optimal) * 100.0
    };
    score.clamp(0.0, 100.0)
}

/// Invert a 1-5 rating to 0-100 (1 → 100, 5 → 0)
fn invert_five_point(rating: u8) -> f64 {
    ((5.0 - rating as f64) / 4.0 * 100.0).clamp(0.0, 100.0)
}

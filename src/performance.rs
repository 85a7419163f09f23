//! Per-session performance index, rolling average, baseline z-score, and
//! rule-based performance-cluster labeling.
//!
//! The index is a weighted sum over a session's technical, physical, and
//! contextual inputs, clamped to the 40-95 band the formula was calibrated
//! for and then re-projected onto 0-100. Optional inputs (endurance level,
//! coach rating, sleep hours) drop their weighted term entirely when absent;
//! the remaining weights are not re-normalized, so incomplete sessions score
//! systematically lower.

use crate::error::{CalculationError, Result};
use crate::models::{ClusterLabel, MetricKey, PerformanceAnalytics};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::debug;

/// Raw-score band the index formula is calibrated for
const RAW_SCORE_FLOOR: f64 = 40.0;
const RAW_SCORE_CEILING: f64 = 95.0;

/// RPE considered optimal for a productive session
const OPTIMAL_RPE: f64 = 7.0;

/// Rolling average covers at most this many recent sessions
const ROLLING_WINDOW_SESSIONS: usize = 4;

/// Minimum session counts for the history-derived outputs
const MIN_SESSIONS_ROLLING: usize = 2;
const MIN_SESSIONS_ZSCORE: usize = 3;

/// Typed per-session inputs for the performance index.
///
/// Built from a `MetricKey → value` mapping rather than by probing
/// heterogeneous record shapes; missing required keys are an
/// insufficient-data error at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Pass accuracy percentage (0-100)
    pub pass_accuracy: f64,

    /// Progressive passes + carries
    pub progressive_actions: f64,

    /// Interceptions
    pub interceptions: f64,

    /// Successful dribbles
    pub successful_dribbles: f64,

    /// Sprint count
    pub sprints: f64,

    /// Resting heart rate in bpm
    pub resting_hr: f64,

    /// Distance covered in kilometers
    pub distance_km: f64,

    /// Rate of perceived exertion (1-10)
    pub rpe: f64,

    /// Endurance test level; absent for sessions without a test
    pub endurance_level: Option<f64>,

    /// Sleep hours the night before; absent without a wellness entry
    pub sleep_hours: Option<f64>,

    /// Coach rating of the session (1-10)
    pub coach_rating: Option<f64>,

    /// Psychological adaptability rating (1-10); used for clustering only
    pub psych_adaptability: Option<f64>,
}

impl SessionMetrics {
    /// Build session inputs from a typed metric mapping, validating ranges.
    pub fn from_metrics(metrics: &BTreeMap<MetricKey, f64>) -> Result<Self> {
        fn required(metrics: &BTreeMap<MetricKey, f64>, key: MetricKey) -> Result<f64> {
            metrics.get(&key).copied().ok_or_else(|| {
                CalculationError::InsufficientData {
                    calculation: "performance index".to_string(),
                    reason: format!("missing required metric {}", key),
                }
                .into()
            })
        }

        let session = SessionMetrics {
            pass_accuracy: required(metrics, MetricKey::PassAccuracy)?,
            progressive_actions: required(metrics, MetricKey::ProgressiveActions)?,
            interceptions: required(metrics, MetricKey::Interceptions)?,
            successful_dribbles: required(metrics, MetricKey::SuccessfulDribbles)?,
            sprints: required(metrics, MetricKey::Sprints)?,
            resting_hr: required(metrics, MetricKey::RestingHr)?,
            distance_km: required(metrics, MetricKey::DistanceKm)?,
            rpe: required(metrics, MetricKey::Rpe)?,
            endurance_level: metrics.get(&MetricKey::EnduranceLevel).copied(),
            sleep_hours: metrics.get(&MetricKey::SleepHours).copied(),
            coach_rating: metrics.get(&MetricKey::CoachRating).copied(),
            psych_adaptability: metrics.get(&MetricKey::PsychAdaptability).copied(),
        };
        session.validate()?;
        Ok(session)
    }

    /// Fail fast on out-of-range inputs; nothing is silently clamped.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.pass_accuracy) {
            return Err(CalculationError::InvalidParameter {
                calculation: "performance index".to_string(),
                parameter: "pass_accuracy".to_string(),
                value: self.pass_accuracy.to_string(),
            }
            .into());
        }
        if !(1.0..=10.0).contains(&self.rpe) {
            return Err(CalculationError::InvalidParameter {
                calculation: "performance index".to_string(),
                parameter: "rpe".to_string(),
                value: self.rpe.to_string(),
            }
            .into());
        }
        for (name, value) in [
            ("progressive_actions", self.progressive_actions),
            ("interceptions", self.interceptions),
            ("successful_dribbles", self.successful_dribbles),
            ("sprints", self.sprints),
            ("distance_km", self.distance_km),
        ] {
            if value < 0.0 {
                return Err(CalculationError::InvalidParameter {
                    calculation: "performance index".to_string(),
                    parameter: name.to_string(),
                    value: value.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Per-session performance analytics engine
pub struct PerformanceIndexCalculator;

impl PerformanceIndexCalculator {
    pub fn new() -> Self {
        PerformanceIndexCalculator
    }

    /// Weighted per-session performance index, projected onto 0-100.
    pub fn performance_index(&self, session: &SessionMetrics) -> Result<f64> {
        session.validate()?;

        let mut raw = 0.12 * session.pass_accuracy
            + 0.35
                * (session.progressive_actions
                    + 0.6 * session.interceptions
                    + 0.8 * session.successful_dribbles)
            + 0.10 * session.sprints
            + 0.10 * (12.0 - (session.resting_hr - 50.0) / 2.0).max(0.0)
            + 0.10 * session.distance_km
            - 0.05 * (session.rpe - OPTIMAL_RPE).abs();

        // Optional terms drop out entirely when absent; weights are not
        // re-normalized, so incomplete sessions score lower.
        if let Some(endurance) = session.endurance_level {
            raw += 0.08 * endurance;
        }
        if let Some(sleep) = session.sleep_hours {
            raw += 0.05 * sleep;
        }
        if let Some(coach) = session.coach_rating {
            raw += 0.05 * coach;
        }

        let clamped = raw.clamp(RAW_SCORE_FLOOR, RAW_SCORE_CEILING);
        Ok((clamped - RAW_SCORE_FLOOR) / (RAW_SCORE_CEILING - RAW_SCORE_FLOOR) * 100.0)
    }

    /// Mean of the most recent `min(4, n)` indices; `None` with fewer than 2.
    pub fn rolling_average(&self, indices: &[f64]) -> Option<f64> {
        if indices.len() < MIN_SESSIONS_ROLLING {
            return None;
        }
        let window = indices.len().min(ROLLING_WINDOW_SESSIONS);
        let recent = &indices[indices.len() - window..];
        Some(recent.iter().mean())
    }

    /// Z-score of the current index against the athlete's own prior history.
    ///
    /// `None` with fewer than 3 prior sessions. A zero historical std-dev
    /// yields `Some(0.0)`: with no spread the athlete is by definition at
    /// baseline, and dividing would be meaningless.
    pub fn baseline_zscore(&self, current: f64, prior_indices: &[f64]) -> Option<f64> {
        if prior_indices.len() < MIN_SESSIONS_ZSCORE {
            debug!(
                prior = prior_indices.len(),
                "insufficient history for baseline z-score"
            );
            return None;
        }
        let mean = prior_indices.iter().mean();
        let std_dev = prior_indices.iter().std_dev();
        if std_dev == 0.0 {
            return Some(0.0);
        }
        Some((current - mean) / std_dev)
    }

    /// Rule-based cluster label: four point accumulators, highest wins,
    /// ties broken by enumeration order.
    pub fn cluster_label(&self, session: &SessionMetrics) -> ClusterLabel {
        let mut best = ClusterLabel::Tech;
        let mut best_points = Self::cluster_points(best, session);
        for label in ClusterLabel::ALL.into_iter().skip(1) {
            let points = Self::cluster_points(label, session);
            if points > best_points {
                best = label;
                best_points = points;
            }
        }
        best
    }

    /// Scoring table for one cluster. Thresholds are fixed point rules, kept
    /// exhaustive over the enum so a new label cannot be forgotten.
    fn cluster_points(label: ClusterLabel, session: &SessionMetrics) -> u8 {
        let mut points = 0;
        match label {
            ClusterLabel::Tech => {
                if session.pass_accuracy > 85.0 {
                    points += 2;
                } else if session.pass_accuracy > 75.0 {
                    points += 1;
                }
                if session.successful_dribbles > 5.0 {
                    points += 1;
                }
            }
            ClusterLabel::Tactic => {
                if session.progressive_actions > 8.0 {
                    points += 2;
                } else if session.progressive_actions > 5.0 {
                    points += 1;
                }
                if session.interceptions > 5.0 {
                    points += 1;
                }
            }
            ClusterLabel::Physical => {
                if session.sprints > 15.0 {
                    points += 2;
                } else if session.sprints > 10.0 {
                    points += 1;
                }
                if session.distance_km > 10.0 {
                    points += 1;
                }
            }
            ClusterLabel::Psych => {
                if let Some(psych) = session.psych_adaptability {
                    if psych >= 8.0 {
                        points += 2;
                    } else if psych >= 6.0 {
                        points += 1;
                    }
                }
                if session.coach_rating.map_or(false, |c| c >= 8.0) {
                    points += 1;
                }
            }
        }
        points
    }

    /// Full analytics for the current session given prior indices in
    /// chronological order.
    pub fn analyze(
        &self,
        session: &SessionMetrics,
        prior_indices: &[f64],
    ) -> Result<PerformanceAnalytics> {
        let performance_index = self.performance_index(session)?;

        let mut all_indices = prior_indices.to_vec();
        all_indices.push(performance_index);

        Ok(PerformanceAnalytics {
            performance_index,
            rolling_average: self.rolling_average(&all_indices),
            baseline_zscore: self.baseline_zscore(performance_index, prior_indices),
            cluster_label: self.cluster_label(session),
        })
    }
}

impl Default for PerformanceIndexCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionMetrics {
        SessionMetrics {
            pass_accuracy: 88.0,
            progressive_actions: 70.0,
            interceptions: 8.0,
            successful_dribbles: 6.0,
            sprints: 18.0,
            resting_hr: 52.0,
            distance_km: 11.0,
            rpe: 7.0,
            endurance_level: Some(17.0),
            sleep_hours: Some(8.0),
            coach_rating: Some(8.0),
            psych_adaptability: Some(7.0),
        }
    }

    #[test]
    fn test_index_always_within_bounds() {
        let calculator = PerformanceIndexCalculator::new();

        let index = calculator.performance_index(&session()).unwrap();
        assert!((0.0..=100.0).contains(&index));

        // A quiet session clamps at the formula floor
        let quiet = SessionMetrics {
            pass_accuracy: 40.0,
            progressive_actions: 2.0,
            interceptions: 0.0,
            successful_dribbles: 0.0,
            sprints: 3.0,
            resting_hr: 70.0,
            distance_km: 4.0,
            rpe: 4.0,
            endurance_level: None,
            sleep_hours: None,
            coach_rating: None,
            psych_adaptability: None,
        };
        assert_eq!(calculator.performance_index(&quiet).unwrap(), 0.0);

        // An implausibly dominant session clamps at the ceiling
        let dominant = SessionMetrics {
            progressive_actions: 300.0,
            ..session()
        };
        assert_eq!(calculator.performance_index(&dominant).unwrap(), 100.0);
    }

    #[test]
    fn test_index_projection_matches_formula() {
        let calculator = PerformanceIndexCalculator::new();
        let s = session();

        let raw: f64 = 0.12 * 88.0
            + 0.35 * (70.0 + 0.6 * 8.0 + 0.8 * 6.0)
            + 0.10 * 18.0
            + 0.10 * (12.0 - (52.0 - 50.0) / 2.0)
            + 0.08 * 17.0
            + 0.10 * 11.0
            + 0.05 * 8.0
            + 0.05 * 8.0;
        let expected = (raw.clamp(40.0, 95.0) - 40.0) / 55.0 * 100.0;

        let index = calculator.performance_index(&s).unwrap();
        assert!((index - expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_optional_inputs_lower_the_index() {
        let calculator = PerformanceIndexCalculator::new();
        let full = calculator.performance_index(&session()).unwrap();

        let sparse = SessionMetrics {
            endurance_level: None,
            sleep_hours: None,
            coach_rating: None,
            ..session()
        };
        let reduced = calculator.performance_index(&sparse).unwrap();
        assert!(reduced < full);
    }

    #[test]
    fn test_invalid_inputs_fail_fast() {
        let calculator = PerformanceIndexCalculator::new();

        let bad_accuracy = SessionMetrics {
            pass_accuracy: 132.5,
            ..session()
        };
        assert!(calculator.performance_index(&bad_accuracy).is_err());

        let bad_rpe = SessionMetrics {
            rpe: 0.0,
            ..session()
        };
        assert!(calculator.performance_index(&bad_rpe).is_err());
    }

    #[test]
    fn test_from_metrics_requires_core_keys() {
        let mut metrics = BTreeMap::new();
        metrics.insert(MetricKey::PassAccuracy, 85.0);
        metrics.insert(MetricKey::ProgressiveActions, 12.0);
        assert!(SessionMetrics::from_metrics(&metrics).is_err());

        metrics.insert(MetricKey::Interceptions, 4.0);
        metrics.insert(MetricKey::SuccessfulDribbles, 3.0);
        metrics.insert(MetricKey::Sprints, 14.0);
        metrics.insert(MetricKey::RestingHr, 55.0);
        metrics.insert(MetricKey::DistanceKm, 10.2);
        metrics.insert(MetricKey::Rpe, 6.0);

        let session = SessionMetrics::from_metrics(&metrics).unwrap();
        assert_eq!(session.endurance_level, None);
        assert_eq!(session.coach_rating, None);
    }

    #[test]
    fn test_rolling_average_of_three_with_window_four() {
        let calculator = PerformanceIndexCalculator::new();
        assert_eq!(calculator.rolling_average(&[70.0, 80.0, 90.0]), Some(80.0));
    }

    #[test]
    fn test_rolling_average_requires_two_sessions() {
        let calculator = PerformanceIndexCalculator::new();
        assert_eq!(calculator.rolling_average(&[70.0]), None);
        assert_eq!(calculator.rolling_average(&[]), None);
    }

    #[test]
    fn test_rolling_average_uses_most_recent_four() {
        let calculator = PerformanceIndexCalculator::new();
        let indices = [10.0, 20.0, 60.0, 70.0, 80.0, 90.0];
        assert_eq!(calculator.rolling_average(&indices), Some(75.0));
    }

    #[test]
    fn test_zscore_requires_three_prior_sessions() {
        let calculator = PerformanceIndexCalculator::new();
        assert_eq!(calculator.baseline_zscore(80.0, &[70.0, 75.0]), None);
    }

    #[test]
    fn test_zscore_zero_spread_is_at_baseline() {
        let calculator = PerformanceIndexCalculator::new();
        let z = calculator.baseline_zscore(90.0, &[80.0, 80.0, 80.0]);
        assert_eq!(z, Some(0.0));
    }

    #[test]
    fn test_zscore_above_baseline_is_positive() {
        let calculator = PerformanceIndexCalculator::new();
        let z = calculator
            .baseline_zscore(90.0, &[60.0, 70.0, 80.0])
            .unwrap();
        assert!(z > 0.0);

        let below = calculator
            .baseline_zscore(50.0, &[60.0, 70.0, 80.0])
            .unwrap();
        assert!(below < 0.0);
    }

    #[test]
    fn test_cluster_label_rules() {
        let calculator = PerformanceIndexCalculator::new();

        let technician = SessionMetrics {
            pass_accuracy: 92.0,
            successful_dribbles: 7.0,
            progressive_actions: 4.0,
            sprints: 6.0,
            distance_km: 8.0,
            psych_adaptability: None,
            coach_rating: None,
            ..session()
        };
        assert_eq!(calculator.cluster_label(&technician), ClusterLabel::Tech);

        let runner = SessionMetrics {
            pass_accuracy: 60.0,
            successful_dribbles: 1.0,
            progressive_actions: 3.0,
            sprints: 22.0,
            distance_km: 12.5,
            psych_adaptability: None,
            coach_rating: None,
            ..session()
        };
        assert_eq!(calculator.cluster_label(&runner), ClusterLabel::Physical);

        let resilient = SessionMetrics {
            pass_accuracy: 60.0,
            successful_dribbles: 1.0,
            progressive_actions: 3.0,
            sprints: 6.0,
            distance_km: 8.0,
            psych_adaptability: Some(9.0),
            coach_rating: Some(9.0),
            ..session()
        };
        assert_eq!(calculator.cluster_label(&resilient), ClusterLabel::Psych);
    }

    #[test]
    fn test_cluster_tie_breaks_by_enum_order() {
        let calculator = PerformanceIndexCalculator::new();

        // Tech and Tactic both score 2; Tech wins by enumeration order
        let tied = SessionMetrics {
            pass_accuracy: 90.0,
            successful_dribbles: 2.0,
            progressive_actions: 12.0,
            interceptions: 2.0,
            sprints: 4.0,
            distance_km: 6.0,
            psych_adaptability: None,
            coach_rating: None,
            ..session()
        };
        assert_eq!(calculator.cluster_label(&tied), ClusterLabel::Tech);
    }

    #[test]
    fn test_analyze_combines_outputs() {
        let calculator = PerformanceIndexCalculator::new();
        let analytics = calculator
            .analyze(&session(), &[40.0, 50.0, 60.0])
            .unwrap();

        assert!((0.0..=100.0).contains(&analytics.performance_index));
        assert!(analytics.rolling_average.is_some());
        assert!(analytics.baseline_zscore.is_some());
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let calculator = PerformanceIndexCalculator::new();
        let prior = [40.0, 50.0, 60.0];
        let first = calculator.analyze(&session(), &prior).unwrap();
        let second = calculator.analyze(&session(), &prior).unwrap();
        assert_eq!(first, second);
    }
}

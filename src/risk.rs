//! Additive injury-risk model composing load, wellness, and schedule signals.
//!
//! Each penalty term is thresholded and capped independently, then summed and
//! clamped to `[0,1]`. The contributing factors returned to the caller are
//! the actual penalty terms ranked by contribution, so the explanation is the
//! computation itself rather than a post-hoc approximation.

use crate::models::{RiskAssessment, RiskFactor, RiskLevel, SessionRecord, SessionType, WellnessEntry};
use chrono::{Days, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;

/// ACWR band considered safe; deviation beyond it is penalized
const ACWR_SAFE_LOW: f64 = 0.5;
const ACWR_SAFE_HIGH: f64 = 1.5;
/// Penalty per unit of ACWR deviation outside the safe band
const ACWR_PENALTY_RATE: f64 = 0.7;
const ACWR_PENALTY_CAP: f64 = 0.35;

const SLEEP_QUALITY_PENALTY: f64 = 0.20;
const STRESS_PENALTY: f64 = 0.20;
const DOMS_PENALTY: f64 = 0.15;
const FATIGUE_PENALTY: f64 = 0.15;
const MATCH_DENSITY_PENALTY: f64 = 0.15;
const VOLATILITY_PENALTY: f64 = 0.10;

/// Match-density window and threshold (matches per 14 days)
const MATCH_DENSITY_WINDOW_DAYS: u64 = 14;
const MATCH_DENSITY_THRESHOLD: usize = 3;

/// Stress std-dev over 7 days above which wellness is considered volatile
const VOLATILITY_THRESHOLD: f64 = 2.0;

/// Maximum number of contributing factors reported
const MAX_FACTORS: usize = 5;

/// Inputs composed from the other calculators for one athlete and date
#[derive(Debug, Clone)]
pub struct RiskInputs<'a> {
    /// Date the assessment refers to
    pub reference_date: NaiveDate,

    /// Current acute:chronic workload ratio, unclamped
    pub acwr: Option<Decimal>,

    /// Most recent wellness entry, if any
    pub wellness: Option<&'a WellnessEntry>,

    /// Sessions within the lookback window (for match density)
    pub sessions: &'a [SessionRecord],

    /// Sample std-dev of the trailing 7-day stress window, if computable
    pub stress_volatility: Option<f64>,
}

/// Injury-risk assessment engine
pub struct RiskAssessor;

impl RiskAssessor {
    pub fn new() -> Self {
        RiskAssessor
    }

    /// Assess injury risk from the composed inputs.
    ///
    /// Missing inputs contribute nothing: an athlete with no wellness entry
    /// and no ACWR scores 0.0 (Low), which callers should read together with
    /// the data-completeness picture, not as a clean bill of health.
    pub fn assess(&self, inputs: &RiskInputs<'_>) -> RiskAssessment {
        let mut factors: Vec<RiskFactor> = Vec::new();

        if let Some(acwr) = inputs.acwr {
            let acwr = acwr.to_f64().unwrap_or(0.0);
            let deviation = if acwr > ACWR_SAFE_HIGH {
                acwr - ACWR_SAFE_HIGH
            } else if acwr < ACWR_SAFE_LOW {
                ACWR_SAFE_LOW - acwr
            } else {
                0.0
            };
            if deviation > 0.0 {
                factors.push(RiskFactor {
                    name: "acwr".to_string(),
                    value: acwr,
                    contribution: (deviation * ACWR_PENALTY_RATE).min(ACWR_PENALTY_CAP),
                });
            }
        }

        if let Some(wellness) = inputs.wellness {
            if let Some(quality) = wellness.sleep_quality {
                if quality <= 2 {
                    factors.push(RiskFactor {
                        name: "sleep_quality".to_string(),
                        value: quality as f64,
                        contribution: SLEEP_QUALITY_PENALTY,
                    });
                }
            }
            if let Some(stress) = wellness.stress_rating {
                if stress >= 4 {
                    factors.push(RiskFactor {
                        name: "stress_rating".to_string(),
                        value: stress as f64,
                        contribution: STRESS_PENALTY,
                    });
                }
            }
            if let Some(doms) = wellness.doms_rating {
                if doms >= 4 {
                    factors.push(RiskFactor {
                        name: "doms_rating".to_string(),
                        value: doms as f64,
                        contribution: DOMS_PENALTY,
                    });
                }
            }
            if let Some(fatigue) = wellness.fatigue_rating {
                if fatigue >= 4 {
                    factors.push(RiskFactor {
                        name: "fatigue_rating".to_string(),
                        value: fatigue as f64,
                        contribution: FATIGUE_PENALTY,
                    });
                }
            }
        }

        let matches = Self::match_count(inputs.sessions, inputs.reference_date);
        if matches > MATCH_DENSITY_THRESHOLD {
            factors.push(RiskFactor {
                name: "match_density".to_string(),
                value: matches as f64,
                contribution: MATCH_DENSITY_PENALTY,
            });
        }

        if let Some(volatility) = inputs.stress_volatility {
            if volatility > VOLATILITY_THRESHOLD {
                factors.push(RiskFactor {
                    name: "stress_volatility".to_string(),
                    value: volatility,
                    contribution: VOLATILITY_PENALTY,
                });
            }
        }

        let total: f64 = factors.iter().map(|f| f.contribution).sum();
        let risk_score = total.clamp(0.0, 1.0);
        let risk_level = RiskLevel::from_score(risk_score);

        factors.sort_by(|a, b| {
            b.contribution
                .partial_cmp(&a.contribution)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        factors.truncate(MAX_FACTORS);

        debug!(
            %inputs.reference_date,
            risk_score,
            factor_count = factors.len(),
            "risk assessment complete"
        );

        RiskAssessment {
            risk_score,
            risk_level,
            contributing_factors: factors,
        }
    }

    /// Matches played inside the trailing density window (inclusive)
    fn match_count(sessions: &[SessionRecord], reference_date: NaiveDate) -> usize {
        let cutoff = reference_date
            .checked_sub_days(Days::new(MATCH_DENSITY_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN);
        sessions
            .iter()
            .filter(|s| {
                s.session_type == SessionType::Match
                    && s.date > cutoff
                    && s.date <= reference_date
            })
            .count()
    }
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::new()
    }
}

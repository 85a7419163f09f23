use crate::error::{ReadyRsError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed enumeration of metric keys understood by the engine.
///
/// Replaces runtime attribute probing across heterogeneous metric records:
/// every value the calculators consume is addressed by one of these keys, so
/// a typo or an unknown metric is a compile-time or parse-time error rather
/// than a silent `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    /// Session-RPE training load (RPE × duration minutes)
    SessionLoad,
    /// Pass accuracy percentage (0-100)
    PassAccuracy,
    /// Progressive passes + carries per session
    ProgressiveActions,
    /// Interceptions per session
    Interceptions,
    /// Successful dribbles per session
    SuccessfulDribbles,
    /// Sprint count per session
    Sprints,
    /// Resting heart rate in bpm
    RestingHr,
    /// Heart rate variability (RMSSD) in milliseconds
    Hrv,
    /// Endurance test level (e.g. yo-yo test stage)
    EnduranceLevel,
    /// Distance covered in kilometers
    DistanceKm,
    /// Sleep duration in hours
    SleepHours,
    /// Coach rating of the session (1-10)
    CoachRating,
    /// Rate of perceived exertion (1-10)
    Rpe,
    /// Psychological adaptability rating (1-10)
    PsychAdaptability,
    /// Self-reported stress rating (1-5)
    StressRating,
}

impl MetricKey {
    /// Canonical lowercase name used in snapshots and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::SessionLoad => "session_load",
            MetricKey::PassAccuracy => "pass_accuracy",
            MetricKey::ProgressiveActions => "progressive_actions",
            MetricKey::Interceptions => "interceptions",
            MetricKey::SuccessfulDribbles => "successful_dribbles",
            MetricKey::Sprints => "sprints",
            MetricKey::RestingHr => "resting_hr",
            MetricKey::Hrv => "hrv",
            MetricKey::EnduranceLevel => "endurance_level",
            MetricKey::DistanceKm => "distance_km",
            MetricKey::SleepHours => "sleep_hours",
            MetricKey::CoachRating => "coach_rating",
            MetricKey::Rpe => "rpe",
            MetricKey::PsychAdaptability => "psych_adaptability",
            MetricKey::StressRating => "stress_rating",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = ReadyRsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "session_load" => Ok(MetricKey::SessionLoad),
            "pass_accuracy" => Ok(MetricKey::PassAccuracy),
            "progressive_actions" => Ok(MetricKey::ProgressiveActions),
            "interceptions" => Ok(MetricKey::Interceptions),
            "successful_dribbles" => Ok(MetricKey::SuccessfulDribbles),
            "sprints" => Ok(MetricKey::Sprints),
            "resting_hr" => Ok(MetricKey::RestingHr),
            "hrv" => Ok(MetricKey::Hrv),
            "endurance_level" => Ok(MetricKey::EnduranceLevel),
            "distance_km" => Ok(MetricKey::DistanceKm),
            "sleep_hours" => Ok(MetricKey::SleepHours),
            "coach_rating" => Ok(MetricKey::CoachRating),
            "rpe" => Ok(MetricKey::Rpe),
            "psych_adaptability" => Ok(MetricKey::PsychAdaptability),
            "stress_rating" => Ok(MetricKey::StressRating),
            _ => Err(ReadyRsError::Validation(format!(
                "Unknown metric key: {}",
                s
            ))),
        }
    }
}

/// Single recorded observation for one metric of one athlete.
///
/// Identity is `(athlete_id, metric_key, timestamp)`. Samples are created by
/// external ingestion and are read-only to the engine; a `None` value means
/// the observation was recorded but the measurement failed or was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Athlete identifier
    pub athlete_id: String,

    /// Which metric this sample belongs to
    pub metric_key: MetricKey,

    /// When the observation was recorded
    pub timestamp: DateTime<Utc>,

    /// Observed value; `None` for a recorded-but-missing measurement
    pub value: Option<f64>,

    /// Optional unit label (informational only)
    pub unit: Option<String>,
}

impl MetricSample {
    pub fn new(
        athlete_id: impl Into<String>,
        metric_key: MetricKey,
        timestamp: DateTime<Utc>,
        value: Option<f64>,
    ) -> Self {
        MetricSample {
            athlete_id: athlete_id.into(),
            metric_key,
            timestamp,
            value,
            unit: None,
        }
    }

    /// Calendar date of the observation (UTC)
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Session types for categorizing training days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionType {
    Training,
    Match,
    Recovery,
    Test,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Training => write!(f, "Training"),
            SessionType::Match => write!(f, "Match"),
            SessionType::Recovery => write!(f, "Recovery"),
            SessionType::Test => write!(f, "Test"),
        }
    }
}

/// One training/match session for one athlete.
///
/// Session load is derived as `rpe × duration_minutes` (session-RPE).
/// Multiple sessions on the same date are summed when computing daily load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Athlete identifier
    pub athlete_id: String,

    /// Date of the session
    pub date: NaiveDate,

    /// Session category
    pub session_type: SessionType,

    /// Duration in minutes (must be > 0)
    pub duration_minutes: u32,

    /// Rate of perceived exertion, 1-10
    pub rpe: u8,
}

impl SessionRecord {
    /// Create a session record, validating duration and RPE ranges.
    ///
    /// Out-of-range values fail fast; they are never silently clamped.
    pub fn new(
        athlete_id: impl Into<String>,
        date: NaiveDate,
        session_type: SessionType,
        duration_minutes: u32,
        rpe: u8,
    ) -> Result<Self> {
        if duration_minutes == 0 {
            return Err(ReadyRsError::Validation(
                "Session duration must be positive".to_string(),
            ));
        }
        if !(1..=10).contains(&rpe) {
            return Err(ReadyRsError::Validation(format!(
                "RPE must be between 1 and 10, got {}",
                rpe
            )));
        }
        Ok(SessionRecord {
            athlete_id: athlete_id.into(),
            date,
            session_type,
            duration_minutes,
            rpe,
        })
    }

    /// Session-RPE load: `rpe × duration_minutes`
    pub fn load(&self) -> Decimal {
        Decimal::from(self.rpe as u32 * self.duration_minutes)
    }
}

/// Daily wellness questionnaire entry. At most one per athlete per date;
/// every field is independently optional (missing-data tolerant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessEntry {
    /// Athlete identifier
    pub athlete_id: String,

    /// Date the entry refers to
    pub date: NaiveDate,

    /// Sleep duration in hours
    pub sleep_hours: Option<f64>,

    /// Subjective sleep quality, 1 (worst) - 5 (best)
    pub sleep_quality: Option<u8>,

    /// Heart rate variability (RMSSD) in milliseconds
    pub hrv_ms: Option<f64>,

    /// Resting heart rate in bpm
    pub resting_hr_bpm: Option<f64>,

    /// Delayed onset muscle soreness, 1 (none) - 5 (severe)
    pub doms_rating: Option<u8>,

    /// Subjective fatigue, 1 (fresh) - 5 (exhausted)
    pub fatigue_rating: Option<u8>,

    /// Subjective stress, 1 (relaxed) - 5 (very stressed)
    pub stress_rating: Option<u8>,

    /// Mood, 1 (worst) - 10 (best)
    pub mood_rating: Option<u8>,
}

impl WellnessEntry {
    /// Create an empty entry for a given athlete and date
    pub fn new(athlete_id: impl Into<String>, date: NaiveDate) -> Self {
        WellnessEntry {
            athlete_id: athlete_id.into(),
            date,
            sleep_hours: None,
            sleep_quality: None,
            hrv_ms: None,
            resting_hr_bpm: None,
            doms_rating: None,
            fatigue_rating: None,
            stress_rating: None,
            mood_rating: None,
        }
    }

    /// Validate all present fields against their documented ranges.
    ///
    /// Missing fields are fine; present-but-out-of-range values fail fast.
    pub fn validate(&self) -> Result<()> {
        fn check_rating(name: &str, value: Option<u8>, min: u8, max: u8) -> Result<()> {
            if let Some(v) = value {
                if !(min..=max).contains(&v) {
                    return Err(ReadyRsError::Validation(format!(
                        "{} must be between {} and {}, got {}",
                        name, min, max, v
                    )));
                }
            }
            Ok(())
        }

        if let Some(h) = self.sleep_hours {
            if !(0.0..=24.0).contains(&h) {
                return Err(ReadyRsError::Validation(format!(
                    "sleep_hours must be between 0 and 24, got {}",
                    h
                )));
            }
        }
        if let Some(hrv) = self.hrv_ms {
            if hrv < 0.0 {
                return Err(ReadyRsError::Validation(format!(
                    "hrv_ms must be non-negative, got {}",
                    hrv
                )));
            }
        }
        if let Some(hr) = self.resting_hr_bpm {
            if hr <= 0.0 {
                return Err(ReadyRsError::Validation(format!(
                    "resting_hr_bpm must be positive, got {}",
                    hr
                )));
            }
        }
        check_rating("sleep_quality", self.sleep_quality, 1, 5)?;
        check_rating("doms_rating", self.doms_rating, 1, 5)?;
        check_rating("fatigue_rating", self.fatigue_rating, 1, 5)?;
        check_rating("stress_rating", self.stress_rating, 1, 5)?;
        check_rating("mood_rating", self.mood_rating, 1, 10)?;
        Ok(())
    }
}

/// Recommended training intensity derived from the readiness score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingIntensity {
    Max,
    High,
    Moderate,
    Low,
}

impl fmt::Display for TrainingIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingIntensity::Max => write!(f, "Max"),
            TrainingIntensity::High => write!(f, "High"),
            TrainingIntensity::Moderate => write!(f, "Moderate"),
            TrainingIntensity::Low => write!(f, "Low"),
        }
    }
}

/// Daily readiness assessment. Component scores and the composite are all
/// in `[0,100]`; recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessResult {
    /// Sleep component score (0-100)
    pub sleep_score: f64,

    /// HRV / resting heart rate component score (0-100)
    pub hrv_score: f64,

    /// Muscular recovery component score (0-100)
    pub recovery_score: f64,

    /// Psychological wellness component score (0-100)
    pub wellness_score: f64,

    /// Workload component score derived from ACWR (0-100)
    pub workload_score: f64,

    /// Composite readiness score (0-100), rounded to one decimal
    pub readiness_score: f64,

    /// Raw acute:chronic workload ratio; `None` with insufficient history
    pub acwr: Option<Decimal>,

    /// Recommended training intensity for the day
    pub recommended_intensity: TrainingIntensity,

    /// Whether the athlete is cleared for full training
    pub can_train_full: bool,

    /// Whether readiness indicates elevated injury risk
    pub injury_risk_flag: bool,
}

/// Performance cluster labels. Enumeration order breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClusterLabel {
    Tech,
    Tactic,
    Physical,
    Psych,
}

impl ClusterLabel {
    /// All labels in tie-break order
    pub const ALL: [ClusterLabel; 4] = [
        ClusterLabel::Tech,
        ClusterLabel::Tactic,
        ClusterLabel::Physical,
        ClusterLabel::Psych,
    ];
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterLabel::Tech => write!(f, "TECH"),
            ClusterLabel::Tactic => write!(f, "TACTIC"),
            ClusterLabel::Physical => write!(f, "PHYSICAL"),
            ClusterLabel::Psych => write!(f, "PSYCH"),
        }
    }
}

/// Per-session performance analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAnalytics {
    /// Weighted per-session performance index (0-100)
    pub performance_index: f64,

    /// Mean of the most recent (up to 4) indices; `None` with fewer than 2
    pub rolling_average: Option<f64>,

    /// Standard deviations from the athlete's own historical mean;
    /// `None` with fewer than 3 prior sessions
    pub baseline_zscore: Option<f64>,

    /// Dominant performance cluster for the session
    pub cluster_label: ClusterLabel,
}

/// Injury risk categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Map a clamped risk score in `[0,1]` to its category
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            RiskLevel::Low
        } else if score < 0.5 {
            RiskLevel::Medium
        } else if score < 0.7 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::VeryHigh => write!(f, "Very High"),
        }
    }
}

/// One penalty term that contributed to a risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Stable feature name (e.g. "acwr", "stress_rating")
    pub name: String,

    /// Observed value that triggered the penalty
    pub value: f64,

    /// Contribution added to the risk score
    pub contribution: f64,
}

/// Composite injury-risk assessment with ranked contributing factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Total risk score, clamped to `[0,1]`
    pub risk_score: f64,

    /// Categorical risk level
    pub risk_level: RiskLevel,

    /// Penalty terms sorted by descending contribution, top 5
    pub contributing_factors: Vec<RiskFactor>,
}

/// Training-load block for one athlete at one reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadMetrics {
    /// Date the metrics are computed for
    pub reference_date: NaiveDate,

    /// Sum of daily session loads over the trailing acute window (7d)
    pub acute_load: Decimal,

    /// Chronic 28-day load expressed as a weekly-equivalent average
    pub chronic_weekly_load: Decimal,

    /// Acute:chronic workload ratio; `None` when chronic weekly load is zero
    /// or history spans fewer than the minimum days
    pub acwr: Option<Decimal>,

    /// Training monotony: mean / std-dev of the 7 daily loads
    pub monotony: Decimal,

    /// Training strain: mean daily load × monotony
    pub strain: Decimal,

    /// Days from the earliest session to the reference date, inclusive
    pub history_days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_metric_key_round_trip() {
        for key in [
            MetricKey::SessionLoad,
            MetricKey::PassAccuracy,
            MetricKey::Hrv,
            MetricKey::PsychAdaptability,
        ] {
            assert_eq!(key.as_str().parse::<MetricKey>().unwrap(), key);
        }
        assert!("bench_press".parse::<MetricKey>().is_err());
    }

    #[test]
    fn test_session_load() {
        let session = SessionRecord::new(
            "a1",
            date(2025, 3, 10),
            SessionType::Training,
            90,
            7,
        )
        .unwrap();
        assert_eq!(session.load(), dec!(630));
    }

    #[test]
    fn test_session_validation_fails_fast() {
        let zero_duration =
            SessionRecord::new("a1", date(2025, 3, 10), SessionType::Training, 0, 5);
        assert!(zero_duration.is_err());

        let bad_rpe = SessionRecord::new("a1", date(2025, 3, 10), SessionType::Match, 60, 11);
        assert!(bad_rpe.is_err());
    }

    #[test]
    fn test_wellness_validation() {
        let mut entry = WellnessEntry::new("a1", date(2025, 3, 10));
        entry.sleep_hours = Some(7.5);
        entry.mood_rating = Some(8);
        assert!(entry.validate().is_ok());

        entry.stress_rating = Some(6);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.5), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.7), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::VeryHigh);
    }

    #[test]
    fn test_cluster_label_tie_break_order() {
        assert!(ClusterLabel::Tech < ClusterLabel::Tactic);
        assert!(ClusterLabel::Tactic < ClusterLabel::Physical);
        assert!(ClusterLabel::Physical < ClusterLabel::Psych);
    }
}

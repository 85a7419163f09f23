//! Metric time-series view and the abstract metric store interface.
//!
//! The engine never owns storage: callers materialize a bounded date range
//! from an external store into a `MetricTimeSeries`, which the calculators
//! then treat as an immutable point-in-time snapshot. Snapshot consistency
//! across concurrent ingestion is the store's responsibility, not ours.

use crate::error::{ReadyRsError, Result};
use crate::models::{MetricKey, MetricSample, SessionRecord, WellnessEntry};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Ordered in-memory view of `(timestamp, value)` samples for one metric key
/// of one athlete.
///
/// Construction validates the identity invariant: all samples belong to the
/// same `(athlete_id, metric_key)` pair and no two samples share a timestamp.
/// Duplicate timestamps are a data-quality error, never a silent overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTimeSeries {
    athlete_id: String,
    metric_key: MetricKey,
    samples: Vec<MetricSample>,
}

impl MetricTimeSeries {
    /// Build a series from raw samples, sorting ascending by timestamp.
    pub fn new(
        athlete_id: impl Into<String>,
        metric_key: MetricKey,
        mut samples: Vec<MetricSample>,
    ) -> Result<Self> {
        let athlete_id = athlete_id.into();

        for sample in &samples {
            if sample.athlete_id != athlete_id {
                return Err(ReadyRsError::Validation(format!(
                    "Sample for athlete {} in series for athlete {}",
                    sample.athlete_id, athlete_id
                )));
            }
            if sample.metric_key != metric_key {
                return Err(ReadyRsError::Validation(format!(
                    "Sample for metric {} in series for metric {}",
                    sample.metric_key, metric_key
                )));
            }
        }

        samples.sort_by_key(|s| s.timestamp);

        for pair in samples.windows(2) {
            if pair[0].timestamp == pair[1].timestamp {
                return Err(ReadyRsError::Validation(format!(
                    "Duplicate sample for ({}, {}, {})",
                    athlete_id, metric_key, pair[0].timestamp
                )));
            }
        }

        Ok(MetricTimeSeries {
            athlete_id,
            metric_key,
            samples,
        })
    }

    /// Empty series for a key with no recorded samples
    pub fn empty(athlete_id: impl Into<String>, metric_key: MetricKey) -> Self {
        MetricTimeSeries {
            athlete_id: athlete_id.into(),
            metric_key,
            samples: Vec::new(),
        }
    }

    pub fn athlete_id(&self) -> &str {
        &self.athlete_id
    }

    pub fn metric_key(&self) -> MetricKey {
        self.metric_key
    }

    /// Samples in ascending timestamp order
    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Latest non-missing value on or before `date`
    pub fn latest_value_on_or_before(&self, date: NaiveDate) -> Option<f64> {
        self.samples
            .iter()
            .rev()
            .filter(|s| s.date() <= date)
            .find_map(|s| s.value)
    }
}

/// Abstract read interface to the external metric store.
///
/// All three queries return ascending, duplicate-free sequences for a bounded
/// date range (`date_from..=date_to`). The store must serve each call as a
/// snapshot-consistent read; the engine performs no locking of its own.
pub trait MetricStore {
    /// Samples for one metric key, ascending by timestamp
    fn get_samples(
        &self,
        athlete_id: &str,
        metric_key: MetricKey,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<MetricSample>>;

    /// Session records, ascending by date
    fn get_sessions(
        &self,
        athlete_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<SessionRecord>>;

    /// Wellness entries, ascending by date
    fn get_wellness(
        &self,
        athlete_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<WellnessEntry>>;
}

/// Simple vector-backed store used by the CLI snapshot input and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryMetricStore {
    #[serde(default)]
    pub samples: Vec<MetricSample>,

    #[serde(default)]
    pub sessions: Vec<SessionRecord>,

    #[serde(default)]
    pub wellness: Vec<WellnessEntry>,
}

impl InMemoryMetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every record in the snapshot before first use.
    ///
    /// Sample identity is `(athlete_id, metric_key, timestamp)`; two samples
    /// sharing one is a data-quality error, never a silent overwrite.
    pub fn validate(&self) -> Result<()> {
        for session in &self.sessions {
            if session.duration_minutes == 0 || !(1..=10).contains(&session.rpe) {
                return Err(ReadyRsError::Validation(format!(
                    "Invalid session for {} on {}: duration={}min rpe={}",
                    session.athlete_id, session.date, session.duration_minutes, session.rpe
                )));
            }
        }
        for entry in &self.wellness {
            entry.validate()?;
        }

        let mut identities: Vec<(&str, MetricKey, DateTime<Utc>)> = self
            .samples
            .iter()
            .map(|s| (s.athlete_id.as_str(), s.metric_key, s.timestamp))
            .collect();
        identities.sort();
        for pair in identities.windows(2) {
            if pair[0] == pair[1] {
                let (athlete_id, metric_key, timestamp) = pair[0];
                return Err(ReadyRsError::Validation(format!(
                    "Duplicate sample for ({}, {}, {})",
                    athlete_id, metric_key, timestamp
                )));
            }
        }
        Ok(())
    }
}

impl MetricStore for InMemoryMetricStore {
    fn get_samples(
        &self,
        athlete_id: &str,
        metric_key: MetricKey,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<MetricSample>> {
        let mut samples: Vec<MetricSample> = self
            .samples
            .iter()
            .filter(|s| {
                s.athlete_id == athlete_id
                    && s.metric_key == metric_key
                    && s.date() >= date_from
                    && s.date() <= date_to
            })
            .cloned()
            .collect();
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }

    fn get_sessions(
        &self,
        athlete_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<SessionRecord>> {
        let mut sessions: Vec<SessionRecord> = self
            .sessions
            .iter()
            .filter(|s| s.athlete_id == athlete_id && s.date >= date_from && s.date <= date_to)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.date);
        Ok(sessions)
    }

    fn get_wellness(
        &self,
        athlete_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<WellnessEntry>> {
        let mut entries: Vec<WellnessEntry> = self
            .wellness
            .iter()
            .filter(|w| w.athlete_id == athlete_id && w.date >= date_from && w.date <= date_to)
            .cloned()
            .collect();
        entries.sort_by_key(|w| w.date);
        Ok(entries)
    }
}

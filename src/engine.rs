//! Orchestration facade: pulls bounded time-series from a `MetricStore` and
//! feeds the pure calculators.
//!
//! The engine holds no mutable state; every method re-reads its inputs and
//! recomputes from scratch, so results are a pure function of the store
//! snapshot, the athlete, and the reference date.

use crate::config::EngineConfig;
use crate::error::{CalculationError, Result};
use crate::load::LoadRatioCalculator;
use crate::models::{
    LoadMetrics, MetricKey, MetricSample, PerformanceAnalytics, ReadinessResult, RiskAssessment,
    SessionRecord, SessionType, WellnessEntry,
};
use crate::performance::{PerformanceIndexCalculator, SessionMetrics};
use crate::readiness::ReadinessScorer;
use crate::risk::{RiskAssessor, RiskInputs};
use crate::timeseries::{MetricStore, MetricTimeSeries};
use crate::window::WindowAggregator;
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Metric keys that feed the performance index
const PERFORMANCE_KEYS: [MetricKey; 12] = [
    MetricKey::PassAccuracy,
    MetricKey::ProgressiveActions,
    MetricKey::Interceptions,
    MetricKey::SuccessfulDribbles,
    MetricKey::Sprints,
    MetricKey::RestingHr,
    MetricKey::DistanceKm,
    MetricKey::Rpe,
    MetricKey::EnduranceLevel,
    MetricKey::SleepHours,
    MetricKey::CoachRating,
    MetricKey::PsychAdaptability,
];

/// Analysis facade over an abstract metric store
pub struct AnalysisEngine<S: MetricStore> {
    store: S,
    config: EngineConfig,
    loads: LoadRatioCalculator,
    readiness: ReadinessScorer,
    performance: PerformanceIndexCalculator,
    risk: RiskAssessor,
}

impl<S: MetricStore> AnalysisEngine<S> {
    /// Create an engine with default configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create an engine with custom configuration
    pub fn with_config(store: S, config: EngineConfig) -> Self {
        let loads = LoadRatioCalculator::with_config(config.load.clone());
        let readiness = ReadinessScorer::with_weights(config.readiness.clone());
        AnalysisEngine {
            store,
            config,
            loads,
            readiness,
            performance: PerformanceIndexCalculator::new(),
            risk: RiskAssessor::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lookback_start(&self, reference_date: NaiveDate) -> NaiveDate {
        reference_date
            .checked_sub_days(Days::new(self.config.lookback_days as u64))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Training-load block (acute/chronic load, ACWR, monotony, strain)
    #[instrument(skip(self))]
    pub fn load_metrics(&self, athlete_id: &str, reference_date: NaiveDate) -> Result<LoadMetrics> {
        let sessions = self.sessions_in_lookback(athlete_id, reference_date)?;
        Ok(self.loads.calculate(&sessions, reference_date))
    }

    /// Daily readiness score and training-intensity recommendation
    #[instrument(skip(self))]
    pub fn readiness(&self, athlete_id: &str, reference_date: NaiveDate) -> Result<ReadinessResult> {
        let load = self.load_metrics(athlete_id, reference_date)?;
        let wellness = self.recent_wellness(athlete_id, reference_date)?;
        Ok(self.readiness.score(wellness.as_ref(), load.acwr))
    }

    /// Performance analytics for the most recent session on or before the
    /// reference date
    #[instrument(skip(self))]
    pub fn performance(
        &self,
        athlete_id: &str,
        reference_date: NaiveDate,
    ) -> Result<PerformanceAnalytics> {
        let session_dates = self.performance_session_dates(athlete_id, reference_date)?;
        let (&current_date, prior_dates) = session_dates.split_last().ok_or_else(|| {
            CalculationError::InsufficientData {
                calculation: "performance index".to_string(),
                reason: "no training or match sessions in lookback window".to_string(),
            }
        })?;

        let current = self.session_metrics_for(athlete_id, current_date)?;

        let mut prior_indices = Vec::with_capacity(prior_dates.len());
        for &date in prior_dates {
            match self.session_metrics_for(athlete_id, date) {
                Ok(metrics) => prior_indices.push(self.performance.performance_index(&metrics)?),
                Err(err) => {
                    // Sessions without full metric coverage stay out of the
                    // baseline rather than poisoning it with defaults
                    debug!(%date, %err, "skipping session with incomplete metrics");
                }
            }
        }

        self.performance.analyze(&current, &prior_indices)
    }

    /// Injury-risk assessment composing ACWR, wellness, and schedule signals
    #[instrument(skip(self))]
    pub fn risk(&self, athlete_id: &str, reference_date: NaiveDate) -> Result<RiskAssessment> {
        let load = self.load_metrics(athlete_id, reference_date)?;
        let sessions = self.sessions_in_lookback(athlete_id, reference_date)?;
        let wellness = self.recent_wellness(athlete_id, reference_date)?;
        let stress_volatility = self.stress_volatility(athlete_id, reference_date)?;

        let inputs = RiskInputs {
            reference_date,
            acwr: load.acwr,
            wellness: wellness.as_ref(),
            sessions: &sessions,
            stress_volatility,
        };
        Ok(self.risk.assess(&inputs))
    }

    fn sessions_in_lookback(
        &self,
        athlete_id: &str,
        reference_date: NaiveDate,
    ) -> Result<Vec<SessionRecord>> {
        self.store
            .get_sessions(athlete_id, self.lookback_start(reference_date), reference_date)
    }

    /// The wellness entry for the reference date, or the most recent one
    /// within the staleness window before it
    fn recent_wellness(
        &self,
        athlete_id: &str,
        reference_date: NaiveDate,
    ) -> Result<Option<WellnessEntry>> {
        let from = reference_date
            .checked_sub_days(Days::new(self.config.wellness_staleness_days as u64))
            .unwrap_or(NaiveDate::MIN);
        let entries = self.store.get_wellness(athlete_id, from, reference_date)?;
        Ok(entries.into_iter().last())
    }

    /// Sample std-dev of the trailing 7-day stress window, built from the
    /// stress ratings of the wellness entries in the lookback
    fn stress_volatility(
        &self,
        athlete_id: &str,
        reference_date: NaiveDate,
    ) -> Result<Option<f64>> {
        let entries = self.store.get_wellness(
            athlete_id,
            self.lookback_start(reference_date),
            reference_date,
        )?;
        let samples: Vec<MetricSample> = entries
            .iter()
            .map(|entry| {
                MetricSample::new(
                    athlete_id,
                    MetricKey::StressRating,
                    entry.date.and_time(chrono::NaiveTime::MIN).and_utc(),
                    entry.stress_rating.map(f64::from),
                )
            })
            .collect();
        let series = MetricTimeSeries::new(athlete_id, MetricKey::StressRating, samples)?;
        Ok(WindowAggregator::aggregate(&series, reference_date, 7).std_dev)
    }

    /// Distinct Training/Match session dates in the lookback, ascending
    fn performance_session_dates(
        &self,
        athlete_id: &str,
        reference_date: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let sessions = self.sessions_in_lookback(athlete_id, reference_date)?;
        let mut dates: Vec<NaiveDate> = sessions
            .iter()
            .filter(|s| {
                matches!(s.session_type, SessionType::Training | SessionType::Match)
            })
            .map(|s| s.date)
            .collect();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    /// Build the typed performance inputs for one session date from the
    /// metric store
    fn session_metrics_for(
        &self,
        athlete_id: &str,
        date: NaiveDate,
    ) -> Result<SessionMetrics> {
        let mut metrics: BTreeMap<MetricKey, f64> = BTreeMap::new();
        for key in PERFORMANCE_KEYS {
            let samples = self.store.get_samples(athlete_id, key, date, date)?;
            // The series constructor enforces sample identity, so a
            // conflicting duplicate surfaces here instead of one value
            // silently winning. Latest valued sample of the day is used;
            // missing-value samples leave the key absent.
            let series = MetricTimeSeries::new(athlete_id, key, samples)?;
            if let Some(value) = series.latest_value_on_or_before(date) {
                metrics.insert(key, value);
            }
        }
        SessionMetrics::from_metrics(&metrics)
    }
}

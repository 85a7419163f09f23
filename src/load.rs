//! Training-load ratios: ACWR, monotony, and strain.
//!
//! Loads are session-RPE (`rpe × duration_minutes`) summed per calendar day.
//! The acute:chronic ratio uses the weekly-equivalent convention:
//! `acute_7d_sum / (chronic_28d_sum / 4)`, so both sides of the ratio are
//! expressed in the same weekly units.

use crate::models::{LoadMetrics, SessionRecord};
use chrono::{Days, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Load calculation configuration with customizable window lengths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Acute window in days (default: 7)
    pub acute_window_days: u16,

    /// Chronic window in days (default: 28)
    pub chronic_window_days: u16,

    /// Minimum span of session history, in days, for a reliable ACWR
    pub min_history_days: u16,
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            acute_window_days: 7,
            chronic_window_days: 28,
            min_history_days: 7,
        }
    }
}

/// Core ACWR / monotony / strain calculation engine
pub struct LoadRatioCalculator {
    config: LoadConfig,
}

impl LoadRatioCalculator {
    /// Create a calculator with default configuration
    pub fn new() -> Self {
        LoadRatioCalculator {
            config: LoadConfig::default(),
        }
    }

    /// Create a calculator with custom configuration
    pub fn with_config(config: LoadConfig) -> Self {
        LoadRatioCalculator { config }
    }

    /// Aggregate session loads per day. Sessions on the same date are summed.
    pub fn aggregate_daily_loads(
        &self,
        sessions: &[SessionRecord],
    ) -> BTreeMap<NaiveDate, Decimal> {
        let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for session in sessions {
            *daily.entry(session.date).or_insert(Decimal::ZERO) += session.load();
        }
        daily
    }

    /// Compute the full load block for a reference date.
    ///
    /// ACWR is `None` when the chronic weekly load is zero or the session
    /// history spans fewer than `min_history_days` days; that is an
    /// insufficient-history outcome, not an error. Raw ratios are never
    /// clamped here; values above 2.0 or below 0.3 are valid outputs.
    pub fn calculate(
        &self,
        sessions: &[SessionRecord],
        reference_date: NaiveDate,
    ) -> LoadMetrics {
        let daily = self.aggregate_daily_loads(sessions);

        let acute_days = self.config.acute_window_days as u64;
        let chronic_days = self.config.chronic_window_days as u64;

        let acute_loads = Self::window_loads(&daily, reference_date, acute_days);
        let chronic_loads = Self::window_loads(&daily, reference_date, chronic_days);

        let acute_sum: Decimal = acute_loads.iter().sum();
        let chronic_sum: Decimal = chronic_loads.iter().sum();

        // Weekly-equivalent chronic load: 28-day sum over 4 weeks
        let chronic_weeks =
            Decimal::from(self.config.chronic_window_days) / Decimal::from(7);
        let chronic_weekly = if chronic_weeks.is_zero() {
            Decimal::ZERO
        } else {
            chronic_sum / chronic_weeks
        };

        let history_days = sessions
            .iter()
            .filter(|s| s.date <= reference_date)
            .map(|s| s.date)
            .min()
            .map(|earliest| (reference_date - earliest).num_days() + 1)
            .unwrap_or(0);

        let acwr = if chronic_weekly.is_zero()
            || history_days < self.config.min_history_days as i64
        {
            debug!(
                %reference_date,
                history_days,
                %chronic_weekly,
                "insufficient history for ACWR"
            );
            None
        } else {
            Some(acute_sum / chronic_weekly)
        };

        // Monotony over the fixed acute window, rest days counted as zero
        let mean = acute_sum / Decimal::from(self.config.acute_window_days);
        let std_dev = Self::population_std_dev(&acute_loads, mean);
        let monotony = if std_dev.is_zero() {
            Decimal::ZERO
        } else {
            mean / std_dev
        };
        let strain = mean * monotony;

        LoadMetrics {
            reference_date,
            acute_load: acute_sum,
            chronic_weekly_load: chronic_weekly,
            acwr,
            monotony,
            strain,
            history_days,
        }
    }

    /// Daily loads for the trailing window ending on `reference_date`,
    /// zero-filled for days without sessions. Treat-missing-as-zero is the
    /// documented policy at this call site: a rest day genuinely is zero load.
    fn window_loads(
        daily: &BTreeMap<NaiveDate, Decimal>,
        reference_date: NaiveDate,
        window_days: u64,
    ) -> Vec<Decimal> {
        let mut loads = Vec::with_capacity(window_days as usize);
        for offset in (0..window_days).rev() {
            let date = reference_date
                .checked_sub_days(Days::new(offset))
                .unwrap_or(NaiveDate::MIN);
            loads.push(daily.get(&date).copied().unwrap_or(Decimal::ZERO));
        }
        loads
    }

    fn population_std_dev(loads: &[Decimal], mean: Decimal) -> Decimal {
        if loads.is_empty() {
            return Decimal::ZERO;
        }
        let variance: Decimal = loads
            .iter()
            .map(|load| {
                let diff = *load - mean;
                diff * diff
            })
            .sum::<Decimal>()
            / Decimal::from(loads.len() as u64);
        Decimal::from_f64_retain(variance.to_f64().unwrap_or(0.0).sqrt()).unwrap_or_default()
    }
}

impl Default for LoadRatioCalculator {
    fn default() -> Self {
        Self::new()
    }
}

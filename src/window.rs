//! Rolling-window reduction over a metric time-series.
//!
//! `WindowAggregator` is the shared primitive behind every scorer: acute and
//! chronic load sums, wellness volatility, and baseline statistics all reduce
//! an N-day trailing window to `(sum, mean, std-dev, count)`.

use crate::timeseries::MetricTimeSeries;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

/// Result of reducing one trailing window.
///
/// `sum`/`mean`/`std_dev` are `None` when no valued samples fall inside the
/// window; the caller decides the fallback policy. Zero is never silently
/// substituted here, so "no data" stays distinguishable from "zero load".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Sum of valued samples in the window
    pub sum: Option<f64>,

    /// Mean of valued samples in the window
    pub mean: Option<f64>,

    /// Sample standard deviation; `None` with fewer than 2 valued samples
    pub std_dev: Option<f64>,

    /// Number of valued samples in the window
    pub count: usize,

    /// Number of recorded-but-missing samples in the window
    pub missing: usize,
}

impl WindowStats {
    /// Fraction of recorded samples in the window that carried a value
    pub fn completeness(&self) -> Option<f64> {
        let total = self.count + self.missing;
        if total == 0 {
            None
        } else {
            Some(self.count as f64 / total as f64)
        }
    }
}

/// Generic rolling-window reducer over a `MetricTimeSeries`.
pub struct WindowAggregator;

impl WindowAggregator {
    /// Reduce samples with `reference_date - window_days < date <= reference_date`.
    ///
    /// Samples with a missing value are excluded from all numeric outputs but
    /// counted in `missing` for completeness reporting.
    pub fn aggregate(
        series: &MetricTimeSeries,
        reference_date: NaiveDate,
        window_days: u64,
    ) -> WindowStats {
        let cutoff = reference_date
            .checked_sub_days(Days::new(window_days))
            .unwrap_or(NaiveDate::MIN);

        let mut values = Vec::new();
        let mut missing = 0usize;

        for sample in series.samples() {
            let date = sample.date();
            if date <= cutoff || date > reference_date {
                continue;
            }
            match sample.value {
                Some(v) => values.push(v),
                None => missing += 1,
            }
        }

        let count = values.len();
        if count == 0 {
            debug!(
                metric = %series.metric_key(),
                %reference_date,
                window_days,
                "no valued samples in window"
            );
            return WindowStats {
                sum: None,
                mean: None,
                std_dev: None,
                count: 0,
                missing,
            };
        }

        let sum: f64 = values.iter().sum();
        let mean = values.iter().mean();
        let std_dev = if count >= 2 {
            Some(values.iter().std_dev())
        } else {
            None
        };

        WindowStats {
            sum: Some(sum),
            mean: Some(mean),
            std_dev,
            count,
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricKey, MetricSample};
    use chrono::{TimeZone, Utc};

    fn series(values: &[(u32, Option<f64>)]) -> MetricTimeSeries {
        let samples = values
            .iter()
            .map(|&(day, value)| {
                MetricSample::new(
                    "a1",
                    MetricKey::SessionLoad,
                    Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap(),
                    value,
                )
            })
            .collect();
        MetricTimeSeries::new("a1", MetricKey::SessionLoad, samples).unwrap()
    }

    fn ref_date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn test_window_bounds_are_half_open() {
        // 7-day window ending on the 14th covers the 8th through the 14th
        let series = series(&[(7, Some(100.0)), (8, Some(10.0)), (14, Some(20.0))]);
        let stats = WindowAggregator::aggregate(&series, ref_date(14), 7);

        assert_eq!(stats.count, 2);
        assert_eq!(stats.sum, Some(30.0));
    }

    #[test]
    fn test_empty_window_returns_none_not_zero() {
        let series = series(&[(1, Some(100.0))]);
        let stats = WindowAggregator::aggregate(&series, ref_date(20), 7);

        assert_eq!(stats.count, 0);
        assert_eq!(stats.sum, None);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.std_dev, None);
    }

    #[test]
    fn test_missing_values_counted_separately() {
        let series = series(&[(10, Some(40.0)), (11, None), (12, Some(60.0))]);
        let stats = WindowAggregator::aggregate(&series, ref_date(14), 7);

        assert_eq!(stats.count, 2);
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.sum, Some(100.0));
        assert_eq!(stats.mean, Some(50.0));
        assert_eq!(stats.completeness(), Some(2.0 / 3.0));
    }

    #[test]
    fn test_std_dev_requires_two_samples() {
        let single = series(&[(10, Some(40.0))]);
        let stats = WindowAggregator::aggregate(&single, ref_date(14), 7);
        assert_eq!(stats.std_dev, None);

        let pair = series(&[(10, Some(40.0)), (11, Some(60.0))]);
        let stats = WindowAggregator::aggregate(&pair, ref_date(14), 7);
        // Sample std-dev of {40, 60}
        let sd = stats.std_dev.unwrap();
        assert!((sd - (200.0_f64).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let series = series(&[(10, Some(40.0)), (11, Some(55.0)), (13, None)]);
        let first = WindowAggregator::aggregate(&series, ref_date(14), 7);
        let second = WindowAggregator::aggregate(&series, ref_date(14), 7);
        assert_eq!(first, second);
    }
}

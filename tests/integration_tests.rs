//! End-to-end tests through `AnalysisEngine` and the in-memory store.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use readyrs::engine::AnalysisEngine;
use readyrs::models::{
    ClusterLabel, MetricKey, MetricSample, RiskLevel, SessionRecord, SessionType,
    TrainingIntensity, WellnessEntry,
};
use readyrs::timeseries::InMemoryMetricStore;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn session(day: u32, session_type: SessionType, duration: u32, rpe: u8) -> SessionRecord {
    SessionRecord::new("a1", date(day), session_type, duration, rpe).unwrap()
}

fn sample(day: u32, key: MetricKey, value: f64) -> MetricSample {
    MetricSample::new(
        "a1",
        key,
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
        Some(value),
    )
}

/// Full performance metric set for one session day
fn performance_samples(day: u32, pass_accuracy: f64, sprints: f64) -> Vec<MetricSample> {
    vec![
        sample(day, MetricKey::PassAccuracy, pass_accuracy),
        sample(day, MetricKey::ProgressiveActions, 80.0),
        sample(day, MetricKey::Interceptions, 6.0),
        sample(day, MetricKey::SuccessfulDribbles, 4.0),
        sample(day, MetricKey::Sprints, sprints),
        sample(day, MetricKey::RestingHr, 54.0),
        sample(day, MetricKey::DistanceKm, 10.5),
        sample(day, MetricKey::Rpe, 7.0),
        sample(day, MetricKey::CoachRating, 7.0),
    ]
}

/// 28 days of steady training: 240 load/day for three weeks, 720 load/day
/// for the final week. Acute 7d sum = 5040, chronic weekly = 2520, ACWR = 2.0.
fn spiked_load_store() -> InMemoryMetricStore {
    let mut store = InMemoryMetricStore::new();
    for day in 1..=21 {
        store.sessions.push(session(day, SessionType::Training, 60, 4));
    }
    for day in 22..=28 {
        store.sessions.push(session(day, SessionType::Training, 90, 8));
    }
    store
}

#[test]
fn test_acwr_through_engine() {
    let engine = AnalysisEngine::new(spiked_load_store());
    let metrics = engine.load_metrics("a1", date(28)).unwrap();

    assert_eq!(metrics.acute_load, dec!(5040));
    assert_eq!(metrics.chronic_weekly_load, dec!(2520));
    assert_eq!(metrics.acwr, Some(dec!(2)));
    assert_eq!(metrics.history_days, 28);
}

#[test]
fn test_spec_risk_scenario_is_very_high_with_acwr_on_top() {
    let mut store = spiked_load_store();
    let mut wellness = WellnessEntry::new("a1", date(28));
    wellness.sleep_quality = Some(1);
    wellness.stress_rating = Some(5);
    store.wellness.push(wellness);

    let engine = AnalysisEngine::new(store);
    let assessment = engine.risk("a1", date(28)).unwrap();

    assert_eq!(assessment.risk_level, RiskLevel::VeryHigh);
    assert_eq!(assessment.contributing_factors[0].name, "acwr");
    assert_eq!(assessment.contributing_factors[0].value, 2.0);
}

#[test]
fn test_readiness_reflects_overtraining_workload() {
    let mut store = spiked_load_store();
    let mut wellness = WellnessEntry::new("a1", date(28));
    wellness.sleep_hours = Some(8.0);
    wellness.sleep_quality = Some(5);
    wellness.hrv_ms = Some(70.0);
    wellness.resting_hr_bpm = Some(55.0);
    wellness.doms_rating = Some(1);
    wellness.fatigue_rating = Some(1);
    wellness.stress_rating = Some(1);
    wellness.mood_rating = Some(10);
    store.wellness.push(wellness);

    let engine = AnalysisEngine::new(store);
    let result = engine.readiness("a1", date(28)).unwrap();

    // Everything perfect except the workload component, which an ACWR of 2.0
    // drives to zero: 0.85 * 100 + 0.15 * 0
    assert_eq!(result.workload_score, 0.0);
    assert_eq!(result.readiness_score, 85.0);
    assert_eq!(result.recommended_intensity, TrainingIntensity::Max);
    assert_eq!(result.acwr, Some(dec!(2)));
}

#[test]
fn test_readiness_without_any_wellness_data_never_raises() {
    // Sessions exist but the athlete filed no wellness entries at all
    let engine = AnalysisEngine::new(spiked_load_store());
    let result = engine.readiness("a1", date(28)).unwrap();

    assert_eq!(result.sleep_score, 50.0);
    assert_eq!(result.recovery_score, 50.0);
    // ACWR of 2.0 still feeds the workload component
    assert_eq!(result.workload_score, 0.0);
    assert!((0.0..=100.0).contains(&result.readiness_score));
}

#[test]
fn test_stale_wellness_entry_is_ignored() {
    let mut store = spiked_load_store();
    // Entry five days old, beyond the default 2-day staleness window
    let mut wellness = WellnessEntry::new("a1", date(23));
    wellness.doms_rating = Some(5);
    wellness.fatigue_rating = Some(5);
    store.wellness.push(wellness);

    let engine = AnalysisEngine::new(store);
    let result = engine.readiness("a1", date(28)).unwrap();
    assert_eq!(result.recovery_score, 50.0);
}

#[test]
fn test_performance_analytics_through_engine() {
    let mut store = InMemoryMetricStore::new();
    for (i, day) in [10u32, 14, 18, 22, 26].iter().enumerate() {
        store
            .sessions
            .push(session(*day, SessionType::Match, 95, 7));
        store
            .samples
            .extend(performance_samples(*day, 80.0 + i as f64 * 3.0, 12.0));
    }

    let engine = AnalysisEngine::new(store);
    let analytics = engine.performance("a1", date(28)).unwrap();

    assert!((0.0..=100.0).contains(&analytics.performance_index));
    // Four prior sessions: both history-derived outputs are available
    assert!(analytics.rolling_average.is_some());
    assert!(analytics.baseline_zscore.is_some());
    // Rising pass accuracy across sessions puts the last one above baseline
    assert!(analytics.baseline_zscore.unwrap() > 0.0);
}

#[test]
fn test_performance_skips_sessions_without_metrics() {
    let mut store = InMemoryMetricStore::new();
    // Two fully-instrumented sessions, one bare session in between
    store.sessions.push(session(10, SessionType::Training, 60, 6));
    store.samples.extend(performance_samples(10, 82.0, 14.0));
    store.sessions.push(session(14, SessionType::Training, 60, 6));
    store.sessions.push(session(18, SessionType::Match, 95, 8));
    store.samples.extend(performance_samples(18, 85.0, 16.0));

    let engine = AnalysisEngine::new(store);
    let analytics = engine.performance("a1", date(28)).unwrap();

    // Only one usable prior session: rolling average yes, z-score no
    assert!(analytics.rolling_average.is_some());
    assert_eq!(analytics.baseline_zscore, None);
}

#[test]
fn test_cluster_label_from_store_metrics() {
    let mut store = InMemoryMetricStore::new();
    store.sessions.push(session(20, SessionType::Match, 95, 7));
    store.samples.extend(vec![
        sample(20, MetricKey::PassAccuracy, 92.0),
        sample(20, MetricKey::ProgressiveActions, 4.0),
        sample(20, MetricKey::Interceptions, 2.0),
        sample(20, MetricKey::SuccessfulDribbles, 7.0),
        sample(20, MetricKey::Sprints, 8.0),
        sample(20, MetricKey::RestingHr, 54.0),
        sample(20, MetricKey::DistanceKm, 9.0),
        sample(20, MetricKey::Rpe, 7.0),
        sample(20, MetricKey::PsychAdaptability, 3.0),
    ]);

    let engine = AnalysisEngine::new(store);
    let analytics = engine.performance("a1", date(20)).unwrap();
    assert_eq!(analytics.cluster_label, ClusterLabel::Tech);
}

#[test]
fn test_match_density_flows_into_risk() {
    let mut store = InMemoryMetricStore::new();
    // Light, even training so ACWR stays in the safe band
    for day in 1..=28 {
        store.sessions.push(session(day, SessionType::Training, 30, 4));
    }
    for day in [16u32, 19, 22, 25, 28] {
        store.sessions.push(session(day, SessionType::Match, 95, 8));
    }

    let engine = AnalysisEngine::new(store);
    let assessment = engine.risk("a1", date(28)).unwrap();

    assert!(assessment
        .contributing_factors
        .iter()
        .any(|f| f.name == "match_density"));
}

#[test]
fn test_volatile_stress_flows_into_risk() {
    let mut store = InMemoryMetricStore::new();
    // Stress swinging between calm and maxed out across the final week
    for (i, day) in (22..=28).enumerate() {
        let mut wellness = WellnessEntry::new("a1", date(day));
        wellness.stress_rating = Some(if i % 2 == 0 { 1 } else { 5 });
        store.wellness.push(wellness);
    }

    let engine = AnalysisEngine::new(store);
    let assessment = engine.risk("a1", date(28)).unwrap();

    assert!(assessment
        .contributing_factors
        .iter()
        .any(|f| f.name == "stress_volatility"));
}

#[test]
fn test_engine_calls_are_idempotent() {
    let mut store = spiked_load_store();
    let mut wellness = WellnessEntry::new("a1", date(28));
    wellness.sleep_quality = Some(2);
    wellness.stress_rating = Some(4);
    store.wellness.push(wellness);

    let engine = AnalysisEngine::new(store);

    assert_eq!(
        engine.readiness("a1", date(28)).unwrap(),
        engine.readiness("a1", date(28)).unwrap()
    );
    assert_eq!(
        engine.load_metrics("a1", date(28)).unwrap(),
        engine.load_metrics("a1", date(28)).unwrap()
    );
    assert_eq!(
        engine.risk("a1", date(28)).unwrap(),
        engine.risk("a1", date(28)).unwrap()
    );
}

#[test]
fn test_snapshot_json_round_trip() {
    let mut store = spiked_load_store();
    let mut wellness = WellnessEntry::new("a1", date(28));
    wellness.sleep_hours = Some(7.5);
    store.wellness.push(wellness);

    let json = serde_json::to_string(&store).unwrap();
    let restored: InMemoryMetricStore = serde_json::from_str(&json).unwrap();
    restored.validate().unwrap();

    let before = AnalysisEngine::new(store).readiness("a1", date(28)).unwrap();
    let after = AnalysisEngine::new(restored)
        .readiness("a1", date(28))
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_conflicting_duplicate_samples_are_rejected() {
    let mut store = InMemoryMetricStore::new();
    store.sessions.push(session(20, SessionType::Match, 95, 7));
    store.samples.extend(performance_samples(20, 85.0, 12.0));
    // Second pass-accuracy reading at the identical timestamp with a
    // conflicting value
    store.samples.push(sample(20, MetricKey::PassAccuracy, 99.0));

    assert!(store.validate().is_err());

    // The engine refuses to pick a winner even when validation is skipped
    let engine = AnalysisEngine::new(store);
    assert!(engine.performance("a1", date(20)).is_err());
}

#[test]
fn test_snapshot_with_invalid_session_is_rejected() {
    let json = r#"{
        "sessions": [
            {
                "athlete_id": "a1",
                "date": "2025-03-10",
                "session_type": "TRAINING",
                "duration_minutes": 60,
                "rpe": 14
            }
        ]
    }"#;
    let store: InMemoryMetricStore = serde_json::from_str(json).unwrap();
    assert!(store.validate().is_err());
}

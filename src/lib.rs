// Library interface for the ReadyRS analysis engine
// This allows integration tests and the CLI to access the core functionality

pub mod config;
pub mod engine;
pub mod error;
pub mod load;
pub mod logging;
pub mod models;
pub mod performance;
pub mod readiness;
pub mod risk;
pub mod timeseries;
pub mod window;

// Re-export commonly used types for convenience
pub use config::EngineConfig;
pub use engine::AnalysisEngine;
pub use error::{CalculationError, ReadyRsError, Result};
pub use load::{LoadConfig, LoadRatioCalculator};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use performance::{PerformanceIndexCalculator, SessionMetrics};
pub use readiness::{ReadinessScorer, ReadinessWeights};
pub use risk::{RiskAssessor, RiskInputs};
pub use timeseries::{InMemoryMetricStore, MetricStore, MetricTimeSeries};
pub use window::{WindowAggregator, WindowStats};

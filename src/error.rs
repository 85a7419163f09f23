//! Unified error hierarchy for ReadyRS
//!
//! Distinguishes fail-fast input validation from the `None` sentinels used
//! for insufficient history: malformed inputs surface here immediately, while
//! missing derived values (ACWR, z-score, rolling average) are `Option`s on
//! the result types and never raised as errors.

use thiserror::Error;

/// Top-level error type for all ReadyRS operations
#[derive(Debug, Error)]
pub enum ReadyRsError {
    /// Data validation errors (malformed ranges, duplicate samples)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Calculation errors
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Metric store access errors
    #[error("Store error: {0}")]
    Store(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Calculation errors
#[derive(Debug, Error)]
pub enum CalculationError {
    /// Insufficient data for calculation
    #[error("Insufficient data for {calculation}: {reason}")]
    InsufficientData { calculation: String, reason: String },

    /// Invalid parameter
    #[error("Invalid parameter for {calculation}: {parameter}={value}")]
    InvalidParameter {
        calculation: String,
        parameter: String,
        value: String,
    },

    /// Division by zero
    #[error("Division by zero in {calculation}")]
    DivisionByZero { calculation: String },
}

/// Result type alias for ReadyRS operations
pub type Result<T> = std::result::Result<T, ReadyRsError>;

impl ReadyRsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ReadyRsError::Validation(_) => ErrorSeverity::Warning,
            ReadyRsError::Calculation(_) => ErrorSeverity::Warning,
            ReadyRsError::Store(_) => ErrorSeverity::Error,
            ReadyRsError::Io(_) => ErrorSeverity::Error,
            ReadyRsError::Configuration(_) => ErrorSeverity::Error,
            ReadyRsError::Internal(_) => ErrorSeverity::Critical,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ReadyRsError::Calculation(CalculationError::InsufficientData {
                calculation, ..
            }) => {
                format!(
                    "Not enough data to calculate {}. Record more sessions or wellness entries first.",
                    calculation
                )
            }
            ReadyRsError::Configuration(reason) => {
                format!("Configuration problem: {}. Check your config file.", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

//! Error types for the pricing engine
//!
//! Engine operations never hand these to callers directly: every public
//! operation collapses a failure into `None`. The detail survives in logs and
//! in the configuration / CLI paths, which do return `Result`.

use thiserror::Error;

use crate::decimal::Decimal;

/// Result type alias for pricing operations
pub type Result<T> = std::result::Result<T, PricingError>;

/// Error types for the pricing engine
#[derive(Error, Debug)]
pub enum PricingError {
    #[error("{field} is not a valid decimal number")]
    NotNumeric { field: &'static str },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: Decimal },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("Insufficient liquidity: {message}")]
    InsufficientLiquidity { message: String },

    #[error("Allowed slippage {0} is outside [0, 1]")]
    SlippageOutOfRange(Decimal),

    #[error("Invalid fee schedule: {0}")]
    InvalidFeeSchedule(String),

    #[error("Division by zero in {0}")]
    DivisionByZero(&'static str),

    #[error("Cannot parse decimal from {0:?}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PricingError {
    /// Create an insufficient liquidity error
    pub fn insufficient_liquidity<S: Into<String>>(message: S) -> Self {
        Self::InsufficientLiquidity {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error came from the arguments of an engine call rather
    /// than from configuration or I/O
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            PricingError::NotNumeric { .. }
                | PricingError::NonPositive { .. }
                | PricingError::Negative { .. }
                | PricingError::InsufficientLiquidity { .. }
                | PricingError::SlippageOutOfRange(_)
                | PricingError::DivisionByZero(_)
                | PricingError::Parse(_)
        )
    }
}

use crate::timeseries::FloatValue;
use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum EBMError {
    #[error("Invalid {quantity}: {value} ({reason})")]
    Domain {
        quantity: &'static str,
        value: FloatValue,
        reason: &'static str,
    },
    #[error("Integration failed: {0}")]
    Integration(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EBMError {
    pub fn domain(quantity: &'static str, value: FloatValue, reason: &'static str) -> Self {
        EBMError::Domain {
            quantity,
            value,
            reason,
        }
    }

    /// Whether this error was raised for an out-of-range physical input.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, EBMError::Domain { .. })
    }
}

/// Convenience type for `Result<T, EBMError>`.
pub type EBMResult<T> = Result<T, EBMError>;

/// Fails unless `value` is finite and strictly positive.
pub fn ensure_positive(quantity: &'static str, value: FloatValue) -> EBMResult<FloatValue> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EBMError::domain(quantity, value, "must be positive"))
    }
}

/// Fails unless `value` is finite and not negative.
pub fn ensure_non_negative(quantity: &'static str, value: FloatValue) -> EBMResult<FloatValue> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EBMError::domain(quantity, value, "must not be negative"))
    }
}

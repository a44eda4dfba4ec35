//! Error taxonomy for the loan engine

use thiserror::Error;

/// Errors produced by schedule generation and the analyses built on it.
///
/// Every variant is data: callers surface it in the response payload rather
/// than aborting the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoanError {
    /// Non-positive principal or term, or a structure field out of range
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The APR root search hit its iteration cap or had no root in range
    #[error("APR did not converge after {iterations} iterations (residual: {residual:e})")]
    Convergence { iterations: u32, residual: f64 },
}

impl LoanError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;

/// Reject NaN/infinite values and anything at or below zero.
pub(crate) fn require_positive(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(LoanError::invalid(field, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(LoanError::invalid(field, format!("must be greater than 0 (got {})", value)));
    }
    Ok(value)
}

/// Reject NaN/infinite values and negatives.
pub(crate) fn require_non_negative(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(LoanError::invalid(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(LoanError::invalid(field, format!("must not be negative (got {})", value)));
    }
    Ok(value)
}

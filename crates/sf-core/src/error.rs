//! Error types for ScratchForge value types

use thiserror::Error;

/// Money construction / parsing error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoneyError {
    #[error("Amount is not a finite number: {0}")]
    NotFinite(f64),

    #[error("Amount must not be negative: {0}")]
    Negative(f64),

    #[error("Amount out of range: {0}")]
    OutOfRange(f64),

    #[error("Cannot parse amount: {0:?}")]
    Parse(String),
}

/// Result type alias
pub type MoneyResult<T> = Result<T, MoneyError>;

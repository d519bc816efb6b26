//! Error types for the session ledger

use sf_core::Money;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Persistence failure
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Payment boundary failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Deposit amount must be greater than zero")]
    InvalidAmount,

    #[error("Unknown deposit: {0}")]
    UnknownDeposit(String),

    #[error("Webhook token rejected")]
    Unauthorized,

    #[error("Gateway error: {0}")]
    Gateway(String),
}

/// Ledger operation failure
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: Money, required: Money },

    #[error("A play is already in flight")]
    PlayInFlight,

    #[error("No play in flight")]
    NoPlayInFlight,

    #[error("Card {got} is not the play in flight ({expected})")]
    CardMismatch { expected: String, got: String },

    #[error("Invalid identity: {0}")]
    InvalidIdentity(ValidationErrors),

    #[error("Account is not verified")]
    NotVerified,

    #[error("Grand prize has not been won")]
    GrandPrizeNotWon,

    #[error("Grand prize already claimed")]
    GrandPrizeAlreadyClaimed,

    #[error("Invalid amount: {0}")]
    InvalidAmount(Money),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
}

/// Result type alias
pub type LedgerResult<T> = Result<T, LedgerError>;

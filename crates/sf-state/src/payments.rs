//! Payment boundary
//!
//! Deposits are created and queried through a `PaymentGateway`. Amounts
//! cross the boundary in minor units. The provider's HTTP layer lives
//! outside this crate; `SandboxGateway` stands in for it locally.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sf_core::Money;

use crate::error::PaymentError;

/// Provider transaction id
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepositId(String);

impl DepositId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepositId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider status string
///
/// Only `paid` moves money; anything the provider invents later is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DepositStatus {
    Created,
    Pending,
    Paid,
    Other(String),
}

impl DepositStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, DepositStatus::Paid)
    }

    pub fn as_str(&self) -> &str {
        match self {
            DepositStatus::Created => "created",
            DepositStatus::Pending => "pending",
            DepositStatus::Paid => "paid",
            DepositStatus::Other(s) => s,
        }
    }
}

impl From<String> for DepositStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "created" => DepositStatus::Created,
            "pending" => DepositStatus::Pending,
            "paid" => DepositStatus::Paid,
            _ => DepositStatus::Other(s),
        }
    }
}

impl From<DepositStatus> for String {
    fn from(status: DepositStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deposit waiting to be paid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositIntent {
    pub id: DepositId,
    #[serde(rename = "value")]
    pub amount: Money,
    /// Copy-and-paste payment code shown to the user
    pub qr_code: String,
    pub created_at: DateTime<Utc>,
}

/// Result of polling a deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositQuery {
    pub id: DepositId,
    pub status: DepositStatus,
    #[serde(rename = "value")]
    pub amount: Money,
}

/// Provider callback body (`{"id", "status", "value"}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotification {
    #[serde(rename = "id")]
    pub deposit_id: DepositId,
    pub status: DepositStatus,
    #[serde(rename = "value")]
    pub amount: Money,
}

impl PaymentNotification {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<DepositQuery> for PaymentNotification {
    fn from(query: DepositQuery) -> Self {
        Self {
            deposit_id: query.id,
            status: query.status,
            amount: query.amount,
        }
    }
}

/// Payment provider
pub trait PaymentGateway {
    /// Rejects a zero amount with `InvalidAmount`
    fn create_deposit(&self, amount: Money) -> Result<DepositIntent, PaymentError>;

    fn query_deposit(&self, id: &DepositId) -> Result<DepositQuery, PaymentError>;
}

// ═══════════════════════════════════════════════════════════════════════════
// SANDBOX
// ═══════════════════════════════════════════════════════════════════════════

/// In-memory gateway; deposits stay `created` until `mark_paid`
#[derive(Debug, Default)]
pub struct SandboxGateway {
    deposits: Mutex<HashMap<DepositId, DepositQuery>>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user paying
    pub fn mark_paid(&self, id: &DepositId) -> Result<(), PaymentError> {
        self.set_status(id, DepositStatus::Paid)
    }

    pub fn set_status(&self, id: &DepositId, status: DepositStatus) -> Result<(), PaymentError> {
        let mut deposits = self.deposits.lock();
        let deposit = deposits
            .get_mut(id)
            .ok_or_else(|| PaymentError::UnknownDeposit(id.to_string()))?;
        log::debug!("Sandbox deposit {} {} -> {}", id, deposit.status, status);
        deposit.status = status;
        Ok(())
    }

    pub fn deposit_count(&self) -> usize {
        self.deposits.lock().len()
    }
}

impl PaymentGateway for SandboxGateway {
    fn create_deposit(&self, amount: Money) -> Result<DepositIntent, PaymentError> {
        if amount.is_zero() {
            return Err(PaymentError::InvalidAmount);
        }

        let id = DepositId::new(uuid::Uuid::new_v4().to_string());
        let intent = DepositIntent {
            qr_code: format!("sandbox:{}:{}", id, amount.cents()),
            id: id.clone(),
            amount,
            created_at: Utc::now(),
        };

        self.deposits.lock().insert(
            id.clone(),
            DepositQuery {
                id,
                status: DepositStatus::Created,
                amount,
            },
        );

        log::info!("Deposit created: {} ({})", intent.id, amount);
        Ok(intent)
    }

    fn query_deposit(&self, id: &DepositId) -> Result<DepositQuery, PaymentError> {
        self.deposits
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| PaymentError::UnknownDeposit(id.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// WEBHOOK
// ═══════════════════════════════════════════════════════════════════════════

/// Shared-secret check for provider callbacks
#[derive(Debug, Clone)]
pub struct WebhookGuard {
    token: String,
}

impl WebhookGuard {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn verify(&self, presented: Option<&str>) -> Result<(), PaymentError> {
        match presented {
            Some(token) if !self.token.is_empty() && token == self.token => Ok(()),
            _ => {
                log::warn!("Webhook rejected: token missing or invalid");
                Err(PaymentError::Unauthorized)
            }
        }
    }

    /// Verify the token, then parse the body
    pub fn accept(
        &self,
        presented: Option<&str>,
        body: &str,
    ) -> Result<PaymentNotification, PaymentError> {
        self.verify(presented)?;
        PaymentNotification::from_json(body).map_err(|e| PaymentError::Gateway(e.to_string()))
    }
}

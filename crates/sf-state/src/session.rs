//! Durable session state

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sf_core::Money;

use crate::identity::IdentityRecord;
use crate::payments::DepositId;

/// Identity + deposit verification gate
///
/// `is_verified` is derived; it is recomputed on every change and when a
/// session is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Verification {
    pub identity_verified: bool,
    pub deposit_verified: bool,
    pub is_verified: bool,
    pub identity: Option<IdentityRecord>,
}

impl Verification {
    fn recompute(&mut self) {
        self.is_verified = self.identity_verified && self.deposit_verified;
    }

    pub fn mark_identity(&mut self, record: IdentityRecord) {
        self.identity_verified = true;
        self.identity = Some(record);
        self.recompute();
    }

    pub fn mark_deposit(&mut self) {
        self.deposit_verified = true;
        self.recompute();
    }

    /// 0, 50 or 100
    pub fn progress_percent(&self) -> u8 {
        match (self.identity_verified, self.deposit_verified) {
            (true, true) => 100,
            (true, false) => 50,
            _ => 0,
        }
    }
}

/// Per-user session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Minor units
    pub balance: Money,
    /// Plays started so far; the next play is round `plays_completed + 1`
    pub plays_completed: u64,
    pub grand_prize_won: bool,
    pub grand_prize_claimed: bool,
    pub verification: Verification,
    /// Deposits already credited from payment notifications
    pub credited_deposits: BTreeSet<DepositId>,
}

impl SessionState {
    /// Fresh zero-balance session
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_round(&self) -> u64 {
        self.plays_completed + 1
    }

    /// Restore derived fields after loading
    pub fn normalized(mut self) -> Self {
        let expected = self.verification.identity_verified && self.verification.deposit_verified;
        if self.verification.is_verified != expected {
            log::warn!(
                "Stored verification flag inconsistent (is_verified={}), recomputing",
                self.verification.is_verified
            );
            self.verification.recompute();
        }
        if self.grand_prize_claimed && !self.grand_prize_won {
            log::warn!("Stored grand prize claimed without win, keeping claim");
            self.grand_prize_won = true;
        }
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> IdentityRecord {
        IdentityRecord {
            cpf: "123.456.789-01".into(),
            full_name: "Maria Silva".into(),
            birth_date: "01/01/1990".into(),
        }
    }

    #[test]
    fn test_fresh_session() {
        let state = SessionState::new();
        assert_eq!(state.balance, Money::ZERO);
        assert_eq!(state.next_round(), 1);
        assert!(!state.verification.is_verified);
    }

    #[test]
    fn test_gate_needs_both_steps() {
        let mut v = Verification::default();
        v.mark_deposit();
        assert!(!v.is_verified);
        assert_eq!(v.progress_percent(), 0);

        let mut v = Verification::default();
        v.mark_identity(record());
        assert!(!v.is_verified);
        assert_eq!(v.progress_percent(), 50);
        v.mark_deposit();
        assert!(v.is_verified);
        assert_eq!(v.progress_percent(), 100);
    }

    #[test]
    fn test_json_roundtrip_is_byte_identical() {
        let mut state = SessionState::new();
        state.balance = Money::new(9, 80);
        state.plays_completed = 2;
        state.verification.mark_identity(record());
        state.credited_deposits.insert(DepositId::new("dep-1"));

        let json = state.to_json().unwrap();
        let loaded = SessionState::from_json(&json).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.to_json().unwrap(), json);
    }

    #[test]
    fn test_load_recomputes_gate() {
        let json = r#"{
            "balance": 100,
            "verification": {
                "identity_verified": false,
                "deposit_verified": true,
                "is_verified": true
            }
        }"#;
        let state = SessionState::from_json(json).unwrap();
        assert!(!state.verification.is_verified);
        assert_eq!(state.plays_completed, 0);
    }
}

//! Session ledger
//!
//! Owns the session state and applies every balance and flag change. Each
//! mutation builds the next state, saves it through the store and only then
//! replaces the in-memory copy, so a failed save leaves the ledger as it
//! was.

use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use sf_card_lab::{CARD_COST, Card, CardConfig, GRAND_PRIZE_VALUE, PrizeKind, Scheduler};
use sf_core::Money;

use crate::error::{LedgerError, LedgerResult};
use crate::identity::{IdentityInput, validate_identity};
use crate::payments::{DepositId, DepositStatus, PaymentGateway, PaymentNotification};
use crate::session::{SessionState, Verification};
use crate::store::SessionStore;

/// Suggested deposit when the user can already play
pub const DEFAULT_SUGGESTED_DEPOSIT: Money = Money::new(20, 0);

/// Floor for the suggestion when the user is short
pub const MINIMUM_SUGGESTED_DEPOSIT: Money = Money::new(1, 0);

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Price debited per play
    pub card_cost: Money,
    /// Amount credited by a grand prize claim
    pub grand_prize_value: Money,
    pub suggested_deposit: Money,
    pub minimum_suggestion: Money,
}

impl LedgerConfig {
    /// Take cost and grand prize value from the card configuration
    pub fn from_card_config(card: &CardConfig) -> Self {
        Self {
            card_cost: card.card_cost,
            grand_prize_value: card.grand_prize_value,
            ..Self::default()
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            card_cost: CARD_COST,
            grand_prize_value: GRAND_PRIZE_VALUE,
            suggested_deposit: DEFAULT_SUGGESTED_DEPOSIT,
            minimum_suggestion: MINIMUM_SUGGESTED_DEPOSIT,
        }
    }
}

/// What completing a card paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settlement {
    NoPrize,
    /// Credited to the balance
    Cash(Money),
    /// Flagged only; credited later by `claim_grand_prize`
    GrandPrize(Money),
}

/// Accepted withdrawal; the payout itself happens elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub amount: Money,
    pub balance_after: Money,
    pub requested_at: DateTime<Utc>,
}

/// Result of a payment notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Credited(Money),
    /// Deposit was credited before
    Duplicate,
    /// Status other than `paid`
    Ignored(DepositStatus),
}

/// The card currently out with the player
///
/// Settlement is taken from here, not from the card the caller hands back.
#[derive(Debug, Clone)]
struct InFlightPlay {
    card_id: String,
    round: u64,
    prize_kind: PrizeKind,
    prize_amount: Money,
}

/// Balance ledger for one session
pub struct SessionLedger<St, Sc> {
    store: St,
    scheduler: Sc,
    config: LedgerConfig,
    state: SessionState,
    in_flight: Option<InFlightPlay>,
    is_new_user: bool,
}

impl<St: SessionStore, Sc: Scheduler> SessionLedger<St, Sc> {
    /// Load the session, falling back to a fresh one if the store fails
    pub fn open(store: St, scheduler: Sc, config: LedgerConfig) -> Self {
        let (state, is_new_user) = match store.load() {
            Ok(Some(state)) => {
                log::info!(
                    "Session loaded: balance {}, {} plays",
                    state.balance,
                    state.plays_completed
                );
                (state, false)
            }
            Ok(None) => {
                log::info!("No saved session, starting fresh");
                (SessionState::new(), true)
            }
            Err(e) => {
                log::warn!("Failed to load session, starting fresh: {}", e);
                (SessionState::new(), true)
            }
        };

        Self {
            store,
            scheduler,
            config,
            state,
            in_flight: None,
            is_new_user,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn balance(&self) -> Money {
        self.state.balance
    }

    pub fn verification(&self) -> &Verification {
        &self.state.verification
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    /// True when nothing was loaded at open
    pub fn is_new_user(&self) -> bool {
        self.is_new_user
    }

    pub fn can_play(&self) -> bool {
        self.state.balance >= self.config.card_cost
    }

    /// How much short of one card the balance is
    pub fn missing_amount(&self) -> Money {
        self.config.card_cost.saturating_sub(self.state.balance)
    }

    pub fn suggested_deposit(&self) -> Money {
        if self.can_play() {
            self.config.suggested_deposit
        } else {
            self.missing_amount().max(self.config.minimum_suggestion)
        }
    }

    pub fn play_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // PLAYS
    // ═══════════════════════════════════════════════════════════════════════

    /// Debit one card and issue it for the next round
    pub fn start_play(&mut self) -> LedgerResult<Card> {
        if self.in_flight.is_some() {
            return Err(LedgerError::PlayInFlight);
        }

        let cost = self.config.card_cost;
        let Some(balance) = self.state.balance.checked_sub(cost) else {
            return Err(LedgerError::InsufficientFunds {
                balance: self.state.balance,
                required: cost,
            });
        };

        let mut next = self.state.clone();
        next.plays_completed += 1;
        next.balance = balance;
        let round = next.plays_completed;
        self.commit(next)?;

        let card = self.scheduler.issue_card(round, cost);
        self.in_flight = Some(InFlightPlay {
            card_id: card.id.clone(),
            round,
            prize_kind: card.prize_kind,
            prize_amount: card.prize_amount,
        });

        log::info!(
            "Play started: round {}, card {}, balance {}",
            round,
            card.id,
            self.state.balance
        );
        Ok(card)
    }

    /// Settle the in-flight card
    ///
    /// Unrevealed cells make no difference; a forfeited card pays the same.
    pub fn complete_card(&mut self, card: &Card) -> LedgerResult<Settlement> {
        let play = self.in_flight.as_ref().ok_or(LedgerError::NoPlayInFlight)?;
        if play.card_id != card.id {
            return Err(LedgerError::CardMismatch {
                expected: play.card_id.clone(),
                got: card.id.clone(),
            });
        }

        let (round, prize_kind, amount) = (play.round, play.prize_kind, play.prize_amount);
        let settlement = match prize_kind {
            PrizeKind::None => Settlement::NoPrize,
            PrizeKind::Cash => {
                let mut next = self.state.clone();
                add_balance(&mut next, amount)?;
                self.commit(next)?;
                Settlement::Cash(amount)
            }
            PrizeKind::GrandPrize => {
                let mut next = self.state.clone();
                next.grand_prize_won = true;
                self.commit(next)?;
                Settlement::GrandPrize(amount)
            }
        };

        self.in_flight = None;
        log::info!("Card settled: round {}, {:?}", round, settlement);
        Ok(settlement)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CREDITS & VERIFICATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Add to the balance; a positive credit also completes the deposit step
    pub fn credit_amount(&mut self, value: Money) -> LedgerResult<Money> {
        let mut next = self.state.clone();
        apply_credit(&mut next, value)?;
        self.commit(next)?;

        log::info!("Credited {}, balance {}", value, self.state.balance);
        Ok(self.state.balance)
    }

    /// Validate identity against the current calendar year
    pub fn set_verification(&mut self, input: &IdentityInput) -> LedgerResult<Verification> {
        self.set_verification_at(input, Local::now().year())
    }

    pub fn set_verification_at(
        &mut self,
        input: &IdentityInput,
        current_year: i32,
    ) -> LedgerResult<Verification> {
        let record =
            validate_identity(input, current_year).map_err(LedgerError::InvalidIdentity)?;

        let mut next = self.state.clone();
        next.verification.mark_identity(record);
        self.commit(next)?;

        log::info!(
            "Identity verified (progress {}%)",
            self.state.verification.progress_percent()
        );
        Ok(self.state.verification.clone())
    }

    /// Credit the grand prize value once
    pub fn claim_grand_prize(&mut self) -> LedgerResult<Money> {
        if !self.state.grand_prize_won {
            return Err(LedgerError::GrandPrizeNotWon);
        }
        if self.state.grand_prize_claimed {
            return Err(LedgerError::GrandPrizeAlreadyClaimed);
        }

        let value = self.config.grand_prize_value;
        let mut next = self.state.clone();
        apply_credit(&mut next, value)?;
        next.grand_prize_claimed = true;
        self.commit(next)?;

        log::info!("Grand prize claimed: {}", value);
        Ok(value)
    }

    pub fn withdraw(&mut self, amount: Money) -> LedgerResult<Withdrawal> {
        if !self.state.verification.is_verified {
            return Err(LedgerError::NotVerified);
        }
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let Some(balance_after) = self.state.balance.checked_sub(amount) else {
            return Err(LedgerError::InsufficientFunds {
                balance: self.state.balance,
                required: amount,
            });
        };

        let mut next = self.state.clone();
        next.balance = balance_after;
        self.commit(next)?;

        log::info!("Withdrawal of {}, balance {}", amount, balance_after);
        Ok(Withdrawal {
            amount,
            balance_after,
            requested_at: Utc::now(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // PAYMENTS
    // ═══════════════════════════════════════════════════════════════════════

    /// Credit a paid deposit at most once per deposit id
    pub fn apply_payment_notification(
        &mut self,
        notification: &PaymentNotification,
    ) -> LedgerResult<PaymentOutcome> {
        if !notification.status.is_paid() {
            log::debug!(
                "Deposit {} is {}, nothing to credit",
                notification.deposit_id,
                notification.status
            );
            return Ok(PaymentOutcome::Ignored(notification.status.clone()));
        }
        if self.state.credited_deposits.contains(&notification.deposit_id) {
            log::info!("Deposit {} already credited", notification.deposit_id);
            return Ok(PaymentOutcome::Duplicate);
        }

        let mut next = self.state.clone();
        apply_credit(&mut next, notification.amount)?;
        next.credited_deposits
            .insert(notification.deposit_id.clone());
        self.commit(next)?;

        log::info!(
            "Deposit {} credited: {}, balance {}",
            notification.deposit_id,
            notification.amount,
            self.state.balance
        );
        Ok(PaymentOutcome::Credited(notification.amount))
    }

    /// Poll the gateway and credit the deposit if it has been paid
    pub fn confirm_deposit<G: PaymentGateway + ?Sized>(
        &mut self,
        gateway: &G,
        deposit_id: &DepositId,
    ) -> LedgerResult<PaymentOutcome> {
        let query = gateway.query_deposit(deposit_id)?;
        self.apply_payment_notification(&PaymentNotification::from(query))
    }

    fn commit(&mut self, next: SessionState) -> LedgerResult<()> {
        self.store.save(&next)?;
        self.state = next;
        Ok(())
    }
}

/// Balance only; prizes go through here
fn add_balance(state: &mut SessionState, value: Money) -> LedgerResult<()> {
    state.balance = state
        .balance
        .checked_add(value)
        .ok_or(LedgerError::InvalidAmount(value))?;
    Ok(())
}

/// Balance plus the deposit step of the gate
fn apply_credit(state: &mut SessionState, value: Money) -> LedgerResult<()> {
    add_balance(state, value)?;
    if !value.is_zero() && !state.verification.deposit_verified {
        state.verification.mark_deposit();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PaymentError, StoreError};
    use crate::payments::SandboxGateway;
    use crate::store::MemoryStore;
    use crate::validation::{Field, Rejection};
    use sf_card_lab::CardEngine;
    use std::sync::atomic::{AtomicBool, Ordering};

    type TestLedger = SessionLedger<MemoryStore, CardEngine>;

    fn engine() -> CardEngine {
        let mut engine = CardEngine::new();
        engine.seed(7);
        engine
    }

    fn ledger() -> (TestLedger, MemoryStore) {
        let store = MemoryStore::new();
        let ledger = SessionLedger::open(store.clone(), engine(), LedgerConfig::default());
        (ledger, store)
    }

    fn identity() -> IdentityInput {
        IdentityInput {
            cpf: "123.456.789-01".into(),
            full_name: "Maria Silva".into(),
            birth_date: "15/06/1985".into(),
        }
    }

    fn play(ledger: &mut TestLedger) -> Settlement {
        let card = ledger.start_play().unwrap();
        ledger.complete_card(&card).unwrap()
    }

    /// Store whose saves can be switched off
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl SessionStore for FlakyStore {
        fn load(&self) -> Result<Option<SessionState>, StoreError> {
            self.inner.load()
        }

        fn save(&self, state: &SessionState) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.save(state)
        }
    }

    #[test]
    fn test_fresh_session() {
        let (ledger, store) = ledger();
        assert!(ledger.is_new_user());
        assert_eq!(ledger.balance(), Money::ZERO);
        assert!(!ledger.can_play());
        assert!(!ledger.play_in_flight());
        assert!(store.raw().is_none());
    }

    #[test]
    fn test_start_play_debits_exactly() {
        let (mut ledger, store) = ledger();
        ledger.credit_amount(Money::new(14, 70)).unwrap();

        let card = ledger.start_play().unwrap();
        assert_eq!(card.round, 1);
        assert_eq!(card.cost, Money::new(4, 90));
        assert_eq!(ledger.balance(), Money::new(9, 80));
        assert_eq!(ledger.balance().to_string(), "9.80");
        assert_eq!(ledger.state().plays_completed, 1);

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.balance, Money::new(9, 80));
        assert_eq!(saved.plays_completed, 1);
    }

    #[test]
    fn test_insufficient_funds() {
        let (mut ledger, _) = ledger();
        ledger.credit_amount(Money::new(4, 89)).unwrap();

        match ledger.start_play() {
            Err(LedgerError::InsufficientFunds { balance, required }) => {
                assert_eq!(balance, Money::new(4, 89));
                assert_eq!(required, Money::new(4, 90));
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
        assert_eq!(ledger.state().plays_completed, 0);
        assert!(!ledger.play_in_flight());
    }

    #[test]
    fn test_one_play_in_flight() {
        let (mut ledger, _) = ledger();
        ledger.credit_amount(Money::new(20, 0)).unwrap();

        let card = ledger.start_play().unwrap();
        assert!(ledger.play_in_flight());
        assert!(matches!(ledger.start_play(), Err(LedgerError::PlayInFlight)));
        assert_eq!(ledger.balance(), Money::new(15, 10));

        ledger.complete_card(&card).unwrap();
        assert!(!ledger.play_in_flight());
        assert!(ledger.start_play().is_ok());
    }

    #[test]
    fn test_complete_card_checks() {
        let (mut ledger, _) = ledger();
        ledger.credit_amount(Money::new(20, 0)).unwrap();

        let card = ledger.start_play().unwrap();
        ledger.complete_card(&card).unwrap();
        assert!(matches!(
            ledger.complete_card(&card),
            Err(LedgerError::NoPlayInFlight)
        ));

        let current = ledger.start_play().unwrap();
        let mut forged = current.clone();
        forged.id = "card_forged".into();
        assert!(matches!(
            ledger.complete_card(&forged),
            Err(LedgerError::CardMismatch { .. })
        ));
        assert!(ledger.play_in_flight());
    }

    #[test]
    fn test_settlement_ignores_caller_card_fields() {
        let (mut ledger, _) = ledger();
        ledger.credit_amount(Money::new(20, 0)).unwrap();

        let mut card = ledger.start_play().unwrap();
        assert!(!card.won);
        card.won = true;
        card.prize_kind = PrizeKind::Cash;
        card.prize_amount = Money::new(1000, 0);

        assert_eq!(ledger.complete_card(&card).unwrap(), Settlement::NoPrize);
        assert_eq!(ledger.balance(), Money::new(15, 10));
    }

    #[test]
    fn test_scheduled_cash_and_grand_prize() {
        let (mut ledger, _) = ledger();
        ledger.credit_amount(Money::new(20, 0)).unwrap();

        assert_eq!(play(&mut ledger), Settlement::NoPrize);
        assert_eq!(play(&mut ledger), Settlement::NoPrize);

        // Forfeit: nothing revealed, same payout
        let card = ledger.start_play().unwrap();
        assert_eq!(card.revealed_count(), 0);
        assert_eq!(
            ledger.complete_card(&card).unwrap(),
            Settlement::Cash(Money::new(30, 0))
        );
        assert_eq!(ledger.balance(), Money::new(35, 30));

        for _ in 4..8 {
            assert_eq!(play(&mut ledger), Settlement::NoPrize);
        }
        assert_eq!(
            play(&mut ledger),
            Settlement::GrandPrize(Money::new(2499, 0))
        );
        assert!(ledger.state().grand_prize_won);
        assert_eq!(ledger.balance(), Money::new(10, 80));

        assert_eq!(play(&mut ledger), Settlement::NoPrize);
        assert!(ledger.state().grand_prize_won);
    }

    #[test]
    fn test_cash_prize_leaves_gate() {
        let mut saved = SessionState::new();
        saved.balance = Money::new(14, 70);
        let store = MemoryStore::with_state(&saved).unwrap();
        let mut ledger = SessionLedger::open(store.clone(), engine(), LedgerConfig::default());
        assert!(!ledger.verification().deposit_verified);

        let settlements: Vec<_> = (0..3).map(|_| play(&mut ledger)).collect();
        assert_eq!(settlements[2], Settlement::Cash(Money::new(30, 0)));
        assert_eq!(ledger.balance(), Money::new(30, 0));
        assert!(!ledger.verification().deposit_verified);
        assert!(!ledger.verification().is_verified);
        assert_eq!(ledger.verification().progress_percent(), 0);

        let reloaded = store.load().unwrap().unwrap();
        assert!(!reloaded.verification.deposit_verified);
    }

    #[test]
    fn test_grand_prize_claim_completes_deposit_step() {
        let mut saved = SessionState::new();
        saved.balance = Money::new(39, 20);
        let store = MemoryStore::with_state(&saved).unwrap();
        let mut ledger = SessionLedger::open(store, engine(), LedgerConfig::default());

        for _ in 0..8 {
            play(&mut ledger);
        }
        assert!(ledger.state().grand_prize_won);
        assert!(!ledger.verification().deposit_verified);

        ledger.claim_grand_prize().unwrap();
        assert!(ledger.verification().deposit_verified);
    }

    #[test]
    fn test_claim_grand_prize() {
        let (mut ledger, _) = ledger();
        assert!(matches!(
            ledger.claim_grand_prize(),
            Err(LedgerError::GrandPrizeNotWon)
        ));

        ledger.credit_amount(Money::new(40, 0)).unwrap();
        for _ in 0..8 {
            play(&mut ledger);
        }
        let before = ledger.balance();
        assert_eq!(ledger.claim_grand_prize().unwrap(), Money::new(2499, 0));
        assert_eq!(ledger.balance(), before + Money::new(2499, 0));
        assert!(ledger.state().grand_prize_claimed);
        assert!(matches!(
            ledger.claim_grand_prize(),
            Err(LedgerError::GrandPrizeAlreadyClaimed)
        ));
    }

    #[test]
    fn test_credit_completes_gate() {
        let (mut ledger, _) = ledger();
        ledger.set_verification_at(&identity(), 2026).unwrap();
        assert!(ledger.verification().identity_verified);
        assert!(!ledger.verification().is_verified);

        ledger.credit_amount(Money::new(10, 0)).unwrap();
        assert!(ledger.verification().deposit_verified);
        assert!(ledger.verification().is_verified);
        assert_eq!(ledger.verification().progress_percent(), 100);
    }

    #[test]
    fn test_zero_credit_leaves_gate() {
        let (mut ledger, _) = ledger();
        ledger.credit_amount(Money::ZERO).unwrap();
        assert!(!ledger.verification().deposit_verified);
    }

    #[test]
    fn test_credit_is_additive() {
        let (mut ledger, _) = ledger();
        ledger.credit_amount(Money::new(10, 0)).unwrap();
        ledger.credit_amount(Money::new(10, 0)).unwrap();
        assert_eq!(ledger.balance(), Money::new(20, 0));
    }

    #[test]
    fn test_invalid_identity_reports_all_fields() {
        let (mut ledger, store) = ledger();
        let input = IdentityInput {
            cpf: "123.456.789-0".into(),
            full_name: "Jo".into(),
            birth_date: "1990-01-01".into(),
        };

        match ledger.set_verification_at(&input, 2026) {
            Err(LedgerError::InvalidIdentity(errors)) => {
                assert_eq!(errors.len(), 3);
                assert_eq!(errors.get(Field::Cpf), Some(Rejection::Invalid));
                assert_eq!(errors.get(Field::FullName), Some(Rejection::TooShort));
                assert_eq!(errors.get(Field::BirthDate), Some(Rejection::Format));
            }
            other => panic!("expected InvalidIdentity, got {:?}", other),
        }
        assert!(!ledger.verification().identity_verified);
        assert!(store.raw().is_none());
    }

    #[test]
    fn test_withdraw_rules() {
        let (mut ledger, _) = ledger();
        ledger.credit_amount(Money::new(50, 0)).unwrap();
        assert!(matches!(
            ledger.withdraw(Money::new(10, 0)),
            Err(LedgerError::NotVerified)
        ));

        ledger.set_verification_at(&identity(), 2026).unwrap();
        assert!(matches!(
            ledger.withdraw(Money::ZERO),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            ledger.withdraw(Money::new(50, 1)),
            Err(LedgerError::InsufficientFunds { .. })
        ));

        let withdrawal = ledger.withdraw(Money::new(20, 0)).unwrap();
        assert_eq!(withdrawal.balance_after, Money::new(30, 0));
        assert_eq!(ledger.balance(), Money::new(30, 0));
    }

    #[test]
    fn test_payment_notification_dedup() {
        let (mut ledger, store) = ledger();
        let mut notification = PaymentNotification {
            deposit_id: DepositId::new("tx-1"),
            status: DepositStatus::Pending,
            amount: Money::new(25, 0),
        };

        assert_eq!(
            ledger.apply_payment_notification(&notification).unwrap(),
            PaymentOutcome::Ignored(DepositStatus::Pending)
        );
        assert_eq!(ledger.balance(), Money::ZERO);

        notification.status = DepositStatus::Paid;
        assert_eq!(
            ledger.apply_payment_notification(&notification).unwrap(),
            PaymentOutcome::Credited(Money::new(25, 0))
        );
        assert_eq!(
            ledger.apply_payment_notification(&notification).unwrap(),
            PaymentOutcome::Duplicate
        );
        assert_eq!(ledger.balance(), Money::new(25, 0));
        assert!(ledger.verification().deposit_verified);

        let saved = store.load().unwrap().unwrap();
        assert!(saved.credited_deposits.contains(&DepositId::new("tx-1")));
    }

    #[test]
    fn test_confirm_deposit() {
        let (mut ledger, _) = ledger();
        let gateway = SandboxGateway::new();
        let intent = gateway.create_deposit(Money::new(15, 0)).unwrap();

        assert_eq!(
            ledger.confirm_deposit(&gateway, &intent.id).unwrap(),
            PaymentOutcome::Ignored(DepositStatus::Created)
        );

        gateway.mark_paid(&intent.id).unwrap();
        assert_eq!(
            ledger.confirm_deposit(&gateway, &intent.id).unwrap(),
            PaymentOutcome::Credited(Money::new(15, 0))
        );
        assert_eq!(
            ledger.confirm_deposit(&gateway, &intent.id).unwrap(),
            PaymentOutcome::Duplicate
        );

        assert!(matches!(
            ledger.confirm_deposit(&gateway, &DepositId::new("missing")),
            Err(LedgerError::Payment(PaymentError::UnknownDeposit(_)))
        ));
    }

    #[test]
    fn test_failed_save_leaves_state() {
        let store = FlakyStore::default();
        let mut ledger = SessionLedger::open(&store, engine(), LedgerConfig::default());
        ledger.credit_amount(Money::new(10, 0)).unwrap();

        store.failing.store(true, Ordering::SeqCst);
        assert!(matches!(
            ledger.start_play(),
            Err(LedgerError::Persistence(_))
        ));
        assert_eq!(ledger.balance(), Money::new(10, 0));
        assert_eq!(ledger.state().plays_completed, 0);
        assert!(!ledger.play_in_flight());

        store.failing.store(false, Ordering::SeqCst);
        let card = ledger.start_play().unwrap();
        assert_eq!(card.round, 1);
    }

    #[test]
    fn test_failed_settlement_keeps_play_open() {
        let store = FlakyStore::default();
        let mut ledger = SessionLedger::open(&store, engine(), LedgerConfig::default());
        ledger.credit_amount(Money::new(20, 0)).unwrap();
        for _ in 0..2 {
            let card = ledger.start_play().unwrap();
            ledger.complete_card(&card).unwrap();
        }

        let card = ledger.start_play().unwrap();
        store.failing.store(true, Ordering::SeqCst);
        assert!(matches!(
            ledger.complete_card(&card),
            Err(LedgerError::Persistence(_))
        ));
        assert!(ledger.play_in_flight());

        store.failing.store(false, Ordering::SeqCst);
        assert_eq!(
            ledger.complete_card(&card).unwrap(),
            Settlement::Cash(Money::new(30, 0))
        );
    }

    #[test]
    fn test_corrupt_store_fails_open() {
        let store = MemoryStore::new();
        store.set_raw("{ definitely not a session");
        let ledger = SessionLedger::open(store, engine(), LedgerConfig::default());
        assert!(ledger.is_new_user());
        assert_eq!(ledger.balance(), Money::ZERO);
    }

    #[test]
    fn test_reopen_restores_state() {
        let store = MemoryStore::new();
        {
            let mut ledger =
                SessionLedger::open(store.clone(), engine(), LedgerConfig::default());
            ledger.credit_amount(Money::new(14, 70)).unwrap();
            let card = ledger.start_play().unwrap();
            ledger.complete_card(&card).unwrap();
        }

        let ledger = SessionLedger::open(store, engine(), LedgerConfig::default());
        assert!(!ledger.is_new_user());
        assert_eq!(ledger.balance(), Money::new(9, 80));
        assert_eq!(ledger.state().next_round(), 2);
    }

    #[test]
    fn test_suggested_deposit() {
        let (mut ledger, _) = ledger();
        assert_eq!(ledger.missing_amount(), Money::new(4, 90));
        assert_eq!(ledger.suggested_deposit(), Money::new(4, 90));

        ledger.credit_amount(Money::new(4, 50)).unwrap();
        assert_eq!(ledger.missing_amount(), Money::new(0, 40));
        assert_eq!(ledger.suggested_deposit(), Money::new(1, 0));

        ledger.credit_amount(Money::new(1, 0)).unwrap();
        assert_eq!(ledger.missing_amount(), Money::ZERO);
        assert_eq!(ledger.suggested_deposit(), Money::new(20, 0));
    }

    #[test]
    fn test_config_from_card_config() {
        let mut card = CardConfig::standard();
        card.card_cost = Money::new(2, 0);
        let config = LedgerConfig::from_card_config(&card);
        assert_eq!(config.card_cost, Money::new(2, 0));
        assert_eq!(config.suggested_deposit, DEFAULT_SUGGESTED_DEPOSIT);
    }
}

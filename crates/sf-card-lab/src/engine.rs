//! Card Engine: outcome decision and grid synthesis

use chrono::Utc;
use rand::prelude::*;
use rand::rngs::StdRng;
use sf_core::Money;

use crate::card::{Card, PrizeKind};
use crate::config::CardConfig;
use crate::lines::{CELL_COUNT, WIN_BAND, would_complete_line};
use crate::schedule::{Outcome, OutcomeSchedule, PrizeSchedule};
use crate::symbols::{Symbol, SymbolSet};

/// Card issuing capability consumed by the session ledger
///
/// Outcome decision and grid synthesis stay behind this boundary; callers
/// only ever see the finished card.
pub trait Scheduler {
    fn issue_card(&mut self, round: u64, cost: Money) -> Card;
}

/// Builds scratch cards for scheduled outcomes
pub struct CardEngine<S = PrizeSchedule> {
    /// Configuration
    config: CardConfig,
    /// Round → outcome policy
    schedule: S,
    /// Symbol alphabet
    symbols: SymbolSet,
    /// Random number generator
    rng: StdRng,
    /// Cards issued by this engine
    cards_issued: u64,
    /// Losing cells accepted after the redraw budget ran out
    exhausted_draws: u64,
}

impl CardEngine<PrizeSchedule> {
    /// Create a new engine with the standard schedule and config
    pub fn new() -> Self {
        Self::with_schedule(CardConfig::standard(), PrizeSchedule::standard())
    }
}

impl Default for CardEngine<PrizeSchedule> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OutcomeSchedule> CardEngine<S> {
    /// Create with specific config and schedule
    pub fn with_schedule(config: CardConfig, schedule: S) -> Self {
        Self {
            config,
            schedule,
            symbols: SymbolSet::standard(),
            rng: StdRng::from_os_rng(),
            cards_issued: 0,
            exhausted_draws: 0,
        }
    }

    /// Replace the symbol alphabet
    pub fn with_symbols(mut self, symbols: SymbolSet) -> Self {
        self.symbols = symbols;
        self
    }

    /// Seed RNG for reproducible grids
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn schedule(&self) -> &S {
        &self.schedule
    }

    pub fn cards_issued(&self) -> u64 {
        self.cards_issued
    }

    /// Number of cells placed despite completing a line
    pub fn exhausted_draws(&self) -> u64 {
        self.exhausted_draws
    }

    /// Outcome for a round; pure in the round number
    pub fn decide_outcome(&self, round: u64) -> Outcome {
        self.schedule.decide_outcome(round)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CARD SYNTHESIS
    // ═══════════════════════════════════════════════════════════════════════

    /// Build a card consistent with `outcome`
    pub fn synthesize_card(&mut self, round: u64, cost: Money, outcome: Outcome) -> Card {
        self.cards_issued += 1;
        let id = card_id(round, self.cards_issued);

        let (grid, prize_kind, prize_amount) = match (outcome.should_win, outcome.prize_kind) {
            (true, PrizeKind::Cash) => (
                self.generate_winning_grid(Symbol::MoneyBag),
                PrizeKind::Cash,
                outcome.amount,
            ),
            (true, PrizeKind::GrandPrize) => (
                self.generate_winning_grid(Symbol::AppleWatch),
                PrizeKind::GrandPrize,
                self.config.grand_prize_value,
            ),
            _ => (self.generate_losing_grid(), PrizeKind::None, Money::ZERO),
        };

        log::debug!(
            "Issued {} for round {}: {:?} {}",
            id,
            round,
            prize_kind,
            prize_amount
        );

        Card::new(id, round, cost, grid, prize_kind, prize_amount)
    }

    /// Winning symbol across the middle row, remaining cells uniform over
    /// the full alphabet. Extra incidental lines are allowed.
    fn generate_winning_grid(&mut self, winning_symbol: Symbol) -> [Symbol; CELL_COUNT] {
        let alphabet = self.symbols.all();
        let mut grid = [winning_symbol; CELL_COUNT];
        for (i, slot) in grid.iter_mut().enumerate() {
            if WIN_BAND.contains(&i) {
                continue;
            }
            if let Some(&symbol) = alphabet.choose(&mut self.rng) {
                *slot = symbol;
            }
        }
        grid
    }

    /// Cell-by-cell biased draws, redrawing any draw that would complete a
    /// line. After `max_redraws` attempts the last draw is kept.
    fn generate_losing_grid(&mut self) -> [Symbol; CELL_COUNT] {
        let mut partial: [Option<Symbol>; CELL_COUNT] = [None; CELL_COUNT];
        let max_attempts = self.config.max_redraws.max(1);

        for pos in 0..CELL_COUNT {
            let mut symbol = self.draw_biased();
            let mut attempts = 1;
            while would_complete_line(&partial, pos, symbol) {
                if attempts >= max_attempts {
                    self.exhausted_draws += 1;
                    log::debug!(
                        "Redraw budget exhausted at cell {}; keeping {:?}",
                        pos,
                        symbol
                    );
                    break;
                }
                symbol = self.draw_biased();
                attempts += 1;
            }
            partial[pos] = Some(symbol);
        }

        partial.map(|s| s.unwrap_or(Symbol::Banknote))
    }

    /// Cash set with probability `cash_bias`, merchandise otherwise
    fn draw_biased(&mut self) -> Symbol {
        let from_cash = self.rng.random_bool(self.config.effective_cash_bias());
        let use_cash =
            self.symbols.merchandise.is_empty() || (from_cash && !self.symbols.cash.is_empty());
        let pool = if use_cash {
            &self.symbols.cash
        } else {
            &self.symbols.merchandise
        };
        pool.choose(&mut self.rng).copied().unwrap_or(Symbol::Banknote)
    }
}

impl<S: OutcomeSchedule> Scheduler for CardEngine<S> {
    fn issue_card(&mut self, round: u64, cost: Money) -> Card {
        let outcome = self.decide_outcome(round);
        self.synthesize_card(round, cost, outcome)
    }
}

/// Creation-time token, unique within a process
fn card_id(round: u64, sequence: u64) -> String {
    format!(
        "card_{}_{}_{}",
        Utc::now().timestamp_millis(),
        round,
        sequence
    )
}

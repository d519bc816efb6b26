//! Batch simulation of losing cards
//!
//! Measures how often the bounded redraw still lets a line through.

use serde::{Deserialize, Serialize};
use sf_core::Money;

use crate::engine::CardEngine;
use crate::lines::has_winning_line;
use crate::schedule::{Outcome, OutcomeSchedule};

/// Result of a losing-card batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub samples: u64,
    /// Cards with no completed line
    pub clean: u64,
    /// Cards that kept a line after the redraw budget ran out
    pub residual: u64,
}

impl SimulationReport {
    /// Fraction of clean cards (1.0 for an empty batch)
    pub fn clean_rate(&self) -> f64 {
        if self.samples == 0 {
            1.0
        } else {
            self.clean as f64 / self.samples as f64
        }
    }

    pub fn residual_rate(&self) -> f64 {
        1.0 - self.clean_rate()
    }
}

/// Synthesize `samples` losing cards and count accidental lines
pub fn simulate_losing_cards<S: OutcomeSchedule>(
    engine: &mut CardEngine<S>,
    samples: u64,
) -> SimulationReport {
    let mut report = SimulationReport {
        samples,
        ..Default::default()
    };

    for _ in 0..samples {
        let card = engine.synthesize_card(0, Money::ZERO, Outcome::lose());
        if has_winning_line(&card.symbols()) {
            report.residual += 1;
        } else {
            report.clean += 1;
        }
    }

    log::info!(
        "Simulated {} losing cards: {} clean, {} residual ({:.4}%)",
        report.samples,
        report.clean,
        report.residual,
        report.residual_rate() * 100.0
    );

    report
}

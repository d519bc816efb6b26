//! Card engine configuration

use serde::{Deserialize, Serialize};
use sf_core::Money;

/// Price of one play
pub const CARD_COST: Money = Money::new(4, 90);

/// Monetary value of the grand prize
pub const GRAND_PRIZE_VALUE: Money = Money::new(2499, 0);

/// Card synthesis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Price charged per card
    pub card_cost: Money,
    /// Probability that a losing-card draw comes from the cash set
    pub cash_bias: f64,
    /// Draw attempts per cell before a line-completing draw is accepted
    pub max_redraws: u32,
    /// Value stamped on grand prize cards
    pub grand_prize_value: Money,
}

impl CardConfig {
    /// Standard configuration
    pub fn standard() -> Self {
        Self {
            card_cost: CARD_COST,
            cash_bias: 0.8,
            max_redraws: 50,
            grand_prize_value: GRAND_PRIZE_VALUE,
        }
    }

    /// Cash bias clamped to a valid probability
    pub fn effective_cash_bias(&self) -> f64 {
        if self.cash_bias.is_finite() {
            self.cash_bias.clamp(0.0, 1.0)
        } else {
            0.8
        }
    }

    /// Export config as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Import config from JSON; missing fields take standard values
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        Self::standard()
    }
}

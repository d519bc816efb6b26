//! CLI configuration file
//!
//! One JSON document with optional `card`, `schedule` and `ledger`
//! sections; anything left out takes the standard values.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sf_card_lab::{CardConfig, PrizeSchedule};
use sf_state::LedgerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub card: CardConfig,
    pub schedule: PrizeSchedule,
    /// Derived from `card` when absent
    pub ledger: Option<LedgerConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            card: CardConfig::standard(),
            schedule: PrizeSchedule::standard(),
            ledger: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::info!("Config loaded from {}", path.display());
        Ok(config)
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        self.ledger
            .clone()
            .unwrap_or_else(|| LedgerConfig::from_card_config(&self.card))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }
}

//! Symbol definitions and the card alphabet

use serde::{Deserialize, Serialize};

/// Symbol family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Money glyphs
    Cash,
    /// Product images
    Merchandise,
}

/// A card symbol
///
/// Only equality matters for line matching; `face()` is what the
/// presentation layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Banknote,
    MoneyBag,
    FlyingMoney,
    Coin,
    MoneyFace,
    Iphone11,
    Iphone13,
    Iphone14,
    Iphone15ProMax,
    Airpods,
    AppleWatch,
}

impl Symbol {
    pub const CASH: [Symbol; 5] = [
        Symbol::Banknote,
        Symbol::MoneyBag,
        Symbol::FlyingMoney,
        Symbol::Coin,
        Symbol::MoneyFace,
    ];

    pub const MERCHANDISE: [Symbol; 6] = [
        Symbol::Iphone11,
        Symbol::Iphone13,
        Symbol::Iphone14,
        Symbol::Iphone15ProMax,
        Symbol::Airpods,
        Symbol::AppleWatch,
    ];

    pub fn kind(self) -> SymbolKind {
        match self {
            Symbol::Banknote
            | Symbol::MoneyBag
            | Symbol::FlyingMoney
            | Symbol::Coin
            | Symbol::MoneyFace => SymbolKind::Cash,
            _ => SymbolKind::Merchandise,
        }
    }

    pub fn is_cash(self) -> bool {
        self.kind() == SymbolKind::Cash
    }

    /// Glyph for cash symbols, image asset identifier for merchandise
    pub fn face(self) -> &'static str {
        match self {
            Symbol::Banknote => "💵",
            Symbol::MoneyBag => "💰",
            Symbol::FlyingMoney => "💸",
            Symbol::Coin => "🪙",
            Symbol::MoneyFace => "🤑",
            Symbol::Iphone11 => "/iphone_11_PNG20.png",
            Symbol::Iphone13 => "/iphone_13_PNG31.png",
            Symbol::Iphone14 => "/pngimg.com - iphone_14_PNG41.png",
            Symbol::Iphone15ProMax => "/Apple-iPhone-15-Pro-Max-Blue-Titanium-frontimage.webp",
            Symbol::Airpods => "/Airpods-Transparent-Images-PNG.png",
            Symbol::AppleWatch => "/Apple-Watch-PNG-High-Quality-Image.png",
        }
    }

    /// Short label for text output
    pub fn label(self) -> &'static str {
        match self {
            Symbol::Banknote => "💵",
            Symbol::MoneyBag => "💰",
            Symbol::FlyingMoney => "💸",
            Symbol::Coin => "🪙",
            Symbol::MoneyFace => "🤑",
            Symbol::Iphone11 => "IP11",
            Symbol::Iphone13 => "IP13",
            Symbol::Iphone14 => "IP14",
            Symbol::Iphone15ProMax => "IP15",
            Symbol::Airpods => "AIRP",
            Symbol::AppleWatch => "WTCH",
        }
    }
}

/// The closed alphabet a card engine draws from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSet {
    pub cash: Vec<Symbol>,
    pub merchandise: Vec<Symbol>,
}

impl SymbolSet {
    /// Full standard alphabet
    pub fn standard() -> Self {
        Self {
            cash: Symbol::CASH.to_vec(),
            merchandise: Symbol::MERCHANDISE.to_vec(),
        }
    }

    /// Cash ∪ merchandise
    pub fn all(&self) -> Vec<Symbol> {
        self.cash
            .iter()
            .chain(self.merchandise.iter())
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cash.len() + self.merchandise.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cash.is_empty() && self.merchandise.is_empty()
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::standard()
    }
}

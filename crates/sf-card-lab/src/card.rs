//! Scratch card produced for one play

use serde::{Deserialize, Serialize};
use sf_core::Money;

use crate::lines::{CELL_COUNT, GRID_SIDE, LineMatch, WIN_BAND, winning_lines};
use crate::symbols::Symbol;

/// Cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub col: u8,
    pub row: u8,
}

impl Position {
    /// Row-major position of a cell index
    pub fn from_index(index: usize) -> Self {
        Self {
            col: (index % GRID_SIDE) as u8,
            row: (index / GRID_SIDE) as u8,
        }
    }

    pub fn index(self) -> usize {
        self.row as usize * GRID_SIDE + self.col as usize
    }
}

/// One scratchable cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub symbol: Symbol,
    pub position: Position,
    /// Driven by the presentation layer only
    pub revealed: bool,
}

/// Prize attached to a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrizeKind {
    #[default]
    None,
    Cash,
    GrandPrize,
}

/// A single play's card
///
/// `won`, `prize_kind` and `prize_amount` are decided at creation and
/// never change; only the `revealed` flags of the cells move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Card ID
    pub id: String,
    /// Round number this card was issued for
    pub round: u64,
    /// Price charged
    pub cost: Money,
    /// Cells in row-major order
    pub cells: Vec<Cell>,
    pub won: bool,
    pub prize_kind: PrizeKind,
    /// Cash amount, or the grand prize value
    pub prize_amount: Money,
}

impl Card {
    /// Build a card from a full grid
    pub fn new(
        id: String,
        round: u64,
        cost: Money,
        symbols: [Symbol; CELL_COUNT],
        prize_kind: PrizeKind,
        prize_amount: Money,
    ) -> Self {
        let cells = symbols
            .iter()
            .enumerate()
            .map(|(i, &symbol)| Cell {
                symbol,
                position: Position::from_index(i),
                revealed: false,
            })
            .collect();

        Self {
            id,
            round,
            cost,
            cells,
            won: prize_kind != PrizeKind::None,
            prize_kind,
            prize_amount,
        }
    }

    /// Grid symbols in row-major order
    pub fn symbols(&self) -> [Symbol; CELL_COUNT] {
        let mut out = [Symbol::Banknote; CELL_COUNT];
        for (slot, cell) in out.iter_mut().zip(self.cells.iter()) {
            *slot = cell.symbol;
        }
        out
    }

    pub fn symbol_at(&self, col: u8, row: u8) -> Option<Symbol> {
        self.cells
            .get(Position { col, row }.index())
            .map(|c| c.symbol)
    }

    /// Symbols of the middle row
    pub fn win_band(&self) -> [Symbol; 3] {
        let symbols = self.symbols();
        WIN_BAND.map(|i| symbols[i])
    }

    /// Every completed line on this card
    pub fn winning_lines(&self) -> Vec<LineMatch> {
        winning_lines(&self.symbols())
    }

    /// Reveal one cell; returns its symbol, or `None` if out of range
    pub fn reveal(&mut self, index: usize) -> Option<Symbol> {
        let cell = self.cells.get_mut(index)?;
        cell.revealed = true;
        Some(cell.symbol)
    }

    pub fn reveal_all(&mut self) {
        for cell in &mut self.cells {
            cell.revealed = true;
        }
    }

    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.revealed).count()
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.cells.iter().all(|c| c.revealed)
    }
}

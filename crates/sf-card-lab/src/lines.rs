//! Line definitions and match evaluation for the 3×3 grid
//!
//! Cells are indexed row-major: index = row * 3 + col.

use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Grid side length
pub const GRID_SIDE: usize = 3;

/// Cells per card
pub const CELL_COUNT: usize = GRID_SIDE * GRID_SIDE;

/// Middle row, where forced wins are placed
pub const WIN_BAND: [usize; 3] = [3, 4, 5];

/// Line shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineKind {
    Row { row: u8 },
    Column { col: u8 },
    Diagonal,
    AntiDiagonal,
}

/// A line of three cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub kind: LineKind,
    pub cells: [usize; 3],
}

/// All 8 lines: 3 rows, 3 columns, 2 diagonals
#[rustfmt::skip]
pub const LINES: [Line; 8] = [
    Line { kind: LineKind::Row { row: 0 }, cells: [0, 1, 2] },
    Line { kind: LineKind::Row { row: 1 }, cells: [3, 4, 5] },
    Line { kind: LineKind::Row { row: 2 }, cells: [6, 7, 8] },
    Line { kind: LineKind::Column { col: 0 }, cells: [0, 3, 6] },
    Line { kind: LineKind::Column { col: 1 }, cells: [1, 4, 7] },
    Line { kind: LineKind::Column { col: 2 }, cells: [2, 5, 8] },
    Line { kind: LineKind::Diagonal, cells: [0, 4, 8] },
    Line { kind: LineKind::AntiDiagonal, cells: [2, 4, 6] },
];

/// A completed line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMatch {
    pub line: Line,
    pub symbol: Symbol,
}

impl Line {
    /// Symbol shared by all three cells, if every cell is filled and equal
    fn matched(&self, grid: &[Option<Symbol>; CELL_COUNT]) -> Option<Symbol> {
        let [a, b, c] = self.cells.map(|i| grid[i]);
        match (a, b, c) {
            (Some(a), Some(b), Some(c)) if a == b && b == c => Some(a),
            _ => None,
        }
    }
}

/// Every completed line on a full grid
pub fn winning_lines(symbols: &[Symbol; CELL_COUNT]) -> Vec<LineMatch> {
    let grid = symbols.map(Some);
    LINES
        .iter()
        .filter_map(|line| {
            line.matched(&grid)
                .map(|symbol| LineMatch { line: *line, symbol })
        })
        .collect()
}

pub fn has_winning_line(symbols: &[Symbol; CELL_COUNT]) -> bool {
    let grid = symbols.map(Some);
    LINES.iter().any(|line| line.matched(&grid).is_some())
}

/// Would placing `symbol` at `pos` complete a line with the cells already placed?
pub fn would_complete_line(
    partial: &[Option<Symbol>; CELL_COUNT],
    pos: usize,
    symbol: Symbol,
) -> bool {
    let mut trial = *partial;
    trial[pos] = Some(symbol);
    LINES
        .iter()
        .filter(|line| line.cells.contains(&pos))
        .any(|line| line.matched(&trial).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Symbol::*;

    #[test]
    fn test_lines_cover_all_cells() {
        for cell in 0..CELL_COUNT {
            assert!(LINES.iter().any(|l| l.cells.contains(&cell)));
        }
        // Center sits on 4 lines
        assert_eq!(LINES.iter().filter(|l| l.cells.contains(&4)).count(), 4);
    }

    #[test]
    fn test_detects_diagonal() {
        #[rustfmt::skip]
        let grid = [
            Coin, Banknote, MoneyFace,
            Airpods, Coin, Iphone11,
            Banknote, MoneyFace, Coin,
        ];
        let wins = winning_lines(&grid);
        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].line.kind, LineKind::Diagonal);
        assert_eq!(wins[0].symbol, Coin);
    }

    #[test]
    fn test_no_line() {
        #[rustfmt::skip]
        let grid = [
            Coin, Banknote, MoneyFace,
            Banknote, MoneyFace, Coin,
            Coin, Banknote, MoneyFace,
        ];
        // anti-diagonal 2,4,6 = MoneyFace, MoneyFace, Coin
        assert!(!has_winning_line(&grid));
    }

    #[test]
    fn test_would_complete_line() {
        let mut partial = [None; CELL_COUNT];
        partial[0] = Some(MoneyBag);
        partial[1] = Some(MoneyBag);
        assert!(would_complete_line(&partial, 2, MoneyBag));
        assert!(!would_complete_line(&partial, 2, Coin));
        // Column through an empty cell is never complete
        assert!(!would_complete_line(&partial, 3, MoneyBag));
    }
}

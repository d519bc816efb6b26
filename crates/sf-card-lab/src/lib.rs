//! # sf-card-lab: Outcome scheduler and card synthesis for ScratchForge
//!
//! Decides, per round number, whether a play is a forced win and builds a
//! 3×3 scratch card consistent with that decision.
//!
//! ## Architecture
//!
//! ```text
//! CardEngine
//!     │
//!     ├── PrizeSchedule (round → Outcome policy table)
//!     ├── SymbolSet (cash ∪ merchandise alphabet)
//!     └── CardConfig (cost, cash bias, redraw budget)
//!           │
//!           v
//!     Card (9 cells, won, prize)
//! ```
//!
//! Winning cards carry the prize symbol across the middle row. Losing
//! cards are drawn cell by cell with a bounded redraw whenever a draw would
//! complete any of the 8 lines.

pub mod card;
pub mod config;
pub mod engine;
pub mod lines;
pub mod schedule;
pub mod simulation;
pub mod symbols;

pub use card::*;
pub use config::*;
pub use engine::*;
pub use lines::*;
pub use schedule::*;
pub use simulation::*;
pub use symbols::*;

//! sf-core: shared value types for ScratchForge
//!
//! Money arithmetic in exact minor units and the common error types.

mod error;
mod money;

pub use error::*;
pub use money::*;

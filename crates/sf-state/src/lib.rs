//! sf-state: Session ledger and everything around it
//!
//! Balance, play count, grand prize flags and the identity/deposit
//! verification gate, persisted through an injected `SessionStore`.

mod error;
mod identity;
mod ledger;
mod payments;
mod registration;
mod session;
mod store;
mod validation;

pub use error::*;
pub use identity::*;
pub use ledger::*;
pub use payments::*;
pub use registration::*;
pub use session::*;
pub use store::*;
pub use validation::*;

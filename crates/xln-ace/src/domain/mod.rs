//! Pure domain types: the bilateral account state machine, its transaction
//! rules, and the errors/backoff policy around them.

pub mod account;
pub mod backoff;
pub mod error;
pub mod state_machine;

pub use account::{AccountMachine, AccountStatus, ActiveDispute};
pub use error::{AceError, AceResult};
pub use state_machine::{AccountEvent, AccountPhase};

//! Pure settlement-workspace lifecycle rules. No I/O: callers supply
//! wall-clock time and pre-computed signatures.

pub mod error;
pub mod lifecycle;

pub use error::{SettleError, SettleResult};

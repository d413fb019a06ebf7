//! Pure entity-state rules: the parts of `EntityTx` application that only
//! touch this entity's own reserves/batch/profile. No I/O.

pub mod apply;
pub mod entity_state;
pub mod error;

pub use entity_state::EntityState;
pub use error::{ErmError, ErmResult};

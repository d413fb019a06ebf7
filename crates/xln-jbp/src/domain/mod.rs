pub mod error;
pub mod fees;
pub mod lifecycle;

pub use error::{JbpError, JbpResult};
pub use fees::{FeeData, FeeOverrides};

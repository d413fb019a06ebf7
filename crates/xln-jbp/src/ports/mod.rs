pub mod inbound;
pub mod outbound;

pub use inbound::JbpApi;
pub use outbound::{JurisdictionAdapter, SystemTimeSource, TimeSource};

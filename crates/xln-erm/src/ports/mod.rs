pub mod inbound;
pub mod outbound;

pub use inbound::ErmApi;
pub use outbound::{AceGateway, JbpGateway, SystemTimeSource, TimeSource};

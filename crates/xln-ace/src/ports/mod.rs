pub mod inbound;
pub mod outbound;

pub use inbound::AceApi;
pub use outbound::{AccountEventBus, DisputeGateway, SystemTimeSource, TimeSource};

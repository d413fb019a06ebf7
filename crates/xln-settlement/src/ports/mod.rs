pub mod inbound;
pub mod outbound;

pub use inbound::SettlementApi;
pub use outbound::{AccountGateway, JbpDraftSink, SystemTimeSource, TimeSource};

pub mod erm_gateway;

pub use erm_gateway::{ErmJbpGateway, JbpDisputeGateway, SettlementJbpSink};

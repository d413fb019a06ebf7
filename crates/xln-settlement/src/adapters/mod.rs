pub mod ace_gateway;

pub use ace_gateway::AceAccountGateway;

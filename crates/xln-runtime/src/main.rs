//! Demo entry point for the runtime scheduler.
//!
//! Spec §10.4 keeps the core a library, not a standalone binary: there is no
//! config-file parsing or RPC surface here. This binary exists to give the
//! workspace something runnable — it wires a `RuntimeContainer` against the
//! in-memory adapters from `xln-adapters`, registers a couple of demo
//! entities, and ticks the scheduler on a fixed interval until interrupted.

use anyhow::Result;
use shared_types::{Amount, EntityConfig, EntityId, JurisdictionRef, SignerId};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use xln_adapters::MockJurisdictionAdapter;
use xln_jbp::domain::FeeData;
use xln_runtime::{RuntimeConfig, RuntimeContainer};

fn demo_entity_config() -> EntityConfig {
    EntityConfig {
        validators: vec![SignerId([0u8; 20])],
        jurisdiction: JurisdictionRef {
            chain_id: 1,
            contract_address: "0x0000000000000000000000000000000000000000".to_string(),
        },
    }
}

fn demo_entity_id(byte: u8) -> EntityId {
    let mut bytes = [0u8; 32];
    bytes[31] = byte;
    EntityId(bytes)
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_max_level(Level::TRACE)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("xln-runtime demo starting");

    let jurisdiction = MockJurisdictionAdapter::new(FeeData {
        max_fee_per_gas: Amount::from(20_000_000_000i64),
        max_priority_fee_per_gas: Amount::from(1_500_000_000i64),
    });

    let mut container = RuntimeContainer::new(jurisdiction, b"xln-runtime-demo-seed".to_vec(), RuntimeConfig::default());

    container.register_host(demo_entity_id(1), demo_entity_config());
    container.register_host(demo_entity_id(2), demo_entity_config());
    info!(entities = container.hosted_entities().len(), "registered demo entities");

    let mut interval = tokio::time::interval(Duration::from_millis(200));
    info!("entering tick loop, press Ctrl+C to stop");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(err) = container.tick().await {
                    tracing::error!(%err, "tick failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    Ok(())
}

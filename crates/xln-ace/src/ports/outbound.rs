//! Outbound capabilities ACE needs from the rest of the system: publishing
//! wire messages, signing/verifying, escalating to a dispute, and reading
//! wall-clock time (spec §4.1, §6.1).

use async_trait::async_trait;
use shared_types::{AccountInput, AccountPair, Hash};
use std::time::{SystemTime, UNIX_EPOCH};

/// Delivers an `AccountInput` to the counterparty's entity instance. In this
/// workspace the concrete implementation publishes onto `shared-bus`'s
/// `InMemoryEventBus`; a networked deployment would implement this over a
/// real transport instead.
#[async_trait]
pub trait AccountEventBus: Send + Sync {
    async fn send(&self, input: AccountInput);
}

/// Escalates a pair to a dispute once local consensus cannot make progress
/// (spec §4.1 "Failure semantics": signature mismatch on finalize, or
/// hash-mismatch retries exhausted). Implemented by `xln-jbp`.
#[async_trait]
pub trait DisputeGateway: Send + Sync {
    async fn open_dispute(
        &self,
        pair: AccountPair,
        last_cosigned_state_hash: Hash,
        frame_height: u64,
    );
}

/// Wall-clock time, abstracted so tests can supply a fixed clock.
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_time_source_is_monotonic_enough_for_a_single_read() {
        let ts = SystemTimeSource;
        assert!(ts.now_ms() > 0);
    }
}

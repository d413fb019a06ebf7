//! Randomized exponential backoff for frame-hash-mismatch retries (spec §4.1
//! "Failure semantics"): 200ms initial delay, doubling, capped at 5s, with a
//! hard limit of 3 retries before the account escalates to a dispute.

use rand::Rng;
use std::time::Duration;

pub const INITIAL_DELAY_MS: u64 = 200;
pub const MAX_DELAY_MS: u64 = 5_000;
pub const MAX_RETRIES: u32 = 3;

/// Delay before retry number `attempt` (1-indexed), with +/-20% jitter so two
/// racing proposers don't retry in lockstep.
pub fn backoff_delay(attempt: u32) -> Duration {
    let base = INITIAL_DELAY_MS.saturating_mul(1u64 << attempt.min(8)).min(MAX_DELAY_MS);
    let jitter_span = base / 5;
    let jitter = if jitter_span == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=jitter_span * 2) as i64 - jitter_span as i64
    };
    let delayed = (base as i64 + jitter).max(INITIAL_DELAY_MS as i64) as u64;
    Duration::from_millis(delayed.min(MAX_DELAY_MS))
}

pub fn retries_exhausted(attempt: u32) -> bool {
    attempt >= MAX_RETRIES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_is_near_initial_delay() {
        let d = backoff_delay(0);
        assert!(d.as_millis() >= (INITIAL_DELAY_MS as u128 * 8 / 10));
        assert!(d.as_millis() <= MAX_DELAY_MS as u128);
    }

    #[test]
    fn delay_is_capped() {
        let d = backoff_delay(20);
        assert!(d.as_millis() <= MAX_DELAY_MS as u128);
    }

    #[test]
    fn three_retries_is_the_limit() {
        assert!(!retries_exhausted(2));
        assert!(retries_exhausted(3));
        assert!(retries_exhausted(4));
    }
}

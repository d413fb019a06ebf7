//! Runtime-level configuration (spec §10.4). `EntityState.config`
//! (`EntityConfig`) is constructed per entity by the embedding application;
//! this struct holds the numeric defaults the scheduler and query surface
//! apply across every hosted entity.

/// Tick interval is deliberately absent: ticks are driven externally by
/// whatever embeds this crate (a test harness, a wall-clock loop in
/// `main.rs`), never scheduled internally (spec §5 "scheduling model").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeConfig {
    /// Mirrors `xln_ace`'s hard-coded per-proposal retry timeout (spec
    /// §4.1/§5 "Cancellation and timeouts"). Not wired into `xln-ace` itself
    /// — that crate owns its own backoff schedule — kept here only so the
    /// UI and logs can surface the value the core is actually operating
    /// under without hunting through `xln-ace`'s source.
    pub proposal_timeout_ms: u64,
    /// Mirrors `xln_ace`'s hard-coded retry budget before a stalled proposal
    /// escalates to a dispute (spec §4.1).
    pub retry_budget: u32,
    /// Passed to `SettlementWorkspace::is_stale` by the query surface (spec
    /// §4.2 "Failure semantics": default 60s).
    pub settlement_stale_timeout_ms: u64,
    /// Suggested `gasBumpBps` for a UI-initiated `j_rebroadcast` when the
    /// caller does not name one (spec §4.4: default 1000 bps = 10%).
    pub default_fee_bump_bps: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            proposal_timeout_ms: 5_000,
            retry_budget: 3,
            settlement_stale_timeout_ms: 60_000,
            default_fee_bump_bps: 1_000,
        }
    }
}

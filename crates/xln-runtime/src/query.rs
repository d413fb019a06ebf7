//! Query helpers the UI surface exposes alongside ingress/egress (spec
//! §6.2: `getAccount`, `deriveDelta`, `formatTokenAmount`, `getHubs`).
//! Read-only; none of these mutate `AceState`/`ErmState`.

use crate::host::RuntimeHost;
use shared_types::{AccountPair, DeltaView, EntityId, Profile, SettlementWorkspace, TokenId, TokenInfo};
use std::collections::BTreeMap;
use xln_ace::{AccountMachine, AccountStatus};
use xln_adapters::{Gossip, TokenRegistry};

/// A read-only snapshot of one side of a bilateral account, shaped for
/// direct UI consumption rather than forcing the caller to reach into
/// `AccountMachine`'s internals.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    pub pair: AccountPair,
    pub status: AccountStatus,
    pub height: u64,
    pub deltas: BTreeMap<TokenId, shared_types::Delta>,
    pub settlement_workspace: Option<SettlementWorkspace>,
}

impl From<&AccountMachine> for AccountSnapshot {
    fn from(machine: &AccountMachine) -> Self {
        Self {
            pair: machine.pair,
            status: machine.status,
            height: machine.current_frame.height,
            deltas: machine.deltas.clone(),
            settlement_workspace: machine.settlement_workspace.clone(),
        }
    }
}

/// `getAccount(entityId, counterparty)` (spec §6.2): the named entity's view
/// of its account with `counterparty`. Opens the account on first query,
/// mirroring every other `AceState` access path.
pub fn get_account(host: &RuntimeHost, counterparty: EntityId) -> AccountSnapshot {
    let pair = AccountPair::new(host.local_entity_id, counterparty);
    let machine = host.ace_state.get_or_open(pair);
    AccountSnapshot::from(&*machine)
}

/// `deriveDelta(delta, isLeft)` (spec §6.2): a thin re-export of
/// `shared_types::derive_delta` so callers reach every query helper through
/// one module.
pub fn derive_delta(delta: &shared_types::Delta, is_left: bool) -> DeltaView {
    shared_types::derive_delta(delta, is_left)
}

/// `formatTokenAmount(tokenId, amount)` (spec §6.2): renders a raw integer
/// `Amount` as a human-scaled decimal string suffixed with the token's
/// symbol, e.g. `1.5 USDC` for `amount = 1_500_000`, `decimals = 6`.
pub fn format_token_amount(amount: &shared_types::Amount, info: &TokenInfo) -> String {
    let raw = amount.to_string();
    let negative = raw.starts_with('-');
    let digits = if negative { &raw[1..] } else { raw.as_str() };
    let decimals = info.decimals as usize;

    let padded;
    let digits = if digits.len() <= decimals {
        padded = format!("{:0>width$}", digits, width = decimals + 1);
        padded.as_str()
    } else {
        digits
    };

    let split_at = digits.len() - decimals;
    let (int_part, frac_part) = digits.split_at(split_at);
    let frac_trimmed = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(int_part);
    if !frac_trimmed.is_empty() {
        out.push('.');
        out.push_str(frac_trimmed);
    }
    out.push(' ');
    out.push_str(&info.symbol);
    out
}

/// Looks up a token's metadata before formatting, rejecting unknown tokens
/// the way the jurisdiction's registry would.
pub async fn format_token_amount_by_id(
    registry: &dyn TokenRegistry,
    token_id: TokenId,
    amount: &shared_types::Amount,
) -> Result<String, xln_adapters::AdapterError> {
    let info = registry.info(token_id).await?;
    Ok(format_token_amount(amount, &info))
}

/// `getHubs()` (spec §6.2): every entity any published profile names as a
/// hub, deduplicated. Hub status is a declared fact in a profile, not a
/// computed property of the chain.
pub async fn get_hubs(gossip: &dyn Gossip) -> Vec<EntityId> {
    let mut hubs: Vec<EntityId> = gossip
        .get_profiles()
        .await
        .into_iter()
        .flat_map(|(_, profile): (EntityId, Profile)| profile.hubs)
        .collect();
    hubs.sort();
    hubs.dedup();
    hubs
}

//! End-to-end scenarios spanning the bilateral frame protocol, settlement
//! workspace, jurisdiction batch lifecycle, and dispute escalation. Each
//! test wires only the crates the scenario touches, either through a full
//! `RuntimeContainer` (when two hosts must actually exchange wire messages)
//! or through a standalone service construction (when one side's behavior
//! is what's under test).

use shared_crypto::{DeterministicKeyStore, Secp256k1Crypto};
use shared_types::{
    AccountFrameAck, AccountInput, AccountPair, AccountTx, Amount, BatchEventType, BatchSource,
    BatchStatus, DraftBatch, EntityInput, EntityTx, FeePreset, JurisdictionEvent, RuntimeInput,
    SettleOp, Side, SignerId, WorkspaceStatus,
};
use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use xln_ace::adapters::BusAccountEventBus;
use xln_ace::{AccountConsensusService, AccountStatus, AceApi};
use xln_erm::ErmState;
use xln_jbp::{JbpApi, JbpDisputeGateway, JbpService, JbpState};
use xln_settlement::adapters::AceAccountGateway;
use xln_settlement::{SettlementApi, SettlementService};
use xln_tests::{entity, mock_jurisdiction, test_entity_config, two_host_container, RecordingJbpSink, TEST_SEED, USDC};

fn entity_input(id: shared_types::EntityId, txs: Vec<EntityTx>) -> EntityInput {
    EntityInput {
        entity_id: id,
        signer_id: SignerId([0u8; 20]),
        entity_txs: txs,
    }
}

fn open_account_tx(counterparty: shared_types::EntityId, credit: i64) -> EntityTx {
    EntityTx::OpenAccount {
        target_entity_id: counterparty,
        credit_amount: Some(Amount::from(credit)),
        token_id: Some(USDC),
        rebalance_policy: None,
    }
}

/// S1: two hosts open mutual credit lines, then A pays B directly. Both
/// sides' mirrored deltas must agree once the frame finalizes.
#[tokio::test]
async fn s1_direct_payment_between_two_hosts() {
    let container = two_host_container();
    let a = entity(1);
    let b = entity(2);

    // The two `OpenAccount`s are submitted and ticked one at a time, not
    // batched: `handle_finalize` drains `account_txs.len()` entries off the
    // *local* mempool on trust that they're the same txs just finalized.
    // That only holds when the other side's mempool is empty at the time —
    // true here because each side queues and ticks before the other queues.
    container
        .enqueue_runtime_input(RuntimeInput {
            entity_inputs: vec![entity_input(a, vec![open_account_tx(b, 1_000_000)])],
        })
        .await
        .unwrap();
    // Height 0 -> 1: only `a` may propose (next_proposer_is_left is
    // unconditionally true at height 0, and `a < b` so `a` is left).
    container.tick().await.unwrap();

    container
        .enqueue_runtime_input(RuntimeInput {
            entity_inputs: vec![entity_input(b, vec![open_account_tx(a, 1_000_000)])],
        })
        .await
        .unwrap();
    // Height 1 -> 2: the alternation now favors `b`.
    container.tick().await.unwrap();

    let pair = AccountPair::new(a, b);
    assert_eq!(container.host(a).unwrap().ace_state.get_or_open(pair).current_frame.height, 2);
    assert_eq!(container.host(b).unwrap().ace_state.get_or_open(pair).current_frame.height, 2);

    container
        .enqueue_runtime_input(RuntimeInput {
            entity_inputs: vec![entity_input(
                a,
                vec![EntityTx::DirectPayment {
                    counterparty: b,
                    token: USDC,
                    amount: Amount::from(100i64),
                    description: "coffee".into(),
                }],
            )],
        })
        .await
        .unwrap();

    // Height 2 -> 3: alternation favors `a` again.
    container.tick().await.unwrap();

    let snap_a = xln_runtime::query::get_account(container.host(a).unwrap(), b);
    let snap_b = xln_runtime::query::get_account(container.host(b).unwrap(), a);
    assert_eq!(snap_a.height, 3);
    assert_eq!(snap_b.height, 3);

    let delta_a = snap_a.deltas.get(&USDC).unwrap();
    let delta_b = snap_b.deltas.get(&USDC).unwrap();
    assert_eq!(delta_a.offdelta, Amount::from(-100i64));
    assert_eq!(delta_b.offdelta, Amount::from(-100i64));

    let view_a = xln_runtime::query::derive_delta(delta_a, true);
    let view_b = xln_runtime::query::derive_delta(delta_b, false);
    assert_eq!(view_a.out_capacity(), Amount::from(999_900i64));
    assert_eq!(view_a.in_capacity(), Amount::from(1_000_100i64));
    // The mirrored side's capacities must swap in/out.
    assert_eq!(view_a.out_capacity(), view_b.in_capacity());
    assert_eq!(view_a.in_capacity(), view_b.out_capacity());
}

/// S3: both sides queue a direct payment before either proposes. Only the
/// side the alternation favors gets its tx into the height-1 frame; the
/// other side's independently-queued tx stays in its own mempool (finalize
/// only drains entries that match the included txs by content) and is
/// proposed at height 2 instead.
#[tokio::test]
async fn s3_concurrent_proposals_resolve_one_at_a_time() {
    let container = two_host_container();
    let a = entity(1);
    let b = entity(2);
    let pair = AccountPair::new(a, b);

    // Seed credit limits directly on both hosts' independent `AceState`s,
    // bypassing the tick-driven `OpenAccount` dance so the pair starts at
    // height 0 on both sides (required for the alternation assertion below).
    for host_entity in [a, b] {
        let host = container.host(host_entity).unwrap();
        let mut machine = host.ace_state.get_or_open(pair);
        let delta = machine.deltas.entry(USDC).or_insert_with(|| shared_types::Delta::new(USDC));
        delta.left_credit_limit = Amount::from(1_000_000i64);
        delta.right_credit_limit = Amount::from(1_000_000i64);
    }

    container
        .enqueue_runtime_input(RuntimeInput {
            entity_inputs: vec![
                entity_input(
                    a,
                    vec![EntityTx::DirectPayment {
                        counterparty: b,
                        token: USDC,
                        amount: Amount::from(10i64),
                        description: "a-pays-b".into(),
                    }],
                ),
                entity_input(
                    b,
                    vec![EntityTx::DirectPayment {
                        counterparty: a,
                        token: USDC,
                        amount: Amount::from(20i64),
                        description: "b-pays-a".into(),
                    }],
                ),
            ],
        })
        .await
        .unwrap();

    container.tick().await.unwrap();

    // Only `a`'s tx could be included: height 0 unconditionally favors left.
    let machine_a = container.host(a).unwrap().ace_state.get_or_open(pair);
    let machine_b = container.host(b).unwrap().ace_state.get_or_open(pair);
    assert_eq!(machine_a.current_frame.height, 1);
    assert_eq!(machine_b.current_frame.height, 1);
    assert_eq!(machine_a.current_frame.account_txs.len(), 1);
    assert_eq!(machine_a.current_frame.state_hash, machine_b.current_frame.state_hash);
    // `a`'s own mempool is empty because its tx was the one finalized.
    assert!(machine_a.mempool.is_empty());
    // `b`'s tx never matched what finalized, so it's still queued locally —
    // held for the next tick rather than discarded.
    assert_eq!(machine_b.mempool.len(), 1);
    let delta_a = machine_a.deltas.get(&USDC).unwrap();
    let delta_b = machine_b.deltas.get(&USDC).unwrap();
    assert_eq!(delta_a.offdelta, Amount::from(-10i64));
    assert_eq!(delta_b.offdelta, Amount::from(-10i64));
    drop(machine_a);
    drop(machine_b);

    // Height 1 -> 2: the alternation now favors `b`, whose tx is still
    // sitting in its own mempool from the first tick.
    container.tick().await.unwrap();

    let machine_a = container.host(a).unwrap().ace_state.get_or_open(pair);
    let machine_b = container.host(b).unwrap().ace_state.get_or_open(pair);
    assert_eq!(machine_a.current_frame.height, 2);
    assert_eq!(machine_b.current_frame.height, 2);
    assert_eq!(machine_a.current_frame.state_hash, machine_b.current_frame.state_hash);
    assert!(machine_a.mempool.is_empty());
    assert!(machine_b.mempool.is_empty());
}

/// S2: A proposes a reserve-to-collateral settlement op, B approves (fixing
/// itself as executor per the workspace lifecycle), B executes. The
/// resulting `account_settle` tx lands in the shared account mempool with
/// the compiled diff `compile_ops` computes for a left-proposed `R2c`.
#[tokio::test]
async fn s2_settlement_r2c_queues_account_settle() {
    let bus = Arc::new(BusAccountEventBus::new(Arc::new(InMemoryEventBus::new())));
    let erm_state = Arc::new(ErmState::new());
    let a = entity(1);
    let b = entity(2);
    let pair = AccountPair::new(a, b);
    assert!(pair.is_left(&a), "entity(1) must sort left of entity(2)");

    let ace = Arc::new(AccountConsensusService::new(
        a,
        bus,
        Arc::new(Secp256k1Crypto),
        Arc::new(DeterministicKeyStore::new()),
        Arc::new(JbpDisputeGateway::new(a, erm_state.clone())),
        TEST_SEED.to_vec(),
    ));
    let ace_state = ace.state();
    let gateway = Arc::new(AceAccountGateway::new(ace_state.clone(), ace.clone()));
    let jbp_sink = Arc::new(RecordingJbpSink::new());

    let settle_a = SettlementService::new(
        a,
        gateway.clone(),
        jbp_sink.clone(),
        Arc::new(Secp256k1Crypto),
        Arc::new(DeterministicKeyStore::new()),
        TEST_SEED.to_vec(),
    );
    let settle_b = SettlementService::new(
        b,
        gateway.clone(),
        jbp_sink.clone(),
        Arc::new(Secp256k1Crypto),
        Arc::new(DeterministicKeyStore::new()),
        TEST_SEED.to_vec(),
    );

    settle_a
        .settle_propose(pair, vec![SettleOp::R2c { token: USDC, amount: Amount::from(500i64) }], "fund".into())
        .await
        .unwrap();

    {
        let ws = gateway.workspace(pair).await.unwrap();
        assert_eq!(ws.status, WorkspaceStatus::AwaitingCounterparty);
    }

    settle_b.settle_approve(pair).await.unwrap();
    {
        let ws = gateway.workspace(pair).await.unwrap();
        assert_eq!(ws.status, WorkspaceStatus::ReadyToSubmit);
        assert_eq!(ws.executor_is_left, Some(false));
    }

    settle_b.settle_execute(pair).await.unwrap();
    {
        let ws = gateway.workspace(pair).await.unwrap();
        assert_eq!(ws.status, WorkspaceStatus::Submitted);
    }

    // No r2r ops were proposed, so the JBP sink should never have been
    // called — only `R2r` ops reach it (spec's `R2c`/`C2r` stay local).
    assert!(jbp_sink.calls.lock().is_empty());

    let tx = {
        let machine = ace_state.get_or_open(pair);
        machine.mempool.last().cloned().expect("account_settle tx queued")
    };
    match &tx {
        AccountTx::AccountSettle { workspace_version, compiled_diffs } => {
            assert_eq!(*workspace_version, 0);
            assert_eq!(compiled_diffs.len(), 1);
            let diff = &compiled_diffs[0];
            assert_eq!(diff.token, USDC);
            assert_eq!(diff.collateral_diff, Amount::from(500i64));
            assert_eq!(diff.ondelta_diff, Amount::from(500i64));
        }
        other => panic!("expected account_settle, got {other:?}"),
    }

    // A proposed the workspace, so A is the frame's proposer role here too.
    {
        let mut machine = ace_state.get_or_open(pair);
        machine.apply_tx(&tx, true).unwrap();
        let delta = machine.deltas.get(&USDC).unwrap();
        assert_eq!(delta.collateral, Amount::from(500i64));
        assert_eq!(delta.ondelta, Amount::from(500i64));
        assert!(machine.settlement_workspace.is_none());
    }
}

/// S4: broadcast, attempt a second (rejected) broadcast, rebroadcast with a
/// gas bump, then confirm on chain.
#[tokio::test]
async fn s4_broadcast_rebroadcast_confirm_lifecycle() {
    let erm_state = Arc::new(ErmState::new());
    let ace_state = Arc::new(xln_ace::AceState::new());
    let jbp_state = Arc::new(JbpState::new());
    let jurisdiction = mock_jurisdiction();
    let e = entity(1);
    let counterparty = entity(2);

    let jbp = JbpService::new(
        erm_state.clone(),
        ace_state,
        jbp_state,
        jurisdiction.clone(),
        Arc::new(Secp256k1Crypto),
        Arc::new(DeterministicKeyStore::new()),
        Box::new(xln_jbp::SystemTimeSource),
        TEST_SEED.to_vec(),
        test_entity_config(),
    );

    {
        let mut state = erm_state.get_or_open(e, test_entity_config);
        state.set_reserve(USDC, Amount::from(1_000i64));
        xln_erm::domain::apply::deposit_collateral(&mut state, counterparty, USDC, Amount::from(400i64)).unwrap();
    }

    jbp.j_broadcast(e, Some(FeePreset::Fast)).await.unwrap();

    {
        let state = erm_state.get_or_open(e, test_entity_config);
        assert!(state.batch.is_empty());
        let sent = state.sent_batch.as_ref().expect("sent batch recorded");
        assert_eq!(sent.entity_nonce, 0);
        assert_eq!(sent.submit_attempts, 1);
    }

    // Broadcasting again while one is already in flight is rejected.
    {
        let mut state = erm_state.get_or_open(e, test_entity_config);
        xln_erm::domain::apply::deposit_collateral(&mut state, counterparty, USDC, Amount::from(100i64)).unwrap();
    }
    let err = jbp.j_broadcast(e, None).await.unwrap_err();
    assert_eq!(err, xln_jbp::JbpError::AlreadySent);

    jbp.j_rebroadcast(e, 2_000).await.unwrap();
    {
        let state = erm_state.get_or_open(e, test_entity_config);
        let sent = state.sent_batch.as_ref().unwrap();
        assert_eq!(sent.submit_attempts, 2);
        assert_eq!(sent.entity_nonce, 0);
    }

    let tx_hash = jurisdiction.submitted_batches().last().unwrap().tx_hash.clone();
    let block = jurisdiction.mine_block();
    jbp.handle_jurisdiction_event(JurisdictionEvent::BatchConfirmed {
        tx_hash,
        j_block_number: block,
        log_index: 0,
        entity_id: e,
        entity_nonce: 0,
        event_type: BatchEventType::ProcessBatch,
    })
    .await
    .unwrap();

    let state = erm_state.get_or_open(e, test_entity_config);
    assert!(state.sent_batch.is_none());
    assert_eq!(state.last_finalized_j_height, block);
    let entry = state.batch_history.last().unwrap();
    assert_eq!(entry.status, BatchStatus::Confirmed);
    assert_eq!(entry.source, BatchSource::Local);
}

/// S5: a hash-mismatched ack is retried with backoff up to the retry
/// budget, then escalates to a dispute and records a `dispute_starts` op
/// against the local entity's draft batch.
#[tokio::test]
async fn s5_retry_exhaustion_escalates_to_dispute() {
    let erm_state = Arc::new(ErmState::new());
    let a = entity(1);
    let b = entity(2);
    let pair = AccountPair::new(a, b);

    let ace = AccountConsensusService::new(
        a,
        Arc::new(BusAccountEventBus::new(Arc::new(InMemoryEventBus::new()))),
        Arc::new(Secp256k1Crypto),
        Arc::new(DeterministicKeyStore::new()),
        Arc::new(JbpDisputeGateway::new(a, erm_state.clone())),
        TEST_SEED.to_vec(),
    );

    ace.queue_tx(
        pair,
        AccountTx::SetCreditLimit { token: USDC, side: Side::Right, amount: Amount::from(1_000i64) },
    )
    .await
    .unwrap();
    ace.propose_ready_accounts().await.unwrap();

    let bogus_ack = |attempt: u64| AccountInput::Ack(AccountFrameAck {
        pair,
        height: 1,
        state_hash: [0xFFu8; 32],
        ack_sig: vec![attempt as u8],
    });

    let first = ace.handle_input(bogus_ack(1)).await.unwrap_err();
    assert_eq!(first, xln_ace::AceError::StateHashMismatch);
    let second = ace.handle_input(bogus_ack(2)).await.unwrap_err();
    assert_eq!(second, xln_ace::AceError::StateHashMismatch);
    let third = ace.handle_input(bogus_ack(3)).await.unwrap_err();
    assert_eq!(third, xln_ace::AceError::RetriesExhausted);

    let state = ace.state();
    let machine = state.get_or_open(pair);
    assert_eq!(machine.status, AccountStatus::Disputed);
    drop(machine);

    let erm = erm_state.get_or_open(a, test_entity_config);
    assert_eq!(erm.batch.dispute_starts.len(), 1);
    let op = &erm.batch.dispute_starts[0];
    assert_eq!(op.counterparty, b);
    // `escalate_dispute` reports `current_frame.height`, not the pending
    // frame that was never finalized — no frame ever finalized here, so it's
    // still the machine's initial height.
    assert_eq!(op.frame_height, 0);
}

/// S6: a counterparty-initiated settlement observed on chain is recorded
/// into `batch_history` exactly once, deduplicated by `(tx_hash, op_index)`.
#[tokio::test]
async fn s6_counterparty_batch_confirmed_is_deduplicated() {
    let erm_state = Arc::new(ErmState::new());
    let ace_state = Arc::new(xln_ace::AceState::new());
    let jbp_state = Arc::new(JbpState::new());
    let jurisdiction = mock_jurisdiction();
    let e = entity(1);
    let counterparty = entity(2);
    let pair = AccountPair::new(e, counterparty);

    let jbp = JbpService::new(
        erm_state.clone(),
        ace_state.clone(),
        jbp_state,
        jurisdiction,
        Arc::new(Secp256k1Crypto),
        Arc::new(DeterministicKeyStore::new()),
        Box::new(xln_jbp::SystemTimeSource),
        TEST_SEED.to_vec(),
        test_entity_config(),
    );

    // Seed the shared account with 500 collateral already on this token, so
    // the counterparty's observed withdrawal below has something to draw
    // down without driving collateral negative.
    {
        let mut machine = ace_state.get_or_open(pair);
        machine
            .deltas
            .entry(USDC)
            .or_insert_with(|| shared_types::Delta::new(USDC))
            .collateral = Amount::from(500i64);
    }

    let event = JurisdictionEvent::CounterpartyBatchConfirmed {
        tx_hash: "0xcc".into(),
        j_block_number: 5,
        log_index: 0,
        entity_id: e,
        counterparty,
        op_index: 0,
        token: USDC,
        collateral_delta: Amount::from(-200i64),
    };

    jbp.handle_jurisdiction_event(event.clone()).await.unwrap();
    {
        let state = erm_state.get_or_open(e, test_entity_config);
        assert_eq!(state.batch_history.len(), 1);
        let entry = &state.batch_history[0];
        assert_eq!(entry.source, BatchSource::CounterpartyEvent);
        assert_eq!(entry.status, BatchStatus::Confirmed);
        assert_eq!(entry.tx_hash, Some("0xcc".to_string()));
        assert_eq!(entry.j_block_number, Some(5));
        assert_eq!(entry.ops, DraftBatch::default());
        assert!(state.sent_batch.is_none());
    }
    // The counterparty's observed withdrawal (c2r) reduces the shared
    // account's collateral by 200, mirrored locally the same way a local
    // `C2r` would compile.
    {
        let machine = ace_state.get_or_open(pair);
        assert_eq!(machine.deltas[&USDC].collateral, Amount::from(300i64));
    }

    // Re-delivery of the same (tx_hash, op_index) is a no-op, including for
    // the collateral mutation: still 300, not drawn down again to 100.
    jbp.handle_jurisdiction_event(event).await.unwrap();
    let state = erm_state.get_or_open(e, test_entity_config);
    assert_eq!(state.batch_history.len(), 1);
    let machine = ace_state.get_or_open(pair);
    assert_eq!(machine.deltas[&USDC].collateral, Amount::from(300i64));
}

/// S7: a non-cooperative dispute finalization derives settlement outputs
/// from the last known frame's deltas; a cooperative one doesn't need them.
#[tokio::test]
async fn s7_noncooperative_dispute_finalize_derives_settlement_outputs() {
    let erm_state = Arc::new(ErmState::new());
    let ace_state = Arc::new(xln_ace::AceState::new());
    let jbp_state = Arc::new(JbpState::new());
    let jurisdiction = mock_jurisdiction();
    let a = entity(1);
    let b = entity(2);
    let pair = AccountPair::new(a, b);

    let jbp = JbpService::new(
        erm_state.clone(),
        ace_state.clone(),
        jbp_state,
        jurisdiction,
        Arc::new(Secp256k1Crypto),
        Arc::new(DeterministicKeyStore::new()),
        Box::new(xln_jbp::SystemTimeSource),
        TEST_SEED.to_vec(),
        test_entity_config(),
    );

    {
        let mut machine = ace_state.get_or_open(pair);
        let mut delta = shared_types::Delta::new(USDC);
        delta.collateral = Amount::from(300i64);
        delta.offdelta = Amount::from(-500i64);
        delta.left_credit_limit = Amount::from(1_000i64);
        machine.deltas.insert(USDC, delta);
    }

    jbp.handle_jurisdiction_event(JurisdictionEvent::DisputeFinalized {
        entity_id: a,
        counterparty: b,
        cooperative: false,
    })
    .await
    .unwrap();

    let machine = ace_state.get_or_open(pair);
    assert_eq!(machine.status, AccountStatus::Closed);
    let outputs = machine.settlement_outputs.as_ref().expect("non-cooperative close derives outputs");
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].token, USDC);
    assert_eq!(outputs[0].left_amount, Amount::zero());
    assert_eq!(outputs[0].right_amount, Amount::from(300i64));
}

// Copyright (c) 2024 The Botho Foundation

//! Integration tests for engine validation and gating.
//!
//! These exercise the full validation flow over scripted node surfaces:
//! - the happy path from a fresh engine to dispatching gated actions
//! - a locked node that gets unlocked while the retry schedule runs
//! - retry exhaustion against an unreachable node
//! - lock-state reporting through `validate_node`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ledger_engine::rpc::proto::{
    AddressKind, ChainInfo, GenSeedResponse, GetInfoResponse, NewAddressResponse,
    SendPaymentResponse,
};
use ledger_engine::rpc::{LedgerRpc, WalletUnlockerRpc};
use ledger_engine::{Engine, EngineError, GiveUp, Network, RetryPolicy};
use tonic::{Code, Status};

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn quick_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        base_delay: Duration::from_millis(1),
        multiplier: 1.0,
        give_up: GiveUp::Attempts(attempts),
    }
}

fn mainnet_bitcoin_info() -> GetInfoResponse {
    GetInfoResponse {
        version: "0.19.2".to_string(),
        identity_pubkey: "02deadbeef".to_string(),
        block_height: 830_000,
        synced_to_chain: true,
        chains: vec![ChainInfo {
            chain: "bitcoin".to_string(),
            network: "mainnet".to_string(),
        }],
    }
}

/// A node whose wallet stays locked for a scripted number of status
/// calls, then unlocks. The unlocker surface always answers.
struct UnlockableNode {
    locked_replies_left: AtomicUsize,
    seed_reachable: bool,
}

impl UnlockableNode {
    fn locked_for(calls: usize) -> Self {
        Self {
            locked_replies_left: AtomicUsize::new(calls),
            seed_reachable: true,
        }
    }

    fn permanently_locked_and_unreachable() -> Self {
        Self {
            locked_replies_left: AtomicUsize::new(usize::MAX),
            seed_reachable: false,
        }
    }
}

#[async_trait]
impl WalletUnlockerRpc for UnlockableNode {
    async fn gen_seed(&self) -> Result<GenSeedResponse, Status> {
        if self.seed_reachable {
            Ok(GenSeedResponse::default())
        } else {
            Err(Status::new(Code::Unavailable, "connection refused"))
        }
    }
}

#[async_trait]
impl LedgerRpc for UnlockableNode {
    async fn get_info(&self) -> Result<GetInfoResponse, Status> {
        let still_locked = self
            .locked_replies_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok();

        if still_locked {
            Err(Status::new(Code::Unimplemented, "wallet locked"))
        } else {
            Ok(mainnet_bitcoin_info())
        }
    }

    async fn new_address(&self, _kind: AddressKind) -> Result<NewAddressResponse, Status> {
        Ok(NewAddressResponse {
            address: "3NestedWitnessDepositAddr".to_string(),
        })
    }

    async fn send_payment(&self, _payment_request: &str) -> Result<SendPaymentResponse, Status> {
        Ok(SendPaymentResponse {
            payment_error: String::new(),
            payment_preimage: vec![0xab; 32],
            payment_hash: vec![0xcd; 32],
        })
    }
}

/// A node that never answers anything.
struct DownNode;

#[async_trait]
impl WalletUnlockerRpc for DownNode {
    async fn gen_seed(&self) -> Result<GenSeedResponse, Status> {
        Err(Status::new(Code::DeadlineExceeded, "deadline exceeded"))
    }
}

#[async_trait]
impl LedgerRpc for DownNode {
    async fn get_info(&self) -> Result<GetInfoResponse, Status> {
        Err(Status::new(Code::Unavailable, "connection refused"))
    }

    async fn new_address(&self, _kind: AddressKind) -> Result<NewAddressResponse, Status> {
        Err(Status::new(Code::Unavailable, "connection refused"))
    }

    async fn send_payment(&self, _payment_request: &str) -> Result<SendPaymentResponse, Status> {
        Err(Status::new(Code::Unavailable, "connection refused"))
    }
}

fn engine_on<N>(node: N, attempts: u32) -> Engine
where
    N: LedgerRpc + WalletUnlockerRpc + 'static,
{
    let node = Arc::new(node);
    Engine::from_parts(
        "BTC",
        Network::Mainnet,
        node.clone(),
        node,
        quick_policy(attempts),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fresh_engine_validates_and_dispatches() {
    init_logging();
    let engine = engine_on(UnlockableNode::locked_for(0), 3);

    // Nothing dependent dispatches before validation.
    let err = engine.pay_invoice("lnbc10u1p...").await.unwrap_err();
    assert_eq!(err.to_string(), "BTC Engine is not available");

    engine.validate_engine().await;
    assert!(engine.state().available());
    assert!(engine.state().unlocked());
    assert!(engine.state().validated());

    let address = engine.create_new_address().await.unwrap();
    assert_eq!(address, "3NestedWitnessDepositAddr");
    engine.pay_invoice("lnbc10u1p...").await.unwrap();
}

#[tokio::test]
async fn test_node_unlocked_while_retry_schedule_runs() {
    init_logging();
    // Two validation attempts see a locked wallet before the lock
    // clears: each failed attempt burns one status call.
    let engine = engine_on(UnlockableNode::locked_for(2), 5);

    engine.validate_engine().await;

    assert!(engine.state().available());
    assert!(engine.state().unlocked());
    assert!(engine.state().validated());
}

#[tokio::test]
async fn test_unreachable_node_exhausts_quietly() {
    init_logging();
    let engine = engine_on(DownNode, 2);

    // Exhaustion is logged, not returned; the flags stay down and the
    // gate keeps refusing.
    engine.validate_engine().await;
    assert!(!engine.state().available());

    let err = engine.create_new_address().await.unwrap_err();
    assert_eq!(err.to_string(), "BTC Engine is not available");

    // A later run starts a fresh schedule and can still succeed.
    let engine = engine_on(UnlockableNode::locked_for(0), 2);
    engine.validate_engine().await;
    assert!(engine.state().validated());
}

#[tokio::test]
async fn test_validate_node_reports_lock_state_without_failing() {
    init_logging();
    let engine = engine_on(UnlockableNode::locked_for(usize::MAX - 1), 1);

    // Locked but reachable: resolves cleanly, the flag carries the news.
    let validated = engine.validate_node().await.unwrap();
    assert!(validated);
    assert!(!engine.state().unlocked());
}

#[tokio::test]
async fn test_validate_node_locked_and_unreachable_is_an_error() {
    init_logging();
    let engine = engine_on(UnlockableNode::permanently_locked_and_unreachable(), 1);

    let err = engine.validate_node().await.unwrap_err();
    assert!(matches!(err, EngineError::NodeUnreachable { .. }));
    assert!(err.to_string().contains("bitcoin"));
}

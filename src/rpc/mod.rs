// Copyright (c) 2024 The Botho Foundation

//! Remote surfaces of the node daemon and failure classification.
//!
//! The daemon exposes two gRPC services: the unauthenticated wallet
//! unlocker (serving only the seed call) and the authenticated ledger
//! service (status, addresses, payments). The engine consumes both
//! through the traits here so probes and actions can be exercised
//! against scripted implementations.

mod client;
pub mod proto;

pub use client::{build_channel, load_macaroon, LedgerClient, WalletUnlockerClient};

use async_trait::async_trait;
use tonic::{Code, Status};

use crate::rpc::proto::{
    AddressKind, GenSeedResponse, GetInfoResponse, NewAddressResponse, SendPaymentResponse,
};

/// Unauthenticated unlocker surface. Serves requests regardless of
/// wallet lock state, which makes it the primary reachability probe.
#[async_trait]
pub trait WalletUnlockerRpc: Send + Sync {
    /// Generate a wallet seed. Idempotent and wallet-independent; the
    /// engine only ever looks at whether the call succeeded.
    async fn gen_seed(&self) -> Result<GenSeedResponse, Status>;
}

/// Authenticated ledger surface. Every method requires the wallet to be
/// unlocked; a locked node answers with `Unimplemented`.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    async fn get_info(&self) -> Result<GetInfoResponse, Status>;

    async fn new_address(&self, kind: AddressKind) -> Result<NewAddressResponse, Status>;

    async fn send_payment(&self, payment_request: &str) -> Result<SendPaymentResponse, Status>;
}

/// Classification of a failed remote call, derived from its gRPC status
/// code. The wire values are fixed by the protocol: deadline exceeded is
/// code 4, unimplemented is 12, unavailable is 14.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The call ran out its deadline without an answer (code 4).
    DeadlineExceeded,
    /// The service does not serve this method (code 12). The unlocker
    /// surface reports this on nodes started with seed backup disabled;
    /// the ledger surface reports it while the wallet is locked.
    Unimplemented,
    /// The endpoint could not be reached or refused the call (code 14).
    Unavailable,
    /// Any other failure. Not a connectivity signal.
    Other,
}

/// Classify a failed remote call. Pure function of the status code.
pub fn categorize(status: &Status) -> ErrorCategory {
    match status.code() {
        Code::DeadlineExceeded => ErrorCategory::DeadlineExceeded,
        Code::Unimplemented => ErrorCategory::Unimplemented,
        Code::Unavailable => ErrorCategory::Unavailable,
        _ => ErrorCategory::Other,
    }
}

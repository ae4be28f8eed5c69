// Copyright (c) 2024 The Botho Foundation

//! Engine error taxonomy.

use thiserror::Error;
use tonic::Status;

/// Errors surfaced by the engine.
///
/// Probe operations never produce these; they reduce every remote failure
/// to a boolean. Gate precondition variants are raised synchronously,
/// before any remote call is made.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The node is not reachable, so no request can be served.
    #[error("{symbol} Engine is not available")]
    NotAvailable { symbol: String },

    /// The node's wallet still requires an unlock before requests work.
    #[error("{symbol} Engine is locked")]
    Locked { symbol: String },

    /// The node's configuration has not been confirmed to match ours.
    #[error("{symbol} Engine is not validated")]
    NotValidated { symbol: String },

    /// The node could not be reached while its wallet was locked.
    #[error("unable to reach the {chain} node; check that the {chain} daemon is running and reachable")]
    NodeUnreachable { chain: String },

    /// The node's reported configuration diverges from the engine's.
    #[error("node configuration mismatch: {0}")]
    ConfigMismatch(String),

    /// The requested symbol has no entry in the currency registry.
    #[error("{symbol} is not a valid symbol for this engine")]
    UnknownSymbol { symbol: String },

    /// TLS certificate or macaroon material could not be loaded.
    #[error("failed to load credentials: {0}")]
    Credentials(String),

    /// The gRPC endpoint could not be constructed.
    #[error("transport setup failed: {0}")]
    Transport(String),

    /// The node accepted the payment call but reported a payment failure.
    #[error("payment failed: {0}")]
    Payment(String),

    /// A remote call failed; the status is passed through unchanged.
    #[error("rpc failure: {0}")]
    Rpc(#[from] Status),
}

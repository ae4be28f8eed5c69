// Copyright (c) 2024 The Botho Foundation

//! The engine: per-currency node state and gated operations.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::{currency_for_symbol, CurrencyConfig, Network};
use crate::error::EngineError;
use crate::gate::{
    Action, ActionGate, VALIDATION_DEPENDENT_ACTIONS, VALIDATION_INDEPENDENT_ACTIONS,
};
use crate::probe;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::rpc::proto::AddressKind;
use crate::rpc::{
    build_channel, load_macaroon, LedgerClient, LedgerRpc, WalletUnlockerClient, WalletUnlockerRpc,
};
use crate::validator;

/// The three flags gating dependent operations.
///
/// Readable from anywhere at any time; written only by the validation
/// routines. That single-writer discipline is by convention, not
/// enforcement, so callers must serialize `validate_engine` invocations.
#[derive(Debug, Default)]
pub struct EngineState {
    available: AtomicBool,
    unlocked: AtomicBool,
    validated: AtomicBool,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the node answered a liveness probe.
    pub fn available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Whether the node's wallet is unlocked and serving requests.
    pub fn unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    /// Whether the node's configuration matched the engine's.
    pub fn validated(&self) -> bool {
        self.validated.load(Ordering::SeqCst)
    }

    pub(crate) fn set_available(&self, value: bool) {
        self.available.store(value, Ordering::SeqCst);
    }

    pub(crate) fn set_unlocked(&self, value: bool) {
        self.unlocked.store(value, Ordering::SeqCst);
    }

    pub(crate) fn set_validated(&self, value: bool) {
        self.validated.store(value, Ordering::SeqCst);
    }
}

/// Construction options for [`Engine::new`].
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Network the node is expected to be on.
    pub network: Network,
    /// PEM certificate for the daemon's TLS endpoint. Plaintext when
    /// absent.
    pub tls_cert_path: Option<PathBuf>,
    /// Macaroon authenticating calls to the ledger surface. Calls go
    /// out bare when absent (daemons running with auth disabled).
    pub macaroon_path: Option<PathBuf>,
    /// Backoff schedule for `validate_engine`.
    pub retry_policy: RetryPolicy,
}

/// Client-side interface to one currency's node daemon.
///
/// All remote access flows through here. Operations classified as
/// validation-dependent refuse to dispatch until a `validate_engine`
/// run has confirmed the node is reachable, unlocked, and configured
/// for the engine's chain and network.
pub struct Engine {
    currency: &'static CurrencyConfig,
    network: Network,
    ledger: Arc<dyn LedgerRpc>,
    unlocker: Arc<dyn WalletUnlockerRpc>,
    state: EngineState,
    gate: ActionGate,
    retry_policy: RetryPolicy,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("currency", &self.currency)
            .field("network", &self.network)
            .field("state", &self.state)
            .field("gate", &self.gate)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Connect to the daemon at `host` (a `host:port` address) for the
    /// given ticker symbol.
    ///
    /// The channel is lazy; this never blocks on the network. Fails on
    /// an unknown symbol or unreadable credential material.
    pub fn new(host: &str, symbol: &str, options: EngineOptions) -> Result<Self, EngineError> {
        if host.is_empty() {
            return Err(EngineError::Transport(
                "host is required for engine initialization".to_string(),
            ));
        }

        let tls_cert = options
            .tls_cert_path
            .as_deref()
            .map(|path| {
                std::fs::read(path).map_err(|e| {
                    EngineError::Credentials(format!(
                        "failed to read TLS certificate {}: {e}",
                        path.display()
                    ))
                })
            })
            .transpose()?;
        let macaroon = options
            .macaroon_path
            .as_deref()
            .map(load_macaroon)
            .transpose()?;

        let channel = build_channel(host, tls_cert.as_deref())?;
        let ledger = Arc::new(LedgerClient::new(channel.clone(), macaroon));
        let unlocker = Arc::new(WalletUnlockerClient::new(channel));

        Self::from_parts(symbol, options.network, ledger, unlocker, options.retry_policy)
    }

    /// Assemble an engine from pre-built surface implementations.
    /// Used by tests and by callers bringing their own transport.
    pub fn from_parts(
        symbol: &str,
        network: Network,
        ledger: Arc<dyn LedgerRpc>,
        unlocker: Arc<dyn WalletUnlockerRpc>,
        retry_policy: RetryPolicy,
    ) -> Result<Self, EngineError> {
        let currency = currency_for_symbol(symbol).ok_or_else(|| EngineError::UnknownSymbol {
            symbol: symbol.to_string(),
        })?;

        Ok(Self {
            currency,
            network,
            ledger,
            unlocker,
            state: EngineState::new(),
            gate: ActionGate::new(
                currency.symbol,
                VALIDATION_DEPENDENT_ACTIONS,
                VALIDATION_INDEPENDENT_ACTIONS,
            ),
            retry_policy,
        })
    }

    pub fn symbol(&self) -> &'static str {
        self.currency.symbol
    }

    pub fn chain_name(&self) -> &'static str {
        self.currency.chain_name
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The engine's state flags.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Whether the node is reachable at all. Never errors.
    pub async fn is_available(&self) -> bool {
        // Infallible by construction, but keep every exposed operation
        // going through the registry.
        let _ = self.gate.check(Action::IsAvailable, &self.state);
        probe::is_available(self.unlocker.as_ref(), self.ledger.as_ref()).await
    }

    /// Probe the node's lock state and, when unlocked, validate its
    /// configuration.
    ///
    /// Records the lock probe's result into the engine state. On a
    /// locked node the unlocker surface is probed once more: if it
    /// answers, the node is fine and merely locked (reported through
    /// the `unlocked` flag); if it does not, the node is unreachable
    /// and that is the error returned.
    pub async fn validate_node(&self) -> Result<bool, EngineError> {
        self.gate.check(Action::ValidateNode, &self.state)?;

        let unlocked = probe::is_unlocked(self.ledger.as_ref()).await;
        self.state.set_unlocked(unlocked);

        if !unlocked {
            return match self.unlocker.gen_seed().await {
                Ok(_) => Ok(true),
                Err(status) => {
                    error!(
                        symbol = self.currency.symbol,
                        error = %status,
                        "node did not answer while its wallet is locked"
                    );
                    Err(EngineError::NodeUnreachable {
                        chain: self.currency.chain_name.to_string(),
                    })
                }
            };
        }

        validator::is_node_config_valid(self.ledger.as_ref(), self.currency, self.network).await
    }

    /// Validate and record the engine's state, retrying with backoff.
    ///
    /// Never errors: exhaustion of the retry schedule is logged and the
    /// flags keep their last observed values. Calling again starts a
    /// fresh schedule. Not safe to run concurrently with itself;
    /// callers serialize.
    pub async fn validate_engine(&self) {
        let _ = self.gate.check(Action::ValidateEngine, &self.state);

        let result = retry_with_backoff(
            || self.validation_attempt(),
            &self.retry_policy,
            |error, attempt| {
                debug!(
                    symbol = self.currency.symbol,
                    attempt,
                    %error,
                    "engine failed to validate, retrying"
                );
            },
        )
        .await;

        match result {
            Ok(()) => info!(
                symbol = self.currency.symbol,
                "validated engine configuration"
            ),
            Err(exhausted) => error!(
                symbol = self.currency.symbol,
                attempts = exhausted.attempts,
                error = %exhausted.last_error,
                "failed to validate engine"
            ),
        }
    }

    /// One validation pass: availability, then lock state, then node
    /// configuration. Each result is recorded as soon as it is known so
    /// the flags reflect the furthest point reached even when an
    /// attempt fails partway.
    async fn validation_attempt(&self) -> Result<(), EngineError> {
        let available = probe::is_available(self.unlocker.as_ref(), self.ledger.as_ref()).await;
        self.state.set_available(available);
        if !available {
            return Err(EngineError::NotAvailable {
                symbol: self.currency.symbol.to_string(),
            });
        }

        // A locked wallet is retryable: an operator may unlock the node
        // while this schedule is still running.
        let unlocked = probe::is_unlocked(self.ledger.as_ref()).await;
        self.state.set_unlocked(unlocked);
        if !unlocked {
            return Err(EngineError::Locked {
                symbol: self.currency.symbol.to_string(),
            });
        }

        let validated =
            validator::is_node_config_valid(self.ledger.as_ref(), self.currency, self.network)
                .await?;
        self.state.set_validated(validated);
        Ok(())
    }

    /// Derive a fresh nested-witness deposit address.
    pub async fn create_new_address(&self) -> Result<String, EngineError> {
        self.gate.check(Action::CreateNewAddress, &self.state)?;

        let response = self.ledger.new_address(AddressKind::NestedPubkeyHash).await?;
        Ok(response.address)
    }

    /// Pay the invoice described by `payment_request`.
    pub async fn pay_invoice(&self, payment_request: &str) -> Result<(), EngineError> {
        self.gate.check(Action::PayInvoice, &self.state)?;

        let response = self.ledger.send_payment(payment_request).await?;
        if !response.payment_error.is_empty() {
            error!(
                symbol = self.currency.symbol,
                payment_request, "failed to pay invoice"
            );
            return Err(EngineError::Payment(response.payment_error));
        }

        debug!(symbol = self.currency.symbol, "payment successfully made");
        Ok(())
    }
}

// Copyright (c) 2024 The Botho Foundation

//! Liveness and lock-state probes.
//!
//! Both probes reduce every remote failure to a boolean; connectivity
//! questions are answered here so the rest of the engine never has to
//! interpret a status code.

use tracing::debug;

use crate::rpc::{categorize, ErrorCategory, LedgerRpc, WalletUnlockerRpc};

/// Intermediate result of the primary liveness probe. Never escapes this
/// module; the public operations resolve it to a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeOutcome {
    Reachable,
    Unreachable,
    Indeterminate,
}

/// Tier 1: the seed call on the unlocker surface. In production that
/// surface always answers, so most outcomes are decisive. A node started
/// with seed backup disabled serves no unlocker methods and reports
/// `Unimplemented`; an `Unavailable` can mean the endpoint is still
/// coming up. Both leave the question open for tier 2.
async fn primary_probe(unlocker: &dyn WalletUnlockerRpc) -> ProbeOutcome {
    match unlocker.gen_seed().await {
        Ok(_) => ProbeOutcome::Reachable,
        Err(status) => match categorize(&status) {
            ErrorCategory::DeadlineExceeded => ProbeOutcome::Unreachable,
            ErrorCategory::Unavailable | ErrorCategory::Unimplemented => {
                ProbeOutcome::Indeterminate
            }
            // The node answered with a failure unrelated to connectivity.
            // Whoever triggers the real call will surface it.
            ErrorCategory::Other => ProbeOutcome::Reachable,
        },
    }
}

/// Tier 2: the status call on the ledger surface. False iff the failure
/// category is `Unavailable` or `DeadlineExceeded`.
async fn secondary_probe(ledger: &dyn LedgerRpc) -> bool {
    match ledger.get_info().await {
        Ok(_) => true,
        Err(status) => !matches!(
            categorize(&status),
            ErrorCategory::Unavailable | ErrorCategory::DeadlineExceeded
        ),
    }
}

/// Whether the node is reachable at all. Never errors.
pub(crate) async fn is_available(
    unlocker: &dyn WalletUnlockerRpc,
    ledger: &dyn LedgerRpc,
) -> bool {
    match primary_probe(unlocker).await {
        ProbeOutcome::Reachable => true,
        ProbeOutcome::Unreachable => false,
        ProbeOutcome::Indeterminate => {
            debug!("seed call was inconclusive, probing the ledger surface");
            secondary_probe(ledger).await
        }
    }
}

/// Whether the node's wallet is unlocked and serving the ledger surface.
/// Never errors. Only `Unimplemented` means locked; any other failure is
/// not a lock issue, and a genuine connectivity problem is the
/// availability probe's to report.
pub(crate) async fn is_unlocked(ledger: &dyn LedgerRpc) -> bool {
    match ledger.get_info().await {
        Ok(_) => true,
        Err(status) => !matches!(categorize(&status), ErrorCategory::Unimplemented),
    }
}

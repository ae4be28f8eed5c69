// Copyright (c) 2024 The Botho Foundation

//! Node configuration validation.

use tracing::debug;

use crate::config::{CurrencyConfig, Network};
use crate::error::EngineError;
use crate::rpc::LedgerRpc;

/// Check that the node is serving the chain and network this engine was
/// constructed for.
///
/// Requires the wallet to be unlocked; the caller is responsible for
/// sequencing this after the lock probe. A status-call failure is passed
/// through unchanged, a diverging report is a `ConfigMismatch` naming
/// what differed.
pub(crate) async fn is_node_config_valid(
    ledger: &dyn LedgerRpc,
    currency: &CurrencyConfig,
    network: Network,
) -> Result<bool, EngineError> {
    let info = ledger.get_info().await?;

    if info.chains.len() != 1 {
        return Err(EngineError::ConfigMismatch(format!(
            "node reports {} active chains, expected exactly one",
            info.chains.len()
        )));
    }

    let chain = &info.chains[0];
    if chain.chain != currency.chain_name {
        return Err(EngineError::ConfigMismatch(format!(
            "node is serving the {} chain, engine is configured for {}",
            chain.chain, currency.chain_name
        )));
    }

    if chain.network != network.as_str() {
        return Err(EngineError::ConfigMismatch(format!(
            "node is on {}, engine expects {}",
            chain.network, network
        )));
    }

    debug!(
        chain = currency.chain_name,
        network = network.as_str(),
        version = %info.version,
        "node configuration matches"
    );
    Ok(true)
}

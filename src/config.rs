// Copyright (c) 2024 The Botho Foundation

//! Static currency registry and network identifiers.

use serde::{Deserialize, Serialize};

/// Per-currency settings for a supported ledger daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyConfig {
    /// Ticker symbol the engine is addressed by (e.g. `BTC`).
    pub symbol: &'static str,
    /// Chain name the node daemon reports for this currency.
    pub chain_name: &'static str,
}

/// Currencies an engine can be constructed for.
pub const CURRENCIES: &[CurrencyConfig] = &[
    CurrencyConfig {
        symbol: "BTC",
        chain_name: "bitcoin",
    },
    CurrencyConfig {
        symbol: "LTC",
        chain_name: "litecoin",
    },
];

/// Look up the registry entry for a ticker symbol.
pub fn currency_for_symbol(symbol: &str) -> Option<&'static CurrencyConfig> {
    CURRENCIES.iter().find(|config| config.symbol == symbol)
}

/// Network a node daemon is expected to be running on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
    Simnet,
}

impl Network {
    /// Name the node daemon reports for this network.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
            Network::Simnet => "simnet",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            "simnet" => Ok(Network::Simnet),
            _ => Err(format!("Unknown network: {}", s)),
        }
    }
}

// Copyright (c) 2024 The Botho Foundation

//! Client-side validation and gating for a ledger node daemon.
//!
//! An [`Engine`] fronts one currency's node over gRPC and answers three
//! questions before letting anything expensive through: is the node
//! reachable, is its wallet unlocked, and is it serving the chain and
//! network the caller expects. `validate_engine` probes all three with
//! exponential backoff and records the answers as flags; operations
//! registered as validation-dependent (payments, address derivation)
//! are refused until every flag is true.
//!
//! Liveness is inferred in two tiers. The unauthenticated unlocker
//! surface is probed first since it answers regardless of wallet state;
//! when a node runs in a development mode that disables that surface,
//! the authenticated status call settles the question instead. Probe
//! operations never fail, they only report booleans.

mod config;
mod engine;
mod error;
mod gate;
mod probe;
mod retry;
pub mod rpc;
mod validator;

pub use crate::{
    config::{currency_for_symbol, CurrencyConfig, Network, CURRENCIES},
    engine::{Engine, EngineOptions, EngineState},
    error::EngineError,
    gate::{Action, ActionGate, VALIDATION_DEPENDENT_ACTIONS, VALIDATION_INDEPENDENT_ACTIONS},
    retry::{retry_with_backoff, GiveUp, RetryExhausted, RetryPolicy},
};

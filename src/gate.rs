// Copyright (c) 2024 The Botho Foundation

//! Dispatch gate for externally exposed engine operations.
//!
//! Every operation the engine exposes is registered here at construction
//! as validation-dependent or validation-independent. Dependent
//! operations are refused until the engine's state flags are all true;
//! independent operations (the probes among them, so probing can never
//! gate itself) pass straight through.

use std::collections::HashMap;

use crate::engine::EngineState;
use crate::error::EngineError;

/// Identifier for an externally exposed engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateNewAddress,
    PayInvoice,
    IsAvailable,
    ValidateNode,
    ValidateEngine,
}

/// Operations that must not touch the network before the engine has
/// fully validated against its node.
pub const VALIDATION_DEPENDENT_ACTIONS: &[Action] =
    &[Action::CreateNewAddress, Action::PayInvoice];

/// Operations that are safe in any engine state.
pub const VALIDATION_INDEPENDENT_ACTIONS: &[Action] = &[
    Action::IsAvailable,
    Action::ValidateNode,
    Action::ValidateEngine,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    ValidationDependent,
    ValidationIndependent,
}

/// Registry of operation classifications, consulted before dispatch.
#[derive(Debug)]
pub struct ActionGate {
    symbol: String,
    registry: HashMap<Action, ActionKind>,
}

impl ActionGate {
    /// Build the registry from the two classification lists. `symbol`
    /// names the engine in precondition errors.
    pub fn new(symbol: impl Into<String>, dependent: &[Action], independent: &[Action]) -> Self {
        let mut registry = HashMap::new();
        for action in dependent {
            registry.insert(*action, ActionKind::ValidationDependent);
        }
        for action in independent {
            registry.insert(*action, ActionKind::ValidationIndependent);
        }
        Self {
            symbol: symbol.into(),
            registry,
        }
    }

    /// Check the flags a dependent operation requires, in priority
    /// order: availability, then lock state, then validation. The first
    /// unmet precondition is the one reported.
    pub fn check(&self, action: Action, state: &EngineState) -> Result<(), EngineError> {
        match self.registry.get(&action) {
            Some(ActionKind::ValidationDependent) => {
                if !state.available() {
                    return Err(EngineError::NotAvailable {
                        symbol: self.symbol.clone(),
                    });
                }
                if !state.unlocked() {
                    return Err(EngineError::Locked {
                        symbol: self.symbol.clone(),
                    });
                }
                if !state.validated() {
                    return Err(EngineError::NotValidated {
                        symbol: self.symbol.clone(),
                    });
                }
                Ok(())
            }
            Some(ActionKind::ValidationIndependent) | None => Ok(()),
        }
    }
}

//! # Authorization Component
//!
//! One [`Authority`] instance is shared (via `Arc`) by both token ledgers
//! and the vault. It owns two pieces of privileged state:
//!
//! - the **administrator** identity, fixed at construction and reassignable
//!   only by the current administrator;
//! - the **authorized agent set** — identities permitted to move custody
//!   funds on any user's behalf, within that user's spending policy.
//!
//! Keeping this in an explicit injected component (instead of ambient
//! statics inside each ledger) lets tests swap in a fresh `Authority`
//! without touching ledger internals.

use std::collections::HashSet;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;

/// Errors produced by privilege checks.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The caller lacks the privilege required for this operation.
    #[error("not authorized: {caller} may not perform {operation}")]
    NotAuthorized {
        /// The identity that attempted the operation.
        caller: AccountId,
        /// Short name of the privileged operation, for log context.
        operation: &'static str,
    },
}

/// Shared administrator identity and agent registry.
///
/// Interior locking (`parking_lot::RwLock`) so that read-mostly privilege
/// checks never contend with each other.
#[derive(Debug)]
pub struct Authority {
    admin: RwLock<AccountId>,
    agents: RwLock<HashSet<AccountId>>,
}

impl Authority {
    /// Creates an authority with the given administrator and no agents.
    pub fn new(admin: AccountId) -> Self {
        Self {
            admin: RwLock::new(admin),
            agents: RwLock::new(HashSet::new()),
        }
    }

    /// Returns the current administrator identity.
    pub fn admin(&self) -> AccountId {
        self.admin.read().clone()
    }

    /// Returns `true` if `caller` is the administrator.
    pub fn is_admin(&self, caller: &AccountId) -> bool {
        *self.admin.read() == *caller
    }

    /// Fails with [`AuthError::NotAuthorized`] unless `caller` is the
    /// administrator.
    pub fn require_admin(
        &self,
        caller: &AccountId,
        operation: &'static str,
    ) -> Result<(), AuthError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(AuthError::NotAuthorized {
                caller: caller.clone(),
                operation,
            })
        }
    }

    /// Reassigns the administrator identity. Admin only.
    pub fn set_admin(&self, caller: &AccountId, new_admin: AccountId) -> Result<(), AuthError> {
        self.require_admin(caller, "set_admin")?;
        *self.admin.write() = new_admin;
        Ok(())
    }

    /// Returns `true` if `caller` is in the authorized agent set.
    pub fn is_agent(&self, caller: &AccountId) -> bool {
        self.agents.read().contains(caller)
    }

    /// Returns `true` if `caller` may invoke agent-gated operations:
    /// authorized agents and the administrator both qualify.
    pub fn is_agent_or_admin(&self, caller: &AccountId) -> bool {
        self.is_agent(caller) || self.is_admin(caller)
    }

    /// Fails with [`AuthError::NotAuthorized`] unless `caller` is an
    /// authorized agent or the administrator.
    pub fn require_agent_or_admin(
        &self,
        caller: &AccountId,
        operation: &'static str,
    ) -> Result<(), AuthError> {
        if self.is_agent_or_admin(caller) {
            Ok(())
        } else {
            Err(AuthError::NotAuthorized {
                caller: caller.clone(),
                operation,
            })
        }
    }

    /// Adds or removes an identity from the authorized agent set.
    /// Admin only. Returns the previous membership state.
    pub fn set_agent(
        &self,
        caller: &AccountId,
        agent: AccountId,
        authorized: bool,
    ) -> Result<bool, AuthError> {
        self.require_admin(caller, "set_agent")?;
        let mut agents = self.agents.write();
        let was = if authorized {
            !agents.insert(agent)
        } else {
            agents.remove(&agent)
        };
        Ok(was)
    }

    /// Returns a snapshot of the authorized agent set.
    pub fn agents(&self) -> AgentSet {
        AgentSet {
            agents: self.agents.read().iter().cloned().collect(),
        }
    }
}

/// Serializable snapshot of the agent registry, for monitoring endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentSet {
    /// The authorized agent identities at snapshot time.
    pub agents: Vec<AccountId>,
}

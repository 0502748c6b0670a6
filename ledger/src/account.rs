//! # Account Identity
//!
//! Every participant in AURIC — end users, the payment agent, merchants,
//! the administrator, and the vault's own custody account — is identified
//! by an [`AccountId`]. The ledger does not care how the identity was
//! derived (keypair, DID, phone number hash); it only requires that the
//! string is stable and unique. Signature verification belongs to the
//! outer transport layer, not to this core.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque, stable identity string.
///
/// By convention AURIC addresses look like `auric:<hex>`, but the ledger
/// treats the content as opaque. Cheap to clone, hashable, ordered — it is
/// used as the key of every per-owner map in the system.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

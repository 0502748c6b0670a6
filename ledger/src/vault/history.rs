//! # Payment History
//!
//! Append-only trail of every payment the agent has executed. Records are
//! never mutated or deleted — the history is the audit surface the outer
//! layers (chat agent, UI) read back to the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::AccountId;
use crate::config::Amount;
use crate::token::AssetKind;

/// One executed payment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// The user whose custody balance was debited.
    pub payer: AccountId,
    /// The merchant that was paid.
    pub merchant: AccountId,
    /// Amount paid, in smallest units.
    pub amount: Amount,
    /// The asset the payment was made in.
    pub asset: AssetKind,
    /// Free-form memo supplied by the agent (length-capped).
    pub memo: String,
    /// When the payment executed.
    pub timestamp: DateTime<Utc>,
}

/// The vault's append-only payment sequence.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PaymentHistory {
    records: Vec<PaymentRecord>,
}

impl PaymentHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no payments have executed yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record. Insertion order is execution order.
    pub fn append(&mut self, record: PaymentRecord) {
        self.records.push(record);
    }

    /// Returns the record at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&PaymentRecord> {
        self.records.get(index)
    }

    /// Iterates records in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &PaymentRecord> {
        self.records.iter()
    }
}

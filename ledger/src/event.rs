//! # Observability Events
//!
//! Every state change in either ledger emits a typed [`Event`]. Events are
//! appended to a shared in-memory [`EventLog`] and mirrored to `tracing`
//! with structured fields so off-core monitoring can subscribe either way.
//!
//! Events are observability output only — no ledger logic reads them back.
//! The authoritative payment trail is the vault's payment history, which is
//! part of ledger state proper.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::account::AccountId;
use crate::config::Amount;
use crate::token::AssetKind;

/// A state-change notification emitted by the ledgers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Privileged issuance credited new supply to an owner.
    Issued {
        asset: AssetKind,
        owner: AccountId,
        amount: Amount,
    },
    /// An owner burned part of their own balance.
    Burned {
        asset: AssetKind,
        owner: AccountId,
        amount: Amount,
    },
    /// A faucet claim minted the fixed per-asset amount.
    FaucetClaimed {
        asset: AssetKind,
        owner: AccountId,
        amount: Amount,
    },
    /// Accrued yield was claimed and minted.
    YieldClaimed {
        asset: AssetKind,
        owner: AccountId,
        amount: Amount,
    },
    /// A balance moved between two owners.
    Transferred {
        asset: AssetKind,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },
    /// The administrator updated an asset's reference price.
    PriceUpdated { asset: AssetKind, price: Amount },
    /// The administrator changed the bond maturity period (seconds).
    MaturityPeriodChanged { asset: AssetKind, period_secs: u64 },
    /// A user moved funds into vault custody.
    Deposited {
        user: AccountId,
        asset: AssetKind,
        amount: Amount,
    },
    /// A user moved funds out of vault custody.
    Withdrawn {
        user: AccountId,
        asset: AssetKind,
        amount: Amount,
    },
    /// An agent executed a merchant payment from a user's custody.
    PaymentExecuted {
        agent: AccountId,
        user: AccountId,
        merchant: AccountId,
        asset: AssetKind,
        amount: Amount,
    },
    /// An agent harvested yield into a user's portfolio.
    YieldHarvested {
        agent: AccountId,
        user: AccountId,
        gold_amount: Amount,
        bond_amount: Amount,
        compounded: bool,
    },
    /// A user set their spending allowance.
    AllowanceSet { user: AccountId, amount: Amount },
    /// A user toggled invisible mode.
    InvisibleModeToggled { user: AccountId, enabled: bool },
    /// A user toggled auto-compound.
    AutoCompoundToggled { user: AccountId, enabled: bool },
    /// The administrator changed an identity's agent authorization.
    AgentAuthorizationChanged { agent: AccountId, authorized: bool },
}

impl Event {
    /// Short tag for log lines and monitoring dashboards.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Issued { .. } => "issued",
            Event::Burned { .. } => "burned",
            Event::FaucetClaimed { .. } => "faucet_claimed",
            Event::YieldClaimed { .. } => "yield_claimed",
            Event::Transferred { .. } => "transferred",
            Event::PriceUpdated { .. } => "price_updated",
            Event::MaturityPeriodChanged { .. } => "maturity_period_changed",
            Event::Deposited { .. } => "deposited",
            Event::Withdrawn { .. } => "withdrawn",
            Event::PaymentExecuted { .. } => "payment_executed",
            Event::YieldHarvested { .. } => "yield_harvested",
            Event::AllowanceSet { .. } => "allowance_set",
            Event::InvisibleModeToggled { .. } => "invisible_mode_toggled",
            Event::AutoCompoundToggled { .. } => "auto_compound_toggled",
            Event::AgentAuthorizationChanged { .. } => "agent_authorization_changed",
        }
    }
}

/// A recorded event with its emission timestamp.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventEntry {
    /// When the event was recorded.
    pub at: DateTime<Utc>,
    /// The event payload.
    pub event: Event,
}

/// Shared append-only event sink.
///
/// Held as an `Arc<EventLog>` by both token ledgers and the vault. Append
/// is cheap (one short write-lock); reads snapshot so monitoring never
/// holds the lock across its own processing.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: RwLock<Vec<EventEntry>>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event at the given instant and mirrors it to `tracing`.
    pub fn record(&self, at: DateTime<Utc>, event: Event) {
        info!(kind = event.kind(), detail = ?event, "ledger event");
        self.entries.write().push(EventEntry { at, event });
    }

    /// Number of events recorded so far.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns a copy of every recorded entry.
    pub fn snapshot(&self) -> Vec<EventEntry> {
        self.entries.read().clone()
    }
}

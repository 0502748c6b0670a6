//! # User Portfolio
//!
//! One [`Portfolio`] per user, owned exclusively by the vault ledger. It
//! records how much of each asset the vault custodies for the user, the
//! spending policy the agent operates under, and cumulative totals for
//! display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Amount;
use crate::token::AssetKind;

/// A user's custody record inside the vault.
///
/// Policy fields:
/// - `spending_allowance` — the maximum single payment the agent may
///   execute without per-transaction confirmation;
/// - `invisible_mode` — permits agent payments at or below the global
///   small-value threshold even beyond the explicit allowance;
/// - `auto_compound` — harvested yield is re-invested into custody
///   balances instead of being credited externally.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Portfolio {
    /// Custodied gold balance in smallest units.
    pub gold_balance: Amount,
    /// Custodied bond balance in smallest units.
    pub bond_balance: Amount,
    /// Agent spending allowance in smallest units.
    pub spending_allowance: Amount,
    /// Lifetime total deposited into custody, across both assets.
    pub total_deposited: Amount,
    /// Lifetime total yield harvested for this user, across both assets.
    pub total_yield_earned: Amount,
    /// Re-invest harvested yield instead of crediting it externally.
    pub auto_compound: bool,
    /// Allow sub-threshold agent payments beyond the allowance.
    pub invisible_mode: bool,
    /// When this portfolio was first created.
    pub created_at: DateTime<Utc>,
}

impl Portfolio {
    /// Creates an empty portfolio. Allowance starts at zero and both
    /// policy flags start disabled — the agent can do nothing until the
    /// user opts in.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            gold_balance: 0,
            bond_balance: 0,
            spending_allowance: 0,
            total_deposited: 0,
            total_yield_earned: 0,
            auto_compound: false,
            invisible_mode: false,
            created_at,
        }
    }

    /// Custody balance for one asset.
    pub fn balance_of(&self, kind: AssetKind) -> Amount {
        match kind {
            AssetKind::Gold => self.gold_balance,
            AssetKind::Bond => self.bond_balance,
        }
    }

    /// Mutable custody balance for one asset.
    pub(crate) fn balance_mut(&mut self, kind: AssetKind) -> &mut Amount {
        match kind {
            AssetKind::Gold => &mut self.gold_balance,
            AssetKind::Bond => &mut self.bond_balance,
        }
    }

    /// Returns `true` if no funds are custodied for this user.
    pub fn is_empty(&self) -> bool {
        self.gold_balance == 0 && self.bond_balance == 0
    }
}

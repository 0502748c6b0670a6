//! # Asset Classes & Parameters
//!
//! The two demo assets share one ledger design and differ only in their
//! parameters: how much the faucet mints, how fast yield accrues, and how
//! a USD value is derived. [`AssetParams::gold`] and [`AssetParams::bond`]
//! build the canonical configurations from the constants in
//! [`crate::config`]; tests construct bespoke parameter sets directly.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{
    Amount, BOND_FACE_VALUE_USD, BOND_FAUCET_AMOUNT, BOND_YIELD_RATE_BPS, DECIMALS,
    DEFAULT_BOND_MATURITY, DEFAULT_GOLD_PRICE_USD, FAUCET_COOLDOWN, GOLD_FAUCET_AMOUNT,
    GOLD_YIELD_RATE_BPS,
};

/// The two asset classes the protocol issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Metal-like asset: oracle-priced, smaller faucet claims.
    Gold,
    /// Bond-like asset: fixed face value, advisory maturity schedule.
    Bond,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Gold => write!(f, "gold"),
            AssetKind::Bond => write!(f, "bond"),
        }
    }
}

/// How an asset's USD-equivalent value is derived.
///
/// Purely for display — the ledger never trades on these numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pricing {
    /// Administrator-settable reference price per whole token.
    Oracle {
        /// The price at ledger construction, USD scaled by 10^18.
        initial_price: Amount,
    },
    /// Fixed face value per whole token; not administrator-settable.
    FaceValue {
        /// Face value in USD scaled by 10^18.
        face_value: Amount,
    },
}

/// Complete configuration for one accrual ledger instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetParams {
    /// Which asset class this ledger tracks.
    pub kind: AssetKind,
    /// Human-readable asset name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Implied decimal places. 18 for every AURIC asset.
    pub decimals: u8,
    /// Amount minted per successful faucet claim.
    pub faucet_amount: Amount,
    /// Minimum time between faucet claims by one owner.
    pub faucet_cooldown: Duration,
    /// Yield rate in basis points per accrual hour. 1 bp = 0.01%.
    pub yield_rate_bps: u32,
    /// USD valuation model.
    pub pricing: Pricing,
    /// Time from an owner's deposit epoch until maturity, when the asset
    /// has a maturity schedule at all. Informational only.
    pub maturity_period: Option<Duration>,
}

impl AssetParams {
    /// Canonical parameters for the gold asset.
    pub fn gold() -> Self {
        Self {
            kind: AssetKind::Gold,
            name: "AURIC Gold".to_string(),
            symbol: "vGOLD".to_string(),
            decimals: DECIMALS,
            faucet_amount: GOLD_FAUCET_AMOUNT,
            faucet_cooldown: FAUCET_COOLDOWN,
            yield_rate_bps: GOLD_YIELD_RATE_BPS,
            pricing: Pricing::Oracle {
                initial_price: DEFAULT_GOLD_PRICE_USD,
            },
            maturity_period: None,
        }
    }

    /// Canonical parameters for the bond asset.
    pub fn bond() -> Self {
        Self {
            kind: AssetKind::Bond,
            name: "AURIC Treasury Bond".to_string(),
            symbol: "vBOND".to_string(),
            decimals: DECIMALS,
            faucet_amount: BOND_FAUCET_AMOUNT,
            faucet_cooldown: FAUCET_COOLDOWN,
            yield_rate_bps: BOND_YIELD_RATE_BPS,
            pricing: Pricing::FaceValue {
                face_value: BOND_FACE_VALUE_USD,
            },
            maturity_period: Some(DEFAULT_BOND_MATURITY),
        }
    }
}

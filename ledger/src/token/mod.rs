//! # Token Module — Accrual Token Ledgers
//!
//! AURIC issues two fungible demo assets from one ledger design:
//!
//! ```text
//! params.rs — asset classes, pricing models, per-asset parameters
//! ledger.rs — the accrual ledger: balances, faucet, yield, transfers
//! ```
//!
//! Each asset gets its own [`AccrualTokenLedger`] instance. An instance
//! exclusively owns its balance and timestamp maps; the vault holds shared
//! references for transfer calls but never reaches into this state
//! directly.
//!
//! All amounts are `u128` fixed point with 18 implied decimals. Arithmetic
//! is checked everywhere — overflow is a rejected operation, not a wrap.

pub mod ledger;
pub mod params;

pub use ledger::{AccrualTokenLedger, TokenError};
pub use params::{AssetKind, AssetParams, Pricing};

//! # Vault Module — Custody, Policy & Agent Payments
//!
//! The vault is where delegated spending happens. Users move token-ledger
//! balances into vault custody; a policy-bounded automated agent can then
//! execute merchant payments on their behalf without per-transaction
//! confirmation.
//!
//! ```text
//! portfolio.rs — per-user custody record: balances, allowance, policy flags
//! history.rs   — append-only payment trail
//! ledger.rs    — the vault ledger: deposits, withdrawals, payments, harvest
//! ```
//!
//! Custody balances are disjoint from the token ledgers' own per-owner
//! balances: depositing moves funds from the user's token-ledger account
//! into the vault's custody account, and the portfolio records who they
//! belong to.

pub mod history;
pub mod ledger;
pub mod portfolio;

pub use history::{PaymentHistory, PaymentRecord};
pub use ledger::{VaultLedger, VaultError};
pub use portfolio::Portfolio;

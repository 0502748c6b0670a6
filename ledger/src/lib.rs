// Copyright (c) 2026 Auric Labs. MIT License.
// See LICENSE for details.

//! # AURIC Ledger — Core Library
//!
//! AURIC is an agent-custody ledger for tokenized real-world assets. Two
//! accrual token ledgers model the assets themselves — a metal-style gold
//! token priced by reference, and a fixed-face-value treasury bond — and a
//! vault ledger custodies them so a policy-bounded automated agent can
//! spend on the user's behalf without per-transaction confirmation.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of a
//! custodial ledger:
//!
//! - **account** — Opaque account identities. The ledger doesn't do auth,
//!   it does authorization.
//! - **auth** — The shared administrator/agent registry. One instance,
//!   every component.
//! - **clock** — Time as a capability. Accrual math is only trustworthy
//!   if tests can control the clock.
//! - **config** — Protocol constants. Amounts are unsigned 18-decimal
//!   fixed-point; overflow is an error, never a wrap.
//! - **event** — The shared append-only event log, mirrored to `tracing`.
//! - **guard** — Per-component reentrancy guards. Nested mutating calls
//!   fail fast instead of corrupting state.
//! - **token** — The accrual token ledgers: faucet, time-proportional
//!   yield, transfers, pricing, maturity.
//! - **vault** — Custody portfolios, spending policy, agent payments,
//!   harvest, payment history.
//!
//! ## Design principles
//!
//! 1. **Validate, then commit.** Every operation computes all prospective
//!    values with checked arithmetic before the first write. A failing
//!    operation leaves every ledger exactly as it found it.
//! 2. **Structured errors.** Each component has its own `thiserror` enum;
//!    variants carry the numbers a caller needs to explain the failure.
//! 3. **Capabilities over globals.** Clock, authority, and event log are
//!    injected `Arc`s, so components compose and tests stay deterministic.

pub mod account;
pub mod auth;
pub mod clock;
pub mod config;
pub mod event;
pub mod guard;
pub mod token;
pub mod vault;

pub use account::AccountId;
pub use auth::{AuthError, Authority};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Amount, DECIMALS, SCALE};
pub use event::{Event, EventEntry, EventLog};
pub use guard::ReentrancyGuard;
pub use token::{AccrualTokenLedger, AssetKind, AssetParams, Pricing, TokenError};
pub use vault::{PaymentHistory, PaymentRecord, Portfolio, VaultError, VaultLedger};

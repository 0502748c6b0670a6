//! # Accrual Token Ledger
//!
//! One [`AccrualTokenLedger`] instance per asset. It owns the per-owner
//! balance map, the faucet claim log, the deposit-epoch map that seeds
//! yield accrual, and the supply counters. Yield is never stored — it is
//! recomputed from balance, rate, and elapsed time on every read, and only
//! materializes as balance when claimed.
//!
//! ## Failure semantics
//!
//! Every validation is a precondition checked before any state mutation.
//! A failing call leaves the ledger exactly as it found it. Operations
//! that mutate more than one balance acquire the instance's reentrancy
//! guard first, so an outbound call can never re-enter a half-applied
//! mutation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::account::AccountId;
use crate::auth::{AuthError, Authority};
use crate::clock::Clock;
use crate::config::{Amount, BPS_DENOMINATOR, SCALE, YIELD_ACCRUAL_WINDOW};
use crate::event::{Event, EventLog};
use crate::guard::ReentrancyGuard;

use super::params::{AssetKind, AssetParams, Pricing};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced by token ledger operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// A zero amount where a positive one is required.
    #[error("invalid amount: expected a positive value")]
    InvalidAmount,

    /// Attempted to move more than the available balance.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// The owner's current balance.
        available: Amount,
        /// The amount that was requested.
        requested: Amount,
    },

    /// Faucet claimed again before the cooldown window elapsed.
    #[error("faucet cooldown active: {}s remaining", .remaining.as_secs())]
    CooldownActive {
        /// Time until the next claim becomes valid.
        remaining: Duration,
    },

    /// Yield claim attempted with nothing accrued.
    #[error("no yield due")]
    NoYieldDue,

    /// Checked arithmetic exceeded the representable range.
    #[error("amount overflow: operation exceeds the representable range")]
    Overflow,

    /// The atomicity guard rejected a nested mutating call.
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// Reference price update attempted on a face-value asset.
    #[error("asset {0} has a fixed face value; the reference price is not settable")]
    FixedFaceValue(AssetKind),

    /// Maturity operation attempted on an asset with no maturity schedule.
    #[error("asset {0} has no maturity schedule")]
    MaturityNotSupported(AssetKind),

    /// The caller lacks the privilege for this operation.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

// ---------------------------------------------------------------------------
// AccrualTokenLedger
// ---------------------------------------------------------------------------

/// Balance ledger for one asset with faucet issuance and time-based yield.
///
/// # Concurrency
///
/// Mutating operations take `&mut self`; the embedding environment
/// serializes them. The [`Authority`], [`Clock`], and [`EventLog`]
/// collaborators are internally synchronized and shared with the vault.
pub struct AccrualTokenLedger {
    params: AssetParams,
    authority: Arc<Authority>,
    clock: Arc<dyn Clock>,
    events: Arc<EventLog>,
    guard: Arc<ReentrancyGuard>,

    /// Per-owner balances in smallest units. Absent key means zero.
    balances: HashMap<AccountId, Amount>,
    /// Identities allowed to move other owners' funds via `transfer_from`.
    operators: HashSet<AccountId>,
    /// Last successful faucet claim per owner.
    last_faucet_claim: HashMap<AccountId, DateTime<Utc>>,
    /// First instant each owner's balance became non-zero. Set once,
    /// never reset while the balance stays non-zero. Seeds yield accrual
    /// and, for the bond asset, the maturity schedule.
    deposit_epoch: HashMap<AccountId, DateTime<Utc>>,
    /// Last successful yield claim per owner.
    last_yield_claim: HashMap<AccountId, DateTime<Utc>>,

    /// Current reference price (oracle-priced assets only; unused for
    /// face-value assets).
    reference_price: Amount,
    /// Cumulative supply counters. Invariant: `sum(balances) ==
    /// total_issued - total_burned` at every observation point.
    total_issued: Amount,
    total_burned: Amount,
}

impl AccrualTokenLedger {
    /// Creates an empty ledger for the given asset.
    pub fn new(
        params: AssetParams,
        authority: Arc<Authority>,
        clock: Arc<dyn Clock>,
        events: Arc<EventLog>,
    ) -> Self {
        let reference_price = match params.pricing {
            Pricing::Oracle { initial_price } => initial_price,
            Pricing::FaceValue { .. } => 0,
        };
        Self {
            params,
            authority,
            clock,
            events,
            guard: Arc::new(ReentrancyGuard::new()),
            balances: HashMap::new(),
            operators: HashSet::new(),
            last_faucet_claim: HashMap::new(),
            deposit_epoch: HashMap::new(),
            last_yield_claim: HashMap::new(),
            reference_price,
            total_issued: 0,
            total_burned: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The asset parameters this ledger was constructed with.
    pub fn params(&self) -> &AssetParams {
        &self.params
    }

    /// The asset class this ledger tracks.
    pub fn kind(&self) -> AssetKind {
        self.params.kind
    }

    /// Returns an owner's balance (zero if never credited).
    pub fn balance_of(&self, owner: &AccountId) -> Amount {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    /// Circulating supply: everything issued minus everything burned.
    pub fn total_supply(&self) -> Amount {
        self.total_issued - self.total_burned
    }

    /// Cumulative issuance since construction.
    pub fn total_issued(&self) -> Amount {
        self.total_issued
    }

    /// Cumulative burns since construction.
    pub fn total_burned(&self) -> Amount {
        self.total_burned
    }

    /// Number of owners with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|b| **b > 0).count()
    }

    /// The current reference price (oracle-priced assets).
    pub fn reference_price(&self) -> Amount {
        self.reference_price
    }

    /// The instant an owner's balance first became non-zero, if ever.
    pub fn deposit_epoch(&self, owner: &AccountId) -> Option<DateTime<Utc>> {
        self.deposit_epoch.get(owner).copied()
    }

    /// Returns `true` if `operator` may call [`transfer_from`](Self::transfer_from).
    pub fn is_operator(&self, operator: &AccountId) -> bool {
        self.operators.contains(operator)
    }

    // -----------------------------------------------------------------------
    // Privileged supply management
    // -----------------------------------------------------------------------

    /// Mints `amount` to `owner`. Administrator only.
    ///
    /// Seeds the owner's deposit epoch if this is their first non-zero
    /// balance. Returns the owner's new balance.
    pub fn issue(
        &mut self,
        caller: &AccountId,
        owner: &AccountId,
        amount: Amount,
    ) -> Result<Amount, TokenError> {
        self.authority.require_admin(caller, "issue")?;
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }
        let guard = Arc::clone(&self.guard);
        let _tx = guard.try_enter().ok_or(TokenError::ReentrantCall)?;

        let now = self.clock.now();
        let new_balance = self.mint(owner, amount, now)?;

        self.events.record(
            now,
            Event::Issued {
                asset: self.params.kind,
                owner: owner.clone(),
                amount,
            },
        );
        Ok(new_balance)
    }

    /// Burns `amount` from the caller's own balance.
    ///
    /// Returns the caller's remaining balance.
    pub fn burn(&mut self, caller: &AccountId, amount: Amount) -> Result<Amount, TokenError> {
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }
        let guard = Arc::clone(&self.guard);
        let _tx = guard.try_enter().ok_or(TokenError::ReentrantCall)?;

        let available = self.balance_of(caller);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        let new_burned = self
            .total_burned
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.balances.insert(caller.clone(), available - amount);
        self.total_burned = new_burned;

        let now = self.clock.now();
        self.events.record(
            now,
            Event::Burned {
                asset: self.params.kind,
                owner: caller.clone(),
                amount,
            },
        );
        Ok(available - amount)
    }

    // -----------------------------------------------------------------------
    // Faucet
    // -----------------------------------------------------------------------

    /// Mints the fixed per-asset faucet amount to the caller.
    ///
    /// Rejected with [`TokenError::CooldownActive`] until one full cooldown
    /// has elapsed since the caller's previous claim. Updates the
    /// last-claim timestamp and seeds the deposit epoch.
    pub fn claim_faucet(&mut self, caller: &AccountId) -> Result<Amount, TokenError> {
        let guard = Arc::clone(&self.guard);
        let _tx = guard.try_enter().ok_or(TokenError::ReentrantCall)?;

        let now = self.clock.now();
        let remaining = self.cooldown_remaining_at(caller, now);
        if !remaining.is_zero() {
            return Err(TokenError::CooldownActive { remaining });
        }

        let amount = self.params.faucet_amount;
        let new_balance = self.mint(caller, amount, now)?;
        self.last_faucet_claim.insert(caller.clone(), now);

        self.events.record(
            now,
            Event::FaucetClaimed {
                asset: self.params.kind,
                owner: caller.clone(),
                amount,
            },
        );
        Ok(new_balance)
    }

    /// Time until `owner` may claim the faucet again. Zero when eligible.
    pub fn cooldown_remaining(&self, owner: &AccountId) -> Duration {
        self.cooldown_remaining_at(owner, self.clock.now())
    }

    fn cooldown_remaining_at(&self, owner: &AccountId, now: DateTime<Utc>) -> Duration {
        let Some(last) = self.last_faucet_claim.get(owner) else {
            return Duration::ZERO;
        };
        let elapsed = (now - *last).num_seconds().max(0) as u64;
        let cooldown = self.params.faucet_cooldown.as_secs();
        Duration::from_secs(cooldown.saturating_sub(elapsed))
    }

    // -----------------------------------------------------------------------
    // Yield
    // -----------------------------------------------------------------------

    /// Yield accrued but not yet claimed by `owner`. Computed, not stored.
    ///
    /// Zero when the owner has no deposit epoch or a zero balance.
    /// Otherwise `balance * rate_bps * elapsed_secs / (3600 * 10_000)`,
    /// with elapsed time measured from the later of the deposit epoch and
    /// the last yield claim. The hour-denominated divisor is deliberate:
    /// an accelerated demo rate, not an APY.
    pub fn pending_yield(&self, owner: &AccountId) -> Result<Amount, TokenError> {
        let balance = self.balance_of(owner);
        let Some(epoch) = self.deposit_epoch.get(owner) else {
            return Ok(0);
        };
        if balance == 0 {
            return Ok(0);
        }

        let accrual_start = match self.last_yield_claim.get(owner) {
            Some(claimed) if claimed > epoch => *claimed,
            _ => *epoch,
        };
        let elapsed_secs = (self.clock.now() - accrual_start).num_seconds().max(0) as Amount;

        let numerator = balance
            .checked_mul(self.params.yield_rate_bps as Amount)
            .and_then(|v| v.checked_mul(elapsed_secs))
            .ok_or(TokenError::Overflow)?;
        let denominator = YIELD_ACCRUAL_WINDOW.as_secs() as Amount * BPS_DENOMINATOR;

        Ok(numerator / denominator)
    }

    /// Mints the caller's pending yield and restarts their accrual window.
    ///
    /// Fails with [`TokenError::NoYieldDue`] when nothing has accrued.
    /// Returns the amount minted.
    pub fn claim_yield(&mut self, caller: &AccountId) -> Result<Amount, TokenError> {
        let guard = Arc::clone(&self.guard);
        let _tx = guard.try_enter().ok_or(TokenError::ReentrantCall)?;

        let amount = self.pending_yield(caller)?;
        if amount == 0 {
            return Err(TokenError::NoYieldDue);
        }

        let now = self.clock.now();
        self.mint(caller, amount, now)?;
        self.last_yield_claim.insert(caller.clone(), now);

        self.events.record(
            now,
            Event::YieldClaimed {
                asset: self.params.kind,
                owner: caller.clone(),
                amount,
            },
        );
        Ok(amount)
    }

    // -----------------------------------------------------------------------
    // Transfers
    // -----------------------------------------------------------------------

    /// Moves `amount` from the caller to `to`.
    ///
    /// Seeds the recipient's deposit epoch if they had none — receiving a
    /// transfer starts yield accrual just like a faucet claim does.
    pub fn transfer(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let guard = Arc::clone(&self.guard);
        let _tx = guard.try_enter().ok_or(TokenError::ReentrantCall)?;
        self.move_balance(caller, to, amount)
    }

    /// Moves `amount` from `from` to `to` on behalf of `operator`.
    ///
    /// The operator must have been authorized by the administrator (the
    /// vault's custody account is registered this way) or be the
    /// administrator itself.
    pub fn transfer_from(
        &mut self,
        operator: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if !self.operators.contains(operator) && !self.authority.is_admin(operator) {
            return Err(TokenError::Auth(AuthError::NotAuthorized {
                caller: operator.clone(),
                operation: "transfer_from",
            }));
        }
        let guard = Arc::clone(&self.guard);
        let _tx = guard.try_enter().ok_or(TokenError::ReentrantCall)?;
        self.move_balance(from, to, amount)
    }

    /// Grants or revokes `transfer_from` access. Administrator only.
    pub fn authorize_operator(
        &mut self,
        caller: &AccountId,
        operator: AccountId,
        authorized: bool,
    ) -> Result<(), TokenError> {
        self.authority.require_admin(caller, "authorize_operator")?;
        if authorized {
            self.operators.insert(operator);
        } else {
            self.operators.remove(&operator);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pricing & maturity
    // -----------------------------------------------------------------------

    /// Updates the reference price. Administrator only; oracle-priced
    /// assets only.
    pub fn set_reference_price(
        &mut self,
        caller: &AccountId,
        price: Amount,
    ) -> Result<(), TokenError> {
        self.authority.require_admin(caller, "set_reference_price")?;
        if !matches!(self.params.pricing, Pricing::Oracle { .. }) {
            return Err(TokenError::FixedFaceValue(self.params.kind));
        }
        if price == 0 {
            return Err(TokenError::InvalidAmount);
        }

        self.reference_price = price;
        let now = self.clock.now();
        self.events.record(
            now,
            Event::PriceUpdated {
                asset: self.params.kind,
                price,
            },
        );
        Ok(())
    }

    /// USD-equivalent value of `amount`, for display.
    ///
    /// Oracle assets use the current reference price; face-value assets
    /// use their fixed face value.
    pub fn usd_value(&self, amount: Amount) -> Result<Amount, TokenError> {
        let unit_price = match self.params.pricing {
            Pricing::Oracle { .. } => self.reference_price,
            Pricing::FaceValue { face_value } => face_value,
        };
        scaled_mul(amount, unit_price).ok_or(TokenError::Overflow)
    }

    /// Returns `true` once the owner's position has passed its maturity
    /// date. Always `false` for assets without a maturity schedule or
    /// owners without a deposit epoch. Informational — nothing is gated
    /// on maturity.
    pub fn is_mature(&self, owner: &AccountId) -> bool {
        self.time_to_maturity(owner).is_some_and(|d| d.is_zero())
    }

    /// Time until the owner's position matures. `None` when the asset has
    /// no maturity schedule or the owner has no deposit epoch; zero once
    /// matured.
    pub fn time_to_maturity(&self, owner: &AccountId) -> Option<Duration> {
        let period = self.params.maturity_period?;
        let epoch = self.deposit_epoch.get(owner)?;
        let elapsed = (self.clock.now() - *epoch).num_seconds().max(0) as u64;
        Some(Duration::from_secs(period.as_secs().saturating_sub(elapsed)))
    }

    /// Changes the maturity period. Administrator only; assets with a
    /// maturity schedule only.
    pub fn set_maturity_period(
        &mut self,
        caller: &AccountId,
        period: Duration,
    ) -> Result<(), TokenError> {
        self.authority.require_admin(caller, "set_maturity_period")?;
        if self.params.maturity_period.is_none() {
            return Err(TokenError::MaturityNotSupported(self.params.kind));
        }

        self.params.maturity_period = Some(period);
        let now = self.clock.now();
        self.events.record(
            now,
            Event::MaturityPeriodChanged {
                asset: self.params.kind,
                period_secs: period.as_secs(),
            },
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Credits `amount` to `owner`, growing total supply, and seeds the
    /// deposit epoch on the first non-zero balance.
    fn mint(
        &mut self,
        owner: &AccountId,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<Amount, TokenError> {
        let current = self.balance_of(owner);
        let new_balance = current.checked_add(amount).ok_or(TokenError::Overflow)?;
        let new_issued = self
            .total_issued
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.balances.insert(owner.clone(), new_balance);
        self.total_issued = new_issued;
        self.deposit_epoch.entry(owner.clone()).or_insert(now);

        debug!(asset = %self.params.kind, owner = %owner, amount, "minted");
        Ok(new_balance)
    }

    /// Validates and applies a balance move. All checks precede all writes.
    fn move_balance(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                available: from_balance,
                requested: amount,
            });
        }

        let now = self.clock.now();
        if from != to {
            let new_to = self
                .balance_of(to)
                .checked_add(amount)
                .ok_or(TokenError::Overflow)?;
            self.balances.insert(from.clone(), from_balance - amount);
            self.balances.insert(to.clone(), new_to);
        }
        // Receiving funds seeds yield accrual for first-time holders,
        // including recipients of vault withdrawals.
        self.deposit_epoch.entry(to.clone()).or_insert(now);

        self.events.record(
            now,
            Event::Transferred {
                asset: self.params.kind,
                from: from.clone(),
                to: to.clone(),
                amount,
            },
        );
        Ok(())
    }
}

/// Exact `a * b / SCALE` for 18-decimal fixed-point values.
///
/// The naive product of two scaled values overflows `u128` at realistic
/// magnitudes (two tokens at a $2,500 reference price already exceeds
/// it), so both operands are split into whole and fractional parts and
/// the four partial products are recombined. `None` only when the true
/// result itself exceeds the representable range.
fn scaled_mul(a: Amount, b: Amount) -> Option<Amount> {
    let (a_whole, a_frac) = (a / SCALE, a % SCALE);
    let (b_whole, b_frac) = (b / SCALE, b % SCALE);

    let mut acc = a_whole.checked_mul(b_whole)?.checked_mul(SCALE)?;
    acc = acc.checked_add(a_whole.checked_mul(b_frac)?)?;
    acc = acc.checked_add(b_whole.checked_mul(a_frac)?)?;
    // Both fractional parts are below SCALE, so this product fits.
    acc.checked_add(a_frac * b_frac / SCALE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

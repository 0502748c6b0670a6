//! # Vault Ledger
//!
//! The custody and policy engine. The vault owns every [`Portfolio`], the
//! payment history, and the aggregate locked total; it holds shared
//! references (not ownership) to the two token ledgers and moves funds
//! through its own custody account on them.
//!
//! ## Failure semantics
//!
//! Preconditions — privilege, policy, sufficiency, overflow — are all
//! validated before the outbound token-ledger call, and vault state is
//! only written after that call succeeds. A failing operation therefore
//! leaves portfolios, the locked total, and the history exactly unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::account::AccountId;
use crate::auth::{AuthError, Authority};
use crate::clock::Clock;
use crate::config::{Amount, INVISIBLE_MODE_THRESHOLD, MAX_MEMO_LENGTH};
use crate::event::{Event, EventLog};
use crate::guard::ReentrancyGuard;
use crate::token::{AccrualTokenLedger, AssetKind, TokenError};

use super::history::{PaymentHistory, PaymentRecord};
use super::portfolio::Portfolio;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A zero amount where a positive one is required.
    #[error("invalid amount: expected a positive value")]
    InvalidAmount,

    /// The user's custodied balance is too low for the request.
    #[error("insufficient custody balance: {asset} available {available}, requested {requested}")]
    InsufficientCustodyBalance {
        /// The asset being debited.
        asset: AssetKind,
        /// The user's current custody balance.
        available: Amount,
        /// The amount that was requested.
        requested: Amount,
    },

    /// An agent payment exceeds both the allowance and the invisible-mode
    /// threshold.
    #[error("payment of {requested} exceeds spending policy (allowance {allowance})")]
    ExceedsSpendingPolicy {
        /// The user's current spending allowance.
        allowance: Amount,
        /// The payment amount that was rejected.
        requested: Amount,
    },

    /// History lookup past the end.
    #[error("payment record index {index} out of range (history length {len})")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The current history length.
        len: usize,
    },

    /// Payment memo longer than the protocol cap.
    #[error("memo of {len} bytes exceeds the {max} byte limit")]
    MemoTooLong {
        /// Length of the rejected memo.
        len: usize,
        /// The configured maximum.
        max: usize,
    },

    /// Checked arithmetic exceeded the representable range.
    #[error("amount overflow: operation exceeds the representable range")]
    Overflow,

    /// The atomicity guard rejected a nested mutating call.
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// The caller lacks the privilege for this operation.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A token-ledger call failed (insufficient balance, cooldown, ...).
    #[error("token ledger: {0}")]
    Token(#[from] TokenError),
}

// ---------------------------------------------------------------------------
// VaultLedger
// ---------------------------------------------------------------------------

/// Custodial vault over the two accrual token ledgers.
///
/// The vault's custody account must be registered as an operator on both
/// token ledgers (via `authorize_operator`) before deposits can pull
/// user funds.
pub struct VaultLedger {
    /// The vault's own account on the token ledgers. All custodied funds
    /// sit under this identity.
    account: AccountId,
    authority: Arc<Authority>,
    clock: Arc<dyn Clock>,
    events: Arc<EventLog>,
    guard: ReentrancyGuard,

    gold: Arc<RwLock<AccrualTokenLedger>>,
    bond: Arc<RwLock<AccrualTokenLedger>>,

    portfolios: HashMap<AccountId, Portfolio>,
    history: PaymentHistory,
    /// Sum of all custodied balances across users and assets.
    total_value_locked: Amount,
}

impl VaultLedger {
    /// Creates an empty vault bound to the given token ledgers.
    pub fn new(
        account: AccountId,
        authority: Arc<Authority>,
        clock: Arc<dyn Clock>,
        events: Arc<EventLog>,
        gold: Arc<RwLock<AccrualTokenLedger>>,
        bond: Arc<RwLock<AccrualTokenLedger>>,
    ) -> Self {
        Self {
            account,
            authority,
            clock,
            events,
            guard: ReentrancyGuard::new(),
            gold,
            bond,
            portfolios: HashMap::new(),
            history: PaymentHistory::new(),
            total_value_locked: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The vault's custody account identity.
    pub fn custody_account(&self) -> &AccountId {
        &self.account
    }

    /// A user's portfolio, if they have ever interacted with the vault.
    pub fn portfolio(&self, user: &AccountId) -> Option<&Portfolio> {
        self.portfolios.get(user)
    }

    /// Number of executed payments.
    pub fn payment_history_len(&self) -> usize {
        self.history.len()
    }

    /// The payment record at `index`.
    pub fn payment_record(&self, index: usize) -> Result<&PaymentRecord, VaultError> {
        self.history.get(index).ok_or(VaultError::IndexOutOfRange {
            index,
            len: self.history.len(),
        })
    }

    /// Sum of every custodied balance, across users and assets.
    pub fn total_value_locked(&self) -> Amount {
        self.total_value_locked
    }

    // -----------------------------------------------------------------------
    // Custody
    // -----------------------------------------------------------------------

    /// Moves `amount` of `kind` from the caller's token-ledger balance
    /// into vault custody. Returns the caller's new custody balance.
    pub fn deposit_asset(
        &mut self,
        caller: &AccountId,
        kind: AssetKind,
        amount: Amount,
    ) -> Result<Amount, VaultError> {
        let _tx = self.guard.try_enter().ok_or(VaultError::ReentrantCall)?;
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }

        // Validate every vault-side write before touching the token ledger
        // so a failure on either side leaves both unchanged.
        let existing = self.portfolios.get(caller);
        let new_balance = existing
            .map(|p| p.balance_of(kind))
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        let new_deposited = existing
            .map(|p| p.total_deposited)
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        let new_locked = self
            .total_value_locked
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;

        self.token_ledger(kind)
            .write()
            .transfer_from(&self.account, caller, &self.account, amount)?;

        let now = self.clock.now();
        let portfolio = self
            .portfolios
            .entry(caller.clone())
            .or_insert_with(|| Portfolio::new(now));
        *portfolio.balance_mut(kind) = new_balance;
        portfolio.total_deposited = new_deposited;
        self.total_value_locked = new_locked;

        self.events.record(
            now,
            Event::Deposited {
                user: caller.clone(),
                asset: kind,
                amount,
            },
        );
        Ok(new_balance)
    }

    /// Moves `amount` of `kind` from the caller's custody back to their
    /// token-ledger balance. Returns the caller's remaining custody
    /// balance.
    pub fn withdraw_asset(
        &mut self,
        caller: &AccountId,
        kind: AssetKind,
        amount: Amount,
    ) -> Result<Amount, VaultError> {
        let _tx = self.guard.try_enter().ok_or(VaultError::ReentrantCall)?;
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }

        let available = self
            .portfolios
            .get(caller)
            .map(|p| p.balance_of(kind))
            .unwrap_or(0);
        if available < amount {
            return Err(VaultError::InsufficientCustodyBalance {
                asset: kind,
                available,
                requested: amount,
            });
        }
        let new_locked = self
            .total_value_locked
            .checked_sub(amount)
            .ok_or(VaultError::Overflow)?;

        self.token_ledger(kind)
            .write()
            .transfer(&self.account, caller, amount)?;

        let now = self.clock.now();
        let portfolio = self
            .portfolios
            .entry(caller.clone())
            .or_insert_with(|| Portfolio::new(now));
        *portfolio.balance_mut(kind) = available - amount;
        self.total_value_locked = new_locked;

        self.events.record(
            now,
            Event::Withdrawn {
                user: caller.clone(),
                asset: kind,
                amount,
            },
        );
        Ok(available - amount)
    }

    // -----------------------------------------------------------------------
    // Self-service policy
    // -----------------------------------------------------------------------

    /// Sets the caller's spending allowance. Zero is valid — it revokes
    /// the agent's non-invisible spending entirely.
    pub fn set_spending_allowance(&mut self, caller: &AccountId, amount: Amount) {
        let now = self.clock.now();
        let portfolio = self
            .portfolios
            .entry(caller.clone())
            .or_insert_with(|| Portfolio::new(now));
        portfolio.spending_allowance = amount;

        self.events.record(
            now,
            Event::AllowanceSet {
                user: caller.clone(),
                amount,
            },
        );
    }

    /// Flips the caller's invisible-mode flag. Returns the new state.
    pub fn toggle_invisible_mode(&mut self, caller: &AccountId) -> bool {
        let now = self.clock.now();
        let portfolio = self
            .portfolios
            .entry(caller.clone())
            .or_insert_with(|| Portfolio::new(now));
        portfolio.invisible_mode = !portfolio.invisible_mode;
        let enabled = portfolio.invisible_mode;

        self.events.record(
            now,
            Event::InvisibleModeToggled {
                user: caller.clone(),
                enabled,
            },
        );
        enabled
    }

    /// Flips the caller's auto-compound flag. Returns the new state.
    pub fn toggle_auto_compound(&mut self, caller: &AccountId) -> bool {
        let now = self.clock.now();
        let portfolio = self
            .portfolios
            .entry(caller.clone())
            .or_insert_with(|| Portfolio::new(now));
        portfolio.auto_compound = !portfolio.auto_compound;
        let enabled = portfolio.auto_compound;

        self.events.record(
            now,
            Event::AutoCompoundToggled {
                user: caller.clone(),
                enabled,
            },
        );
        enabled
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    /// Adds or removes an identity from the authorized agent set.
    /// Administrator only.
    pub fn set_agent_authorization(
        &mut self,
        caller: &AccountId,
        agent: AccountId,
        authorized: bool,
    ) -> Result<(), VaultError> {
        self.authority.set_agent(caller, agent.clone(), authorized)?;

        let now = self.clock.now();
        self.events.record(
            now,
            Event::AgentAuthorizationChanged { agent, authorized },
        );
        Ok(())
    }

    /// Rebinds the token ledgers this vault custodies against.
    /// Administrator only.
    pub fn set_token_references(
        &mut self,
        caller: &AccountId,
        gold: Arc<RwLock<AccrualTokenLedger>>,
        bond: Arc<RwLock<AccrualTokenLedger>>,
    ) -> Result<(), VaultError> {
        self.authority.require_admin(caller, "set_token_references")?;
        self.gold = gold;
        self.bond = bond;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Agent operations
    // -----------------------------------------------------------------------

    /// Executes a merchant payment from `user`'s custody on behalf of an
    /// authorized agent (or the administrator).
    ///
    /// The spending policy must pass before any transfer: the amount must
    /// fit the user's allowance, or invisible mode must be enabled with
    /// the amount at or below the small-value threshold. On success the
    /// user's custody is debited, the merchant is paid on the token
    /// ledger, and a record is appended to the history.
    pub fn execute_payment(
        &mut self,
        agent: &AccountId,
        user: &AccountId,
        merchant: &AccountId,
        amount: Amount,
        kind: AssetKind,
        memo: &str,
    ) -> Result<PaymentRecord, VaultError> {
        self.authority.require_agent_or_admin(agent, "execute_payment")?;
        let _tx = self.guard.try_enter().ok_or(VaultError::ReentrantCall)?;
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }
        if memo.len() > MAX_MEMO_LENGTH {
            return Err(VaultError::MemoTooLong {
                len: memo.len(),
                max: MAX_MEMO_LENGTH,
            });
        }

        let portfolio = self.portfolios.get(user);
        let allowance = portfolio.map(|p| p.spending_allowance).unwrap_or(0);
        let invisible = portfolio.map(|p| p.invisible_mode).unwrap_or(false);
        let within_policy =
            amount <= allowance || (invisible && amount <= INVISIBLE_MODE_THRESHOLD);
        if !within_policy {
            return Err(VaultError::ExceedsSpendingPolicy {
                allowance,
                requested: amount,
            });
        }

        let available = portfolio.map(|p| p.balance_of(kind)).unwrap_or(0);
        if available < amount {
            return Err(VaultError::InsufficientCustodyBalance {
                asset: kind,
                available,
                requested: amount,
            });
        }
        let new_locked = self
            .total_value_locked
            .checked_sub(amount)
            .ok_or(VaultError::Overflow)?;

        self.token_ledger(kind)
            .write()
            .transfer(&self.account, merchant, amount)?;

        let now = self.clock.now();
        let p = self
            .portfolios
            .entry(user.clone())
            .or_insert_with(|| Portfolio::new(now));
        *p.balance_mut(kind) = available - amount;
        self.total_value_locked = new_locked;

        let record = PaymentRecord {
            id: Uuid::new_v4(),
            payer: user.clone(),
            merchant: merchant.clone(),
            amount,
            asset: kind,
            memo: memo.to_string(),
            timestamp: now,
        };
        self.history.append(record.clone());

        self.events.record(
            now,
            Event::PaymentExecuted {
                agent: agent.clone(),
                user: user.clone(),
                merchant: merchant.clone(),
                asset: kind,
                amount,
            },
        );
        Ok(record)
    }

    /// Credits harvested yield to a user's portfolio on behalf of an
    /// authorized agent (or the administrator).
    ///
    /// The amounts are supplied by the caller; the vault does not
    /// recompute them from the token ledgers. The agent is already
    /// trusted to move custody funds within policy, so the same trust
    /// boundary applies here. Harvests above the small-value threshold
    /// are logged at `warn` so monitoring can flag abuse.
    ///
    /// `total_yield_earned` grows by the sum regardless of policy. When
    /// the user has auto-compound enabled the amounts are also credited
    /// to their custody balances and the locked total (re-invested).
    pub fn harvest_yield(
        &mut self,
        agent: &AccountId,
        user: &AccountId,
        gold_amount: Amount,
        bond_amount: Amount,
    ) -> Result<(), VaultError> {
        self.authority.require_agent_or_admin(agent, "harvest_yield")?;
        let _tx = self.guard.try_enter().ok_or(VaultError::ReentrantCall)?;

        let total = gold_amount
            .checked_add(bond_amount)
            .ok_or(VaultError::Overflow)?;
        if total > INVISIBLE_MODE_THRESHOLD {
            warn!(
                agent = %agent,
                user = %user,
                gold_amount,
                bond_amount,
                "large caller-supplied yield harvest"
            );
        }

        let existing = self.portfolios.get(user);
        let new_earned = existing
            .map(|p| p.total_yield_earned)
            .unwrap_or(0)
            .checked_add(total)
            .ok_or(VaultError::Overflow)?;
        let compound = existing.map(|p| p.auto_compound).unwrap_or(false);

        let mut new_gold = existing.map(|p| p.gold_balance).unwrap_or(0);
        let mut new_bond = existing.map(|p| p.bond_balance).unwrap_or(0);
        let mut new_locked = self.total_value_locked;
        if compound {
            new_gold = new_gold.checked_add(gold_amount).ok_or(VaultError::Overflow)?;
            new_bond = new_bond.checked_add(bond_amount).ok_or(VaultError::Overflow)?;
            new_locked = new_locked.checked_add(total).ok_or(VaultError::Overflow)?;
        }

        let now = self.clock.now();
        let portfolio = self
            .portfolios
            .entry(user.clone())
            .or_insert_with(|| Portfolio::new(now));
        portfolio.total_yield_earned = new_earned;
        portfolio.gold_balance = new_gold;
        portfolio.bond_balance = new_bond;
        self.total_value_locked = new_locked;

        self.events.record(
            now,
            Event::YieldHarvested {
                agent: agent.clone(),
                user: user.clone(),
                gold_amount,
                bond_amount,
                compounded: compound,
            },
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn token_ledger(&self, kind: AssetKind) -> &Arc<RwLock<AccrualTokenLedger>> {
        match kind {
            AssetKind::Gold => &self.gold,
            AssetKind::Bond => &self.bond,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::units;
    use crate::token::AssetParams;

    fn admin() -> AccountId {
        AccountId::new("auric:admin")
    }

    fn agent() -> AccountId {
        AccountId::new("auric:agent")
    }

    fn alice() -> AccountId {
        AccountId::new("auric:alice")
    }

    fn merchant() -> AccountId {
        AccountId::new("auric:coffee")
    }

    struct Harness {
        vault: VaultLedger,
        gold: Arc<RwLock<AccrualTokenLedger>>,
        bond: Arc<RwLock<AccrualTokenLedger>>,
        #[allow(dead_code)]
        clock: Arc<ManualClock>,
    }

    /// Builds the full stack: both token ledgers, the vault registered as
    /// an operator on each, and one authorized agent.
    fn setup() -> Harness {
        let clock = Arc::new(ManualClock::epoch());
        let authority = Arc::new(Authority::new(admin()));
        let events = Arc::new(EventLog::new());
        let vault_account = AccountId::new("auric:vault");

        let gold = Arc::new(RwLock::new(AccrualTokenLedger::new(
            AssetParams::gold(),
            authority.clone(),
            clock.clone(),
            events.clone(),
        )));
        let bond = Arc::new(RwLock::new(AccrualTokenLedger::new(
            AssetParams::bond(),
            authority.clone(),
            clock.clone(),
            events.clone(),
        )));
        for ledger in [&gold, &bond] {
            ledger
                .write()
                .authorize_operator(&admin(), vault_account.clone(), true)
                .unwrap();
        }

        let mut vault = VaultLedger::new(
            vault_account,
            authority,
            clock.clone(),
            events,
            gold.clone(),
            bond.clone(),
        );
        vault
            .set_agent_authorization(&admin(), agent(), true)
            .unwrap();

        Harness {
            vault,
            gold,
            bond,
            clock,
        }
    }

    /// Funds `who` with `amount` gold directly on the token ledger.
    fn fund_gold(h: &Harness, who: &AccountId, amount: Amount) {
        h.gold.write().issue(&admin(), who, amount).unwrap();
    }

    // -- deposit / withdraw ------------------------------------------------

    #[test]
    fn deposit_moves_funds_into_custody() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(50));

        let custody = h
            .vault
            .deposit_asset(&alice(), AssetKind::Gold, units(30))
            .unwrap();

        assert_eq!(custody, units(30));
        assert_eq!(h.gold.read().balance_of(&alice()), units(20));
        assert_eq!(
            h.gold.read().balance_of(h.vault.custody_account()),
            units(30)
        );
        let p = h.vault.portfolio(&alice()).unwrap();
        assert_eq!(p.total_deposited, units(30));
        assert_eq!(h.vault.total_value_locked(), units(30));
    }

    #[test]
    fn deposit_zero_rejected() {
        let mut h = setup();
        let result = h.vault.deposit_asset(&alice(), AssetKind::Gold, 0);
        assert!(matches!(result, Err(VaultError::InvalidAmount)));
    }

    #[test]
    fn deposit_without_token_balance_fails_cleanly() {
        let mut h = setup();

        let result = h.vault.deposit_asset(&alice(), AssetKind::Gold, units(1));
        assert!(matches!(
            result,
            Err(VaultError::Token(TokenError::InsufficientBalance { .. }))
        ));
        assert!(h.vault.portfolio(&alice()).is_none());
        assert_eq!(h.vault.total_value_locked(), 0);
    }

    #[test]
    fn withdraw_round_trip_restores_balances() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(50));

        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(30))
            .unwrap();
        let remaining = h
            .vault
            .withdraw_asset(&alice(), AssetKind::Gold, units(30))
            .unwrap();

        assert_eq!(remaining, 0);
        assert_eq!(h.gold.read().balance_of(&alice()), units(50));
        assert_eq!(h.gold.read().balance_of(h.vault.custody_account()), 0);
        assert_eq!(h.vault.total_value_locked(), 0);
    }

    #[test]
    fn withdraw_more_than_custody_rejected() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(10));
        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(10))
            .unwrap();

        let err = h
            .vault
            .withdraw_asset(&alice(), AssetKind::Gold, units(11))
            .unwrap_err();
        match err {
            VaultError::InsufficientCustodyBalance {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, units(10));
                assert_eq!(requested, units(11));
            }
            other => panic!("expected InsufficientCustodyBalance, got {other}"),
        }
    }

    #[test]
    fn custody_is_disjoint_per_asset() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(10));
        h.bond.write().issue(&admin(), &alice(), units(5)).unwrap();

        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(10))
            .unwrap();
        h.vault
            .deposit_asset(&alice(), AssetKind::Bond, units(5))
            .unwrap();

        let p = h.vault.portfolio(&alice()).unwrap();
        assert_eq!(p.gold_balance, units(10));
        assert_eq!(p.bond_balance, units(5));
        assert_eq!(h.vault.total_value_locked(), units(15));

        // Withdrawing bond must not touch gold custody.
        h.vault
            .withdraw_asset(&alice(), AssetKind::Bond, units(5))
            .unwrap();
        let p = h.vault.portfolio(&alice()).unwrap();
        assert_eq!(p.gold_balance, units(10));
        assert_eq!(p.bond_balance, 0);
    }

    // -- policy ------------------------------------------------------------

    #[test]
    fn allowance_boundary_exact_and_plus_one() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(50));
        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(50))
            .unwrap();
        h.vault.set_spending_allowance(&alice(), units(20));

        // Exactly at the allowance: allowed.
        h.vault
            .execute_payment(
                &agent(),
                &alice(),
                &merchant(),
                units(20),
                AssetKind::Gold,
                "rent",
            )
            .unwrap();

        // One smallest unit above: rejected.
        let err = h
            .vault
            .execute_payment(
                &agent(),
                &alice(),
                &merchant(),
                units(20) + 1,
                AssetKind::Gold,
                "rent",
            )
            .unwrap_err();
        assert!(matches!(err, VaultError::ExceedsSpendingPolicy { .. }));
    }

    #[test]
    fn invisible_mode_threshold_scenario() {
        // allowance 0, invisible mode on, threshold 10 whole tokens:
        // a payment of 8 succeeds, a payment of 12 is rejected.
        let mut h = setup();
        fund_gold(&h, &alice(), units(50));
        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(50))
            .unwrap();
        h.vault.set_spending_allowance(&alice(), 0);
        assert!(h.vault.toggle_invisible_mode(&alice()));

        h.vault
            .execute_payment(
                &agent(),
                &alice(),
                &merchant(),
                units(8),
                AssetKind::Gold,
                "espresso",
            )
            .unwrap();

        let err = h
            .vault
            .execute_payment(
                &agent(),
                &alice(),
                &merchant(),
                units(12),
                AssetKind::Gold,
                "dinner",
            )
            .unwrap_err();
        assert!(matches!(err, VaultError::ExceedsSpendingPolicy { .. }));
    }

    #[test]
    fn payment_requires_agent_authorization() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(10));
        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(10))
            .unwrap();
        h.vault.set_spending_allowance(&alice(), units(10));

        let mallory = AccountId::new("auric:mallory");
        let result = h.vault.execute_payment(
            &mallory,
            &alice(),
            &merchant(),
            units(1),
            AssetKind::Gold,
            "",
        );
        assert!(matches!(result, Err(VaultError::Auth(_))));

        // The admin qualifies without being in the agent set.
        h.vault
            .execute_payment(
                &admin(),
                &alice(),
                &merchant(),
                units(1),
                AssetKind::Gold,
                "",
            )
            .unwrap();
    }

    #[test]
    fn failed_payment_leaves_state_untouched() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(5));
        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(5))
            .unwrap();
        h.vault.set_spending_allowance(&alice(), units(100));

        let locked_before = h.vault.total_value_locked();
        let history_before = h.vault.payment_history_len();

        // Policy passes but custody is insufficient.
        let err = h
            .vault
            .execute_payment(
                &agent(),
                &alice(),
                &merchant(),
                units(50),
                AssetKind::Gold,
                "too big",
            )
            .unwrap_err();
        assert!(matches!(err, VaultError::InsufficientCustodyBalance { .. }));

        let p = h.vault.portfolio(&alice()).unwrap();
        assert_eq!(p.gold_balance, units(5));
        assert_eq!(h.vault.total_value_locked(), locked_before);
        assert_eq!(h.vault.payment_history_len(), history_before);
        assert_eq!(h.gold.read().balance_of(&merchant()), 0);
    }

    #[test]
    fn payment_appends_immutable_record() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(10));
        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(10))
            .unwrap();
        h.vault.set_spending_allowance(&alice(), units(10));

        let record = h
            .vault
            .execute_payment(
                &agent(),
                &alice(),
                &merchant(),
                units(3),
                AssetKind::Gold,
                "books",
            )
            .unwrap();

        assert_eq!(h.vault.payment_history_len(), 1);
        let stored = h.vault.payment_record(0).unwrap();
        assert_eq!(stored.id, record.id);
        assert_eq!(stored.payer, alice());
        assert_eq!(stored.merchant, merchant());
        assert_eq!(stored.amount, units(3));
        assert_eq!(stored.memo, "books");
        assert_eq!(h.gold.read().balance_of(&merchant()), units(3));
    }

    #[test]
    fn payment_record_index_out_of_range() {
        let h = setup();
        let err = h.vault.payment_record(0).unwrap_err();
        assert!(matches!(
            err,
            VaultError::IndexOutOfRange { index: 0, len: 0 }
        ));
    }

    #[test]
    fn oversized_memo_rejected() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(10));
        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(10))
            .unwrap();
        h.vault.set_spending_allowance(&alice(), units(10));

        let memo = "x".repeat(MAX_MEMO_LENGTH + 1);
        let result = h.vault.execute_payment(
            &agent(),
            &alice(),
            &merchant(),
            units(1),
            AssetKind::Gold,
            &memo,
        );
        assert!(matches!(result, Err(VaultError::MemoTooLong { .. })));
        assert_eq!(h.vault.payment_history_len(), 0);
    }

    // -- harvest -----------------------------------------------------------

    #[test]
    fn harvest_without_auto_compound_only_counts() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(10));
        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(10))
            .unwrap();

        h.vault
            .harvest_yield(&agent(), &alice(), units(2), units(1))
            .unwrap();

        let p = h.vault.portfolio(&alice()).unwrap();
        assert_eq!(p.total_yield_earned, units(3));
        // Balances and the locked total are untouched.
        assert_eq!(p.gold_balance, units(10));
        assert_eq!(p.bond_balance, 0);
        assert_eq!(h.vault.total_value_locked(), units(10));
    }

    #[test]
    fn harvest_with_auto_compound_reinvests() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(10));
        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(10))
            .unwrap();
        assert!(h.vault.toggle_auto_compound(&alice()));

        h.vault
            .harvest_yield(&agent(), &alice(), units(2), units(1))
            .unwrap();

        let p = h.vault.portfolio(&alice()).unwrap();
        assert_eq!(p.total_yield_earned, units(3));
        assert_eq!(p.gold_balance, units(12));
        assert_eq!(p.bond_balance, units(1));
        assert_eq!(h.vault.total_value_locked(), units(13));
    }

    #[test]
    fn harvest_requires_agent() {
        let mut h = setup();
        let result = h
            .vault
            .harvest_yield(&alice(), &alice(), units(1), 0);
        assert!(matches!(result, Err(VaultError::Auth(_))));
    }

    // -- policy toggles ----------------------------------------------------

    #[test]
    fn toggles_flip_and_report_state() {
        let mut h = setup();

        assert!(h.vault.toggle_invisible_mode(&alice()));
        assert!(!h.vault.toggle_invisible_mode(&alice()));

        assert!(h.vault.toggle_auto_compound(&alice()));
        assert!(!h.vault.toggle_auto_compound(&alice()));
    }

    #[test]
    fn allowance_set_creates_portfolio() {
        let mut h = setup();
        h.vault.set_spending_allowance(&alice(), units(7));

        let p = h.vault.portfolio(&alice()).unwrap();
        assert_eq!(p.spending_allowance, units(7));
        assert!(p.is_empty());
    }

    // -- administration ----------------------------------------------------

    #[test]
    fn agent_registry_is_admin_only() {
        let mut h = setup();
        let mallory = AccountId::new("auric:mallory");

        let result = h
            .vault
            .set_agent_authorization(&mallory, mallory.clone(), true);
        assert!(matches!(result, Err(VaultError::Auth(_))));
    }

    #[test]
    fn revoked_agent_cannot_pay() {
        let mut h = setup();
        fund_gold(&h, &alice(), units(10));
        h.vault
            .deposit_asset(&alice(), AssetKind::Gold, units(10))
            .unwrap();
        h.vault.set_spending_allowance(&alice(), units(10));

        h.vault
            .set_agent_authorization(&admin(), agent(), false)
            .unwrap();
        let result = h.vault.execute_payment(
            &agent(),
            &alice(),
            &merchant(),
            units(1),
            AssetKind::Gold,
            "",
        );
        assert!(matches!(result, Err(VaultError::Auth(_))));
    }

    #[test]
    fn set_token_references_rebinds_ledgers() {
        let mut h = setup();
        let authority = Arc::new(Authority::new(admin()));
        let clock = Arc::new(ManualClock::epoch());
        let events = Arc::new(EventLog::new());

        let new_gold = Arc::new(RwLock::new(AccrualTokenLedger::new(
            AssetParams::gold(),
            authority.clone(),
            clock.clone(),
            events.clone(),
        )));
        let new_bond = Arc::new(RwLock::new(AccrualTokenLedger::new(
            AssetParams::bond(),
            authority,
            clock,
            events,
        )));

        h.vault
            .set_token_references(&admin(), new_gold, new_bond)
            .unwrap();

        // Deposits now run against the fresh (empty) ledgers, so pulling
        // previously issued funds fails.
        fund_gold(&h, &alice(), units(5));
        let result = h.vault.deposit_asset(&alice(), AssetKind::Gold, units(5));
        assert!(matches!(result, Err(VaultError::Token(_))));
    }

    #[test]
    fn set_token_references_requires_admin() {
        let mut h = setup();
        let gold = h.gold.clone();
        let bond = h.bond.clone();
        let result = h.vault.set_token_references(&alice(), gold, bond);
        assert!(matches!(result, Err(VaultError::Auth(_))));
    }
}

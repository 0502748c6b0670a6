//! # Protocol Configuration & Constants
//!
//! Every magic number in AURIC lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! The demo economy is intentionally accelerated: yield accrues per *hour*,
//! not per year, so a live demo shows balances moving within minutes. The
//! hour-denominated divisor in the yield formula is deliberate — do not
//! "fix" it to an APY.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Fixed-point representation
// ---------------------------------------------------------------------------

/// All balances, allowances, and prices in smallest units.
///
/// `u128` because 18-decimal fixed point exhausts `u64` at ~18 whole tokens.
/// All arithmetic on amounts is checked — overflow is a rejected operation,
/// never a wrap.
pub type Amount = u128;

/// Implied decimal places for every asset and price in the system.
pub const DECIMALS: u8 = 18;

/// `10^18` — one whole token in smallest units.
pub const SCALE: Amount = 1_000_000_000_000_000_000;

/// Converts a whole-token count into smallest units.
///
/// Panics on overflow, which cannot happen for any `u64` input
/// (`u64::MAX * SCALE` fits in `u128` with room to spare).
pub const fn units(whole: u64) -> Amount {
    whole as Amount * SCALE
}

// ---------------------------------------------------------------------------
// Faucet
// ---------------------------------------------------------------------------

/// Minimum time between successive faucet claims by the same owner.
/// One hour for both assets.
pub const FAUCET_COOLDOWN: Duration = Duration::from_secs(3600);

/// Faucet amount for the gold asset: 10 vGOLD per claim.
/// Gold mints less per claim than the bond but carries a higher notional
/// unit price.
pub const GOLD_FAUCET_AMOUNT: Amount = units(10);

/// Faucet amount for the bond asset: 100 vBOND per claim.
pub const BOND_FAUCET_AMOUNT: Amount = units(100);

// ---------------------------------------------------------------------------
// Yield
// ---------------------------------------------------------------------------

/// The accrual window the yield rate is denominated in. One *hour* — an
/// accelerated simulation rate, not a real-world APY.
pub const YIELD_ACCRUAL_WINDOW: Duration = Duration::from_secs(3600);

/// Basis-point denominator. 1 bp = 0.01%.
pub const BPS_DENOMINATOR: Amount = 10_000;

/// Gold yield: 50 bps (0.50%) of balance per accrual hour.
pub const GOLD_YIELD_RATE_BPS: u32 = 50;

/// Bond yield: 120 bps (1.20%) of balance per accrual hour.
pub const BOND_YIELD_RATE_BPS: u32 = 120;

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Default gold reference price at construction: 2,400 USD per vGOLD.
/// Administrator-settable afterwards; display-only either way.
pub const DEFAULT_GOLD_PRICE_USD: Amount = units(2_400);

/// Fixed face value of one vBOND: 100 USD. Bonds are not oracle-priced.
pub const BOND_FACE_VALUE_USD: Amount = units(100);

// ---------------------------------------------------------------------------
// Vault policy
// ---------------------------------------------------------------------------

/// Invisible-mode ceiling: agent payments at or below 10 whole tokens are
/// permitted without consuming the explicit allowance when the user has
/// invisible mode enabled.
pub const INVISIBLE_MODE_THRESHOLD: Amount = units(10);

/// Maximum payment memo length in bytes. Enough for a short message,
/// not enough for your novel.
pub const MAX_MEMO_LENGTH: usize = 512;

// ---------------------------------------------------------------------------
// Bond maturity
// ---------------------------------------------------------------------------

/// Default bond maturity period, measured from the holder's deposit epoch.
/// Maturity is informational only — no operation is gated on it.
pub const DEFAULT_BOND_MATURITY: Duration = Duration::from_secs(30 * 24 * 3600);

//! # Time Source
//!
//! Both ledgers are time-driven: faucet cooldowns, yield accrual windows,
//! and bond maturity all derive from "now". Production code uses the system
//! clock; tests inject a [`ManualClock`] so accrual math can be verified at
//! exact offsets instead of sleeping through real cooldowns.

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// An injectable source of the current time.
///
/// Implementations must be cheap to call and thread-safe — the clock is
/// shared as an `Arc<dyn Clock>` between the token ledgers and the vault.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests and simulations.
///
/// Starts at an arbitrary fixed instant and only moves when told to.
/// `advance` never goes backwards; `set` can, which is occasionally useful
/// for testing clock-skew handling.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a manual clock pinned to the given instant.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Creates a manual clock pinned to the Unix epoch. Convenient for
    /// tests that reason about absolute offsets ("at t=3600 ...").
    pub fn epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Moves the clock forward by `delta`, saturating on absurd inputs.
    pub fn advance(&self, delta: Duration) {
        let delta = chrono::Duration::from_std(delta).unwrap_or(chrono::TimeDelta::MAX);
        *self.now.write() += delta;
    }

    /// Pins the clock to an explicit instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_holds_still() {
        let clock = ManualClock::epoch();
        let a = clock.now();
        let b = clock.now();
        assert_eq!(a, b);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::epoch();
        let start = clock.now();

        clock.advance(Duration::from_secs(3600));
        let later = clock.now();

        assert_eq!((later - start).num_seconds(), 3600);
    }

    #[test]
    fn manual_clock_set_overrides() {
        let clock = ManualClock::epoch();
        let target = DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(365);

        clock.set(target);
        assert_eq!(clock.now(), target);
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}

//! # Atomicity Guard
//!
//! Every public operation that performs more than one balance mutation
//! (deposit, withdraw, payment execution, faucet/yield minting) acquires
//! its component's [`ReentrancyGuard`] before touching state. While the
//! guard is held, any nested attempt to enter a balance-mutating operation
//! on the same component fails — the caller sees a `ReentrantCall` error
//! instead of a partially applied state.
//!
//! The scope is RAII: the guard is released on every exit path, success or
//! error, when the [`TxScope`] drops.

use std::sync::atomic::{AtomicBool, Ordering};

/// A single-entry guard protecting a ledger's mutating operations.
///
/// Not a lock: a second entrant is rejected immediately rather than
/// blocked. This matches the ledger's execution model — mutating calls are
/// serialized by the embedding environment, so a contended guard always
/// means an illegal nested call, never a waiting peer.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    busy: AtomicBool,
}

impl ReentrancyGuard {
    /// Creates a released guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to enter the guarded section.
    ///
    /// Returns `None` if the guard is already held — the caller should
    /// surface this as a `ReentrantCall` error. On success the returned
    /// [`TxScope`] holds the guard until dropped.
    pub fn try_enter(&self) -> Option<TxScope<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()?;
        Some(TxScope { guard: self })
    }

    /// Returns `true` if a guarded operation is currently in flight.
    pub fn is_held(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// RAII scope for a guarded operation. Releases the guard on drop.
#[derive(Debug)]
pub struct TxScope<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for TxScope<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_and_release() {
        let guard = ReentrancyGuard::new();
        assert!(!guard.is_held());

        {
            let _scope = guard.try_enter().expect("first entry");
            assert!(guard.is_held());
        }

        assert!(!guard.is_held());
    }

    #[test]
    fn nested_entry_rejected() {
        let guard = ReentrancyGuard::new();
        let _outer = guard.try_enter().expect("first entry");
        assert!(guard.try_enter().is_none());
    }

    #[test]
    fn released_on_error_path() {
        let guard = ReentrancyGuard::new();

        // Simulate an operation failing mid-flight: the scope drops with
        // the error and the guard must be free again.
        let result: Result<(), &str> = (|| {
            let _scope = guard.try_enter().ok_or("reentrant")?;
            Err("validation failed")
        })();

        assert!(result.is_err());
        assert!(!guard.is_held());
        assert!(guard.try_enter().is_some());
    }

    #[test]
    fn sequential_entries_allowed() {
        let guard = ReentrancyGuard::new();
        for _ in 0..10 {
            let scope = guard.try_enter().expect("sequential entry");
            drop(scope);
        }
    }
}

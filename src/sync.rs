//! Lock helpers that shrug off poisoning
//!
//! Settings snapshots are immutable once installed, so a panic while a guard
//! was held cannot leave the protected data half-written. Every lock in the
//! crate goes through these traits and keeps working after a poisoning panic.

use log::warn;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn recover<G>(kind: &str, poisoned: PoisonError<G>) -> G {
    warn!("{kind} lock was poisoned by a panicking holder, recovering");
    poisoned.into_inner()
}

/// Poison-recovering `Mutex::lock`
pub trait MutexExt<T> {
    fn lock_recovered(&self) -> MutexGuard<'_, T>;
}

/// Poison-recovering `RwLock::read` / `RwLock::write`
pub trait RwLockExt<T> {
    fn read_recovered(&self) -> RwLockReadGuard<'_, T>;

    fn write_recovered(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> MutexExt<T> for Mutex<T> {
    fn lock_recovered(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|e| recover("Mutex", e))
    }
}

impl<T> RwLockExt<T> for RwLock<T> {
    fn read_recovered(&self) -> RwLockReadGuard<'_, T> {
        self.read().unwrap_or_else(|e| recover("RwLock read", e))
    }

    fn write_recovered(&self) -> RwLockWriteGuard<'_, T> {
        self.write().unwrap_or_else(|e| recover("RwLock write", e))
    }
}

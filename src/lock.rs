//! Per-slot mutual exclusion with a time-to-live.
//!
//! Acquisition never waits: a held, unexpired lock is reported as contention
//! and the caller decides what to tell its client. The TTL bounds how long a
//! holder that never released can keep a slot blocked.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::SlotId;

pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(5);
/// Shortest lease handed out. A zero TTL would expire on acquisition and let
/// a second booker in while the first is still writing.
pub const MIN_LOCK_TTL: Duration = Duration::from_millis(500);
pub const MAX_LOCK_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy)]
struct LockRecord {
    token: u64,
    expires_at: Instant,
}

/// Lock table keyed by slot id. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct SlotLocks {
    records: Arc<DashMap<SlotId, LockRecord>>,
    next_token: Arc<AtomicU64>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lock for `slot_id` unless someone else holds an unexpired one.
    ///
    /// `ttl` is clamped to `MIN_LOCK_TTL..=MAX_LOCK_TTL`.
    pub fn try_acquire(&self, slot_id: SlotId, ttl: Duration) -> Option<SlotLockGuard> {
        let now = Instant::now();
        let record = LockRecord {
            token: self.next_token.fetch_add(1, Ordering::Relaxed),
            expires_at: now + clamp_ttl(ttl),
        };

        match self.records.entry(slot_id) {
            Entry::Occupied(mut held) => {
                if held.get().expires_at > now {
                    debug!(slot_id, "Slot lock contended");
                    return None;
                }
                warn!(slot_id, "Taking over expired slot lock");
                held.insert(record);
            }
            Entry::Vacant(free) => {
                free.insert(record);
            }
        }

        Some(SlotLockGuard {
            locks: self.clone(),
            slot_id,
            token: record.token,
        })
    }

    /// Clears the lock for `slot_id` regardless of who holds it.
    pub fn release(&self, slot_id: SlotId) {
        self.records.remove(&slot_id);
    }

    pub fn is_locked(&self, slot_id: SlotId) -> bool {
        self.records
            .get(&slot_id)
            .map(|record| record.expires_at > Instant::now())
            .unwrap_or(false)
    }

    fn release_token(&self, slot_id: SlotId, token: u64) {
        self.records.remove_if(&slot_id, |_, record| record.token == token);
    }
}

pub fn clamp_ttl(ttl: Duration) -> Duration {
    ttl.clamp(MIN_LOCK_TTL, MAX_LOCK_TTL)
}

/// Held lock; released when dropped. Only clears the record it created, so a
/// holder that outlived its TTL cannot free a successor's lock.
#[derive(Debug)]
pub struct SlotLockGuard {
    locks: SlotLocks,
    slot_id: SlotId,
    token: u64,
}

impl SlotLockGuard {
    pub fn slot_id(&self) -> SlotId {
        self.slot_id
    }
}

impl Drop for SlotLockGuard {
    fn drop(&mut self) {
        self.locks.release_token(self.slot_id, self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_acquirer_is_rejected() {
        let locks = SlotLocks::new();
        let guard = locks.try_acquire(1, DEFAULT_LOCK_TTL).expect("first acquire");
        assert!(locks.try_acquire(1, DEFAULT_LOCK_TTL).is_none());
        assert!(locks.is_locked(1));

        drop(guard);
        assert!(!locks.is_locked(1));
        assert!(locks.try_acquire(1, DEFAULT_LOCK_TTL).is_some());
    }

    #[tokio::test]
    async fn test_slots_lock_independently() {
        let locks = SlotLocks::new();
        let _one = locks.try_acquire(1, DEFAULT_LOCK_TTL).unwrap();
        let two = locks.try_acquire(2, DEFAULT_LOCK_TTL);
        assert_eq!(two.map(|g| g.slot_id()), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_lock_is_taken_over() {
        let locks = SlotLocks::new();
        let stale = locks.try_acquire(7, Duration::from_secs(5)).unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(!locks.is_locked(7));
        let fresh = locks.try_acquire(7, Duration::from_secs(5)).expect("expired lock is free");

        // The stale holder finishing late must not free the new holder's lock.
        drop(stale);
        assert!(locks.is_locked(7));
        assert!(locks.try_acquire(7, Duration::from_secs(5)).is_none());
        drop(fresh);
        assert!(!locks.is_locked(7));
    }

    #[tokio::test]
    async fn test_zero_ttl_still_excludes() {
        let locks = SlotLocks::new();
        let _held = locks.try_acquire(4, Duration::ZERO).expect("first acquire");
        assert!(locks.is_locked(4));
        assert!(locks.try_acquire(4, Duration::ZERO).is_none());
    }

    #[tokio::test]
    async fn test_huge_ttl_does_not_overflow() {
        let locks = SlotLocks::new();
        let held = locks.try_acquire(5, Duration::MAX).expect("first acquire");
        assert!(locks.try_acquire(5, Duration::MAX).is_none());
        drop(held);
        assert!(locks.try_acquire(5, Duration::MAX).is_some());
    }

    #[test]
    fn test_ttl_clamping() {
        assert_eq!(clamp_ttl(Duration::ZERO), MIN_LOCK_TTL);
        assert_eq!(clamp_ttl(Duration::MAX), MAX_LOCK_TTL);
        assert_eq!(clamp_ttl(DEFAULT_LOCK_TTL), DEFAULT_LOCK_TTL);
    }

    #[tokio::test]
    async fn test_release_is_unconditional() {
        let locks = SlotLocks::new();
        let guard = locks.try_acquire(3, DEFAULT_LOCK_TTL).unwrap();
        locks.release(3);
        assert!(!locks.is_locked(3));
        drop(guard);
    }
}

//! Slot occupancy changes under the per-slot lock.
//!
//! Every read-check-write of `current_orders` happens while holding the
//! slot's [`SlotLockGuard`](crate::lock::SlotLockGuard); the guard is dropped
//! on every exit path, so a failed booking never leaves the slot locked.

use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{Slot, SlotId, SlotPatch, SlotStatus};
use crate::slot_actor::SlotError;
use crate::lock::SlotLocks;

const RELEASE_ATTEMPTS: u32 = 3;
const RELEASE_RETRY_DELAY: Duration = Duration::from_millis(10);

#[derive(Clone)]
pub struct CapacityManager {
    slots: ResourceClient<Slot>,
    locks: SlotLocks,
    lock_ttl: Duration,
}

impl CapacityManager {
    pub fn new(slots: ResourceClient<Slot>, locks: SlotLocks, lock_ttl: Duration) -> Self {
        Self { slots, locks, lock_ttl }
    }

    /// Takes one place in the slot. Fails fast with `Busy` when another
    /// booking holds the lock.
    #[instrument(skip(self))]
    pub async fn book(&self, slot_id: SlotId) -> Result<Slot, SlotError> {
        let _guard = self
            .locks
            .try_acquire(slot_id, self.lock_ttl)
            .ok_or(SlotError::Busy(slot_id))?;

        let slot = self.slots.get(slot_id).await?.ok_or(SlotError::NotFound(slot_id))?;
        if slot.current_orders >= slot.max_orders {
            if slot.status != SlotStatus::Full {
                self.slots
                    .update(slot_id, SlotPatch { current_orders: slot.current_orders })
                    .await?;
            }
            info!(slot_id, max_orders = slot.max_orders, "Slot full");
            return Err(SlotError::Full(slot_id));
        }

        let updated = self
            .slots
            .update(slot_id, SlotPatch { current_orders: slot.current_orders + 1 })
            .await?;
        info!(
            slot_id,
            current_orders = updated.current_orders,
            status = %updated.status,
            "Slot booked"
        );
        Ok(updated)
    }

    /// Gives one place back. Retries briefly on contention since the caller
    /// (a cancellation or a failed order) has nobody to hand `Busy` to.
    #[instrument(skip(self))]
    pub async fn release(&self, slot_id: SlotId) -> Result<Slot, SlotError> {
        let mut attempt = 1;
        loop {
            match self.try_release(slot_id).await {
                Err(SlotError::Busy(_)) if attempt < RELEASE_ATTEMPTS => {
                    debug!(slot_id, attempt, "Slot lock busy, retrying release");
                    attempt += 1;
                    tokio::time::sleep(RELEASE_RETRY_DELAY).await;
                }
                result => return result,
            }
        }
    }

    async fn try_release(&self, slot_id: SlotId) -> Result<Slot, SlotError> {
        let _guard = self
            .locks
            .try_acquire(slot_id, self.lock_ttl)
            .ok_or(SlotError::Busy(slot_id))?;

        let slot = self.slots.get(slot_id).await?.ok_or(SlotError::NotFound(slot_id))?;
        if slot.current_orders == 0 {
            warn!(slot_id, "Release on empty slot ignored");
            return Ok(slot);
        }
        let updated = self
            .slots
            .update(slot_id, SlotPatch { current_orders: slot.current_orders - 1 })
            .await?;
        info!(slot_id, current_orders = updated.current_orders, "Slot place released");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::domain::SlotCreate;
    use crate::lock::DEFAULT_LOCK_TTL;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    async fn manager_with_slot(max_orders: u32) -> (CapacityManager, SlotLocks, SlotId) {
        manager_with_slot_ttl(max_orders, DEFAULT_LOCK_TTL).await
    }

    async fn manager_with_slot_ttl(
        max_orders: u32,
        lock_ttl: Duration,
    ) -> (CapacityManager, SlotLocks, SlotId) {
        let ids = Arc::new(AtomicU64::new(1));
        let (actor, client) = ResourceActor::<Slot>::new(64, move || ids.fetch_add(1, Ordering::SeqCst));
        tokio::spawn(actor.run());
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let slot_id = client
            .create(SlotCreate {
                vendor_id: 1,
                start_time: start,
                end_time: start + ChronoDuration::minutes(30),
                max_orders,
            })
            .await
            .unwrap();
        let locks = SlotLocks::new();
        (CapacityManager::new(client, locks.clone(), lock_ttl), locks, slot_id)
    }

    #[tokio::test]
    async fn test_book_until_full() {
        let (manager, locks, slot_id) = manager_with_slot(2).await;

        assert_eq!(manager.book(slot_id).await.unwrap().current_orders, 1);
        let second = manager.book(slot_id).await.unwrap();
        assert_eq!((second.current_orders, second.status), (2, SlotStatus::Full));
        assert_eq!(manager.book(slot_id).await, Err(SlotError::Full(slot_id)));
        assert!(!locks.is_locked(slot_id));
    }

    #[tokio::test]
    async fn test_contended_slot_is_busy() {
        let (manager, locks, slot_id) = manager_with_slot(5).await;
        let _held = locks.try_acquire(slot_id, DEFAULT_LOCK_TTL).unwrap();

        let err = manager.book(slot_id).await.unwrap_err();
        assert_eq!(err, SlotError::Busy(slot_id));
        assert_eq!(err.status_code(), 429);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_slot_releases_lock() {
        let (manager, locks, _) = manager_with_slot(1).await;
        assert_eq!(manager.book(99).await, Err(SlotError::NotFound(99)));
        assert!(!locks.is_locked(99));
    }

    #[tokio::test]
    async fn test_release_never_goes_below_zero() {
        let (manager, _, slot_id) = manager_with_slot(1).await;
        manager.book(slot_id).await.unwrap();

        let freed = manager.release(slot_id).await.unwrap();
        assert_eq!((freed.current_orders, freed.status), (0, SlotStatus::Available));
        assert_eq!(manager.release(slot_id).await.unwrap().current_orders, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_gives_up_on_persistent_contention() {
        let (manager, locks, slot_id) = manager_with_slot(1).await;
        manager.book(slot_id).await.unwrap();
        let _held = locks.try_acquire(slot_id, DEFAULT_LOCK_TTL).unwrap();

        assert_eq!(manager.release(slot_id).await, Err(SlotError::Busy(slot_id)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bookings_never_oversell() {
        let (manager, _, slot_id) = manager_with_slot(7).await;

        let mut tasks = Vec::new();
        for _ in 0..64 {
            let manager = manager.clone();
            tasks.push(tokio::spawn(async move {
                // Retry contention until the slot answers definitively.
                loop {
                    match manager.book(slot_id).await {
                        Err(SlotError::Busy(_)) => tokio::task::yield_now().await,
                        other => return other,
                    }
                }
            }));
        }

        let mut booked = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(slot) => {
                    assert!(slot.current_orders <= slot.max_orders);
                    booked += 1;
                }
                Err(e) => assert_eq!(e, SlotError::Full(slot_id)),
            }
        }
        assert_eq!(booked, 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_zero_lock_ttl_still_counts_every_booking() {
        let (manager, _, slot_id) = manager_with_slot_ttl(1000, Duration::ZERO).await;

        let mut tasks = Vec::new();
        for _ in 0..200 {
            let manager = manager.clone();
            tasks.push(tokio::spawn(async move {
                loop {
                    match manager.book(slot_id).await {
                        Err(SlotError::Busy(_)) => tokio::task::yield_now().await,
                        other => return other,
                    }
                }
            }));
        }

        let mut booked = 0;
        for task in tasks {
            task.await.unwrap().unwrap();
            booked += 1;
        }
        let slot = manager.slots.get(slot_id).await.unwrap().unwrap();
        assert_eq!(slot.current_orders, booked);
    }
}

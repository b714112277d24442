//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! [`create_mock_client`] returns a real [`ResourceClient`] whose requests land
//! on a receiver the test owns. The `expect_*` helpers pop the next request,
//! check its kind, and hand back its payload and responder so the test can
//! play the actor's part.

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use tokio::sync::{mpsc, oneshot};

pub type Responder<R, T> = oneshot::Sender<Result<R, FrameworkError<<T as Entity>::Error>>>;

/// Creates a mock client and a receiver for asserting requests.
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Responder<T::Id, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Responder<Option<T>, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

pub async fn expect_update<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Patch, Responder<T, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Responder<T::ActionResult, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::CapacityManager;
    use crate::domain::{Role, Slot, SlotStatus, User, UserCreate};
    use crate::lock::{SlotLocks, DEFAULT_LOCK_TTL};
    use crate::slot_actor::SlotError;
    use chrono::{Duration, TimeZone, Utc};

    fn slot(current_orders: u32, max_orders: u32, status: SlotStatus) -> Slot {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        Slot {
            id: 5,
            vendor_id: 1,
            start_time: start,
            end_time: start + Duration::minutes(30),
            max_orders,
            current_orders,
            status,
        }
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let create_task = tokio::spawn(async move {
            client.create(UserCreate::new("Test", "+911", Role::Student)).await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Test");
        responder.send(Ok(1)).unwrap();

        assert_eq!(create_task.await.unwrap(), Ok(1));
    }

    #[tokio::test]
    async fn test_book_reads_then_writes_under_lock() {
        let (client, mut receiver) = create_mock_client::<Slot>(10);
        let locks = SlotLocks::new();
        let manager = CapacityManager::new(client, locks.clone(), DEFAULT_LOCK_TTL);

        let book_task = tokio::spawn(async move { manager.book(5).await });

        let (slot_id, responder) = expect_get(&mut receiver).await.expect("Expected Slot Get");
        assert_eq!(slot_id, 5);
        assert!(locks.is_locked(5));
        responder.send(Ok(Some(slot(6, 10, SlotStatus::Available)))).unwrap();

        let (slot_id, patch, responder) = expect_update(&mut receiver).await.expect("Expected Slot Update");
        assert_eq!((slot_id, patch.current_orders), (5, 7));
        responder.send(Ok(slot(7, 10, SlotStatus::Limited))).unwrap();

        let booked = book_task.await.unwrap().unwrap();
        assert_eq!(booked.status, SlotStatus::Limited);
        assert!(!locks.is_locked(5));
    }

    #[tokio::test]
    async fn test_full_slot_is_not_written_again() {
        let (client, mut receiver) = create_mock_client::<Slot>(10);
        let manager = CapacityManager::new(client, SlotLocks::new(), DEFAULT_LOCK_TTL);

        let book_task = tokio::spawn(async move { manager.book(5).await });

        let (_, responder) = expect_get(&mut receiver).await.expect("Expected Slot Get");
        responder.send(Ok(Some(slot(10, 10, SlotStatus::Full)))).unwrap();

        assert_eq!(book_task.await.unwrap(), Err(SlotError::Full(5)));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_status_is_corrected_when_full() {
        let (client, mut receiver) = create_mock_client::<Slot>(10);
        let manager = CapacityManager::new(client, SlotLocks::new(), DEFAULT_LOCK_TTL);

        let book_task = tokio::spawn(async move { manager.book(5).await });

        let (_, responder) = expect_get(&mut receiver).await.expect("Expected Slot Get");
        responder.send(Ok(Some(slot(3, 3, SlotStatus::Limited)))).unwrap();
        let (_, patch, responder) = expect_update(&mut receiver).await.expect("Expected Slot Update");
        assert_eq!(patch.current_orders, 3);
        responder.send(Ok(slot(3, 3, SlotStatus::Full))).unwrap();

        assert_eq!(book_task.await.unwrap(), Err(SlotError::Full(5)));
    }

    #[tokio::test]
    async fn test_dropped_actor_surfaces_as_communication_error() {
        let (client, mut receiver) = create_mock_client::<Slot>(10);
        let manager = CapacityManager::new(client, SlotLocks::new(), DEFAULT_LOCK_TTL);

        let book_task = tokio::spawn(async move { manager.book(5).await });
        let (_, responder) = expect_get(&mut receiver).await.expect("Expected Slot Get");
        drop(responder);

        assert!(matches!(
            book_task.await.unwrap(),
            Err(SlotError::ActorCommunicationError(_))
        ));
    }
}

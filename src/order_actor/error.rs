use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{MenuItemId, OrderId, SlotId, UserId};
use crate::menu_actor::MenuError;
use crate::policy::GateError;
use crate::slot_actor::SlotError;
use crate::user_actor::UserError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),
    #[error("Slot not found: {0}")]
    SlotNotFound(SlotId),
    #[error("User not found: {0}")]
    UserNotFound(UserId),
    #[error("Menu item {0} not found")]
    MenuItemNotFound(MenuItemId),
    #[error("Menu item {0} not available")]
    MenuItemUnavailable(MenuItemId),
    #[error("Item does not belong to this vendor")]
    ForeignMenuItem(MenuItemId),
    #[error("Invalid quantity for menu item {0}")]
    InvalidQuantity(MenuItemId),
    #[error("{0}")]
    InvalidTransition(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("Order is not ready for pickup")]
    NotReadyForPickup(OrderId),
    #[error("Invalid QR code or pickup not allowed")]
    InvalidQrCode,
    #[error("Order was cancelled")]
    Cancelled(OrderId),
    #[error("Duplicate request")]
    DuplicateRequest,
    #[error("Original order not found or not eligible for reorder")]
    NotEligibleForReorder(OrderId),
    #[error("Order is too old for reorder")]
    ReorderTooOld(OrderId),
    #[error("No items found in original order")]
    EmptyReorder(OrderId),
    #[error("No available slots for reorder")]
    NoSlotForReorder,
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::NotFound(_)
            | OrderError::SlotNotFound(_)
            | OrderError::UserNotFound(_)
            | OrderError::NotEligibleForReorder(_) => 404,
            OrderError::MenuItemNotFound(_)
            | OrderError::MenuItemUnavailable(_)
            | OrderError::ForeignMenuItem(_)
            | OrderError::InvalidQuantity(_)
            | OrderError::InvalidTransition(_)
            | OrderError::NotReadyForPickup(_)
            | OrderError::InvalidQrCode
            | OrderError::Cancelled(_)
            | OrderError::ReorderTooOld(_)
            | OrderError::EmptyReorder(_)
            | OrderError::NoSlotForReorder => 400,
            OrderError::Forbidden(_) => 403,
            OrderError::DuplicateRequest => 409,
            OrderError::Gate(gate) => gate.status_code(),
            OrderError::Slot(slot) => slot.status_code(),
            OrderError::ActorCommunicationError(_) => 500,
        }
    }
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(e: FrameworkError<OrderError>) -> Self {
        match e {
            FrameworkError::Entity(e) => e,
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<UserError> for OrderError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(id) => OrderError::UserNotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<MenuError> for OrderError {
    fn from(e: MenuError) -> Self {
        match e {
            MenuError::NotFound(id) => OrderError::MenuItemNotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

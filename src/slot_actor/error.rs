use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{SlotId, UserId};
use crate::policy::GateError;
use crate::user_actor::UserError;

/// Errors that can occur during slot operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SlotError {
    #[error("Slot not found: {0}")]
    NotFound(SlotId),
    #[error("Slot is being booked, try again")]
    Busy(SlotId),
    #[error("Slot full")]
    Full(SlotId),
    #[error("Invalid slot timing")]
    InvalidTiming,
    #[error("User not found: {0}")]
    UserNotFound(UserId),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error("Occupancy {current} exceeds capacity {max}")]
    OverCapacity { current: u32, max: u32 },
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl SlotError {
    pub fn status_code(&self) -> u16 {
        match self {
            SlotError::NotFound(_) | SlotError::UserNotFound(_) => 404,
            SlotError::Busy(_) => 429,
            SlotError::Full(_) | SlotError::InvalidTiming => 400,
            SlotError::Forbidden(_) => 403,
            SlotError::Gate(gate) => gate.status_code(),
            SlotError::OverCapacity { .. } | SlotError::ActorCommunicationError(_) => 500,
        }
    }

    /// Contention is expected under load; the same request may succeed shortly.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SlotError::Busy(_))
    }
}

impl From<FrameworkError<SlotError>> for SlotError {
    fn from(e: FrameworkError<SlotError>) -> Self {
        match e {
            FrameworkError::Entity(e) => e,
            other => SlotError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<UserError> for SlotError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(id) => SlotError::UserNotFound(id),
            other => SlotError::ActorCommunicationError(other.to_string()),
        }
    }
}

use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::UserId;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(UserId),
    #[error("User validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl UserError {
    pub fn status_code(&self) -> u16 {
        match self {
            UserError::NotFound(_) => 404,
            UserError::ValidationError(_) => 400,
            UserError::ActorCommunicationError(_) => 500,
        }
    }
}

impl From<FrameworkError<UserError>> for UserError {
    fn from(e: FrameworkError<UserError>) -> Self {
        match e {
            FrameworkError::Entity(e) => e,
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}

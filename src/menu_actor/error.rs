use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::MenuItemId;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MenuError {
    #[error("Menu item not found: {0}")]
    NotFound(MenuItemId),
    #[error("Invalid price: {0}")]
    InvalidPrice(i64),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<MenuError>> for MenuError {
    fn from(e: FrameworkError<MenuError>) -> Self {
        match e {
            FrameworkError::Entity(e) => e,
            other => MenuError::ActorCommunicationError(other.to_string()),
        }
    }
}

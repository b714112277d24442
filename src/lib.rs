//! Campus pickup-slot booking.
//!
//! Vendors publish pickup slots with a fixed order capacity; customers book
//! places and place orders against them. Each entity kind lives in its own
//! resource actor, and occupancy changes are serialized per slot by a
//! fail-fast lock (see [`capacity`]). [`PickupSystem`] starts everything.

pub mod actor_framework;
pub mod app_system;
pub mod capacity;
pub mod clients;
pub mod clock;
pub mod config;
pub mod domain;
pub mod idempotency;
pub mod insight;
pub mod lock;
pub mod menu_actor;
pub mod notifications;
pub mod order_actor;
pub mod policy;
pub mod rewards;
pub mod slot_actor;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, Collaborators, PickupSystem};
pub use config::AppConfig;

//! Slot storage. Occupancy is only written by the capacity manager while it
//! holds the slot's lock; see [`crate::capacity`].

pub mod entity;
pub mod error;

pub use error::*;

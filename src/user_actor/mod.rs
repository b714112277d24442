//! Account directory; supplies roles and notification addresses.

pub mod entity;
pub mod error;

pub use error::*;

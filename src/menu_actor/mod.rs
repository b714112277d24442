//! Vendor menus. Orders read prices from here at placement time.

pub mod entity;
pub mod error;

pub use error::*;

//! System orchestration, startup, and shutdown logic.

mod collaborators;
mod pickup_system;
pub mod tracing;

pub use collaborators::*;
pub use pickup_system::*;
pub use self::tracing::setup_tracing;

//! Order storage and the order state machine.
//!
//! Status changes run as entity actions inside the order actor, so the
//! permission check, the status write and the history append happen as one
//! step.

mod actions;
pub mod entity;
pub mod error;
pub mod transitions;

pub use actions::*;
pub use error::*;
pub use transitions::Party;

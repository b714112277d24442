//! Typed front doors to the resource actors. Cross-actor workflows (booking,
//! order placement, status changes) are orchestrated here, on the caller's
//! task, never inside an actor.

#[macro_use]
mod macros;

mod menu_client;
mod order_client;
mod slot_client;
mod user_client;

pub use menu_client::*;
pub use order_client::*;
pub use slot_client::*;
pub use user_client::*;

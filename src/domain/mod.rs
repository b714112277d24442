pub mod user;
pub mod menu;
pub mod slot;
pub mod order;

pub use user::*;
pub use menu::*;
pub use slot::*;
pub use order::*;

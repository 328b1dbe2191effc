//! User domain entities.

pub mod model;
pub mod role;

pub use model::{Principal, User};
pub use role::UserRole;

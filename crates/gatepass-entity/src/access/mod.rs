//! Gate access log entities.

pub mod model;

pub use model::{AccessEvent, ClientInfo, NewAccessEvent};

//! Core traits defined in `gatepass-core` and implemented or consumed by other crates.

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

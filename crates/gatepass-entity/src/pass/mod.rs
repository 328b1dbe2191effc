//! QR pass ledger entities.

pub mod token;

pub use token::{IssuedToken, NewIssuedToken};

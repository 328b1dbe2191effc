//! QR pass token codec.
//!
//! A pass is an HS256 JWT binding a subject, a nonce, and a short expiry.
//! The codec only proves authenticity and freshness; single use is the
//! ledger's job.

pub mod claims;
pub mod codec;

pub use claims::PassClaims;
pub use codec::{InvalidPass, PassCodec};

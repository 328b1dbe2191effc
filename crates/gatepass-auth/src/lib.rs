//! # gatepass-auth
//!
//! Token handling for GatePass.
//!
//! ## Modules
//!
//! - `jwt`: bearer session tokens that authenticate principals
//! - `pass`: compact signed, expiring QR pass tokens

pub mod jwt;
pub mod pass;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use pass::{InvalidPass, PassClaims, PassCodec};

//! Signing and verification of QR passes.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use gatepass_core::config::QrConfig;
use gatepass_core::error::AppError;

use super::claims::{PASS_TOKEN_TYPE, PassClaims};

/// Why a presented pass was rejected by the codec.
///
/// All variants surface to gate operators as the same
/// `invalid_or_expired` reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidPass {
    /// Not a well-formed JWT, or the payload does not match [`PassClaims`].
    #[error("malformed pass")]
    Malformed,
    /// The HMAC does not match.
    #[error("bad pass signature")]
    BadSignature,
    /// The token is a valid JWT but not a QR pass.
    #[error("not a QR pass")]
    WrongType,
    /// `now >= exp`.
    #[error("pass expired")]
    Expired,
}

/// Creates and verifies signed, expiring QR passes.
///
/// HMAC comparison happens inside `jsonwebtoken`'s crypto backend, which
/// verifies MACs in constant time.
#[derive(Clone)]
pub struct PassCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for PassCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassCodec").finish_non_exhaustive()
    }
}

impl PassCodec {
    /// Creates a codec from the QR configuration.
    pub fn new(config: &QrConfig) -> Self {
        Self::from_secret(config.secret.as_bytes())
    }

    /// Creates a codec from a raw secret.
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `verify`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub", "jti"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a pass for `subject_id` carrying `nonce`, valid for
    /// `ttl_seconds` from `issued_at` (truncated to whole seconds).
    pub fn issue(
        &self,
        subject_id: Uuid,
        nonce: Uuid,
        ttl_seconds: u64,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        if ttl_seconds == 0 {
            return Err(AppError::validation("Pass TTL must be positive"));
        }
        let ttl = i64::try_from(ttl_seconds)
            .map_err(|_| AppError::validation("Pass TTL is out of range"))?;

        let iat = issued_at.timestamp();
        let claims = PassClaims {
            sub: subject_id,
            jti: nonce,
            typ: PASS_TOKEN_TYPE.to_string(),
            iat,
            exp: iat
                .checked_add(ttl)
                .ok_or_else(|| AppError::validation("Pass TTL is out of range"))?,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign pass: {e}")))
    }

    /// Check signature, shape, and expiry of `token` at `now`.
    ///
    /// Side-effect free: never touches the ledger.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<PassClaims, InvalidPass> {
        let claims = decode::<PassClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature => InvalidPass::BadSignature,
                _ => InvalidPass::Malformed,
            })?
            .claims;

        if claims.typ != PASS_TOKEN_TYPE {
            return Err(InvalidPass::WrongType);
        }
        if claims.exp <= claims.iat {
            return Err(InvalidPass::Malformed);
        }
        if now.timestamp() >= claims.exp {
            return Err(InvalidPass::Expired);
        }

        Ok(claims)
    }
}

//! Session JWT validation.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use gatepass_core::config::AuthConfig;
use gatepass_core::error::AppError;
use gatepass_core::traits::Clock;

use super::claims::{Claims, SESSION_TOKEN_TYPE};

/// Validates bearer session tokens.
///
/// Expiry is checked against the injected [`Clock`] rather than by
/// `jsonwebtoken` so that the whole server shares one time source.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            leeway_seconds: config.leeway_seconds as i64,
            clock,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Every failure maps to the same generic authentication error.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                AppError::authentication("Invalid or expired token")
            })?
            .claims;

        if claims.typ != SESSION_TOKEN_TYPE {
            return Err(AppError::authentication("Invalid or expired token"));
        }

        if self.clock.now().timestamp() >= claims.exp + self.leeway_seconds {
            return Err(AppError::authentication("Invalid or expired token"));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use chrono::{Duration, TimeZone, Utc};
    use gatepass_core::traits::ManualClock;
    use gatepass_entity::user::{Principal, UserRole};
    use uuid::Uuid;

    fn principal() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            username: "guard".to_string(),
            display_name: "Gate Guard".to_string(),
            role: UserRole::Security,
            shift: None,
        }
    }

    fn setup() -> (Arc<ManualClock>, JwtEncoder, JwtDecoder) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap(),
        ));
        let config = AuthConfig::default();
        let encoder = JwtEncoder::new(&config, clock.clone());
        let decoder = JwtDecoder::new(&config, clock.clone());
        (clock, encoder, decoder)
    }

    #[test]
    fn test_roundtrip_preserves_principal() {
        let (_clock, encoder, decoder) = setup();
        let p = principal();
        let (token, _) = encoder.generate_access_token(&p).unwrap();
        let claims = decoder.decode_access_token(&token).unwrap();
        assert_eq!(claims.principal(), p);
    }

    #[test]
    fn test_expired_after_ttl_and_leeway() {
        let (clock, encoder, decoder) = setup();
        let (token, _) = encoder.generate_access_token(&principal()).unwrap();

        clock.advance(Duration::minutes(60) + Duration::seconds(4));
        assert!(decoder.decode_access_token(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(decoder.decode_access_token(&token).is_err());
    }

    #[test]
    fn test_rejects_foreign_secret() {
        let (clock, _encoder, decoder) = setup();
        let other = AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..AuthConfig::default()
        };
        let (token, _) = JwtEncoder::new(&other, clock)
            .generate_access_token(&principal())
            .unwrap();
        assert!(decoder.decode_access_token(&token).is_err());
    }
}

//! Session JWT creation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use gatepass_core::config::AuthConfig;
use gatepass_core::error::AppError;
use gatepass_core::traits::Clock;
use gatepass_entity::user::Principal;

use super::claims::{Claims, SESSION_TOKEN_TYPE};

/// Creates signed bearer session tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(config.jwt_access_ttl_minutes as i64),
            clock,
        }
    }

    /// Generates an access token for `principal`.
    pub fn generate_access_token(
        &self,
        principal: &Principal,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = self.clock.now();
        let exp = now + self.access_ttl;

        let claims = Claims {
            sub: principal.id,
            username: principal.username.clone(),
            name: principal.display_name.clone(),
            role: principal.role,
            shift: principal.shift.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
            typ: SESSION_TOKEN_TYPE.to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok((token, exp))
    }
}

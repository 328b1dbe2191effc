//! QR pass configuration.

use serde::{Deserialize, Serialize};

/// Settings for issuing and verifying QR passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    /// HMAC-SHA256 secret used to sign passes. Must differ from the session secret.
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Lifetime of a pass in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Page the gate opens; the token is added as the `token` query parameter.
    #[serde(default = "default_verify_page_url")]
    pub verify_page_url: String,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            ttl_seconds: default_ttl(),
            verify_page_url: default_verify_page_url(),
        }
    }
}

fn default_secret() -> String {
    "CHANGE_ME_QR_SECRET".to_string()
}

fn default_ttl() -> u64 {
    60
}

fn default_verify_page_url() -> String {
    "http://localhost:8080/paginas/validar.html".to_string()
}

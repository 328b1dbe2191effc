//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatepass_entity::access::ClientInfo;
use gatepass_entity::user::Principal;

/// Context for the current authenticated request.
///
/// Built by the API extractor and passed into service methods so that
/// every operation knows *who* is acting and from *where*.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated principal.
    pub principal: Principal,
    /// Network metadata of the caller.
    pub client: ClientInfo,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(principal: Principal, client: ClientInfo, request_time: DateTime<Utc>) -> Self {
        Self {
            principal,
            client,
            request_time,
        }
    }

    /// Returns whether the current principal is an admin.
    pub fn is_admin(&self) -> bool {
        self.principal.role.is_admin()
    }
}

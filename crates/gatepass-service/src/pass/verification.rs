//! Pass verification at the gate.
//!
//! A pass moves `ISSUED -> CONSUMED | EXPIRED | UNKNOWN`; forged or stale
//! tokens are rejected before the ledger is consulted. Nothing is written
//! until the ledger consume step, and the ledger lets at most one caller
//! past it per nonce, so at most one access event exists per pass.

use std::sync::Arc;

use tracing::{debug, error, info};
use uuid::Uuid;

use gatepass_auth::pass::PassCodec;
use gatepass_core::traits::Clock;
use gatepass_database::store::{AccessLog, ConsumeOutcome, TokenLedger, UserDirectory};
use gatepass_entity::access::{ClientInfo, NewAccessEvent};

use super::outcome::{AdmittedPass, PassHolder, RejectReason, VerificationOutcome};
use crate::shift::ShiftClassifier;

/// Validates presented passes exactly once and records access events.
#[derive(Clone)]
pub struct VerificationService {
    codec: Arc<PassCodec>,
    ledger: Arc<dyn TokenLedger>,
    users: Arc<dyn UserDirectory>,
    access_log: Arc<dyn AccessLog>,
    shifts: ShiftClassifier,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for VerificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationService")
            .field("shifts", &self.shifts)
            .finish_non_exhaustive()
    }
}

impl VerificationService {
    /// Creates a new verification service.
    pub fn new(
        codec: Arc<PassCodec>,
        ledger: Arc<dyn TokenLedger>,
        users: Arc<dyn UserDirectory>,
        access_log: Arc<dyn AccessLog>,
        shifts: ShiftClassifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            ledger,
            users,
            access_log,
            shifts,
            clock,
        }
    }

    /// Verify `token` presented by `client`.
    ///
    /// Never fails: storage errors become [`RejectReason::ServerError`].
    pub async fn verify(&self, token: Option<&str>, client: ClientInfo) -> VerificationOutcome {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return VerificationOutcome::Rejected(RejectReason::Missing);
        };

        let claims = match self.codec.verify(token, self.clock.now()) {
            Ok(claims) => claims,
            Err(reason) => {
                debug!(%reason, "Pass rejected by codec");
                return VerificationOutcome::Rejected(RejectReason::InvalidOrExpired);
            }
        };
        let nonce = claims.nonce();

        let (subject_id, scanned_at) =
            match self.ledger.try_consume(nonce, self.clock.now()).await {
                Ok(ConsumeOutcome::Consumed {
                    subject_id,
                    consumed_at,
                }) => (subject_id, consumed_at),
                Ok(ConsumeOutcome::AlreadyConsumed) => {
                    return rejected(RejectReason::Reused, nonce, claims.sub, "Pass reuse rejected");
                }
                Ok(ConsumeOutcome::Expired) => {
                    return rejected(
                        RejectReason::Expired,
                        nonce,
                        claims.sub,
                        "Pass expired in ledger",
                    );
                }
                Ok(ConsumeOutcome::Unknown) => {
                    return rejected(
                        RejectReason::Unknown,
                        nonce,
                        claims.sub,
                        "Signed pass has no ledger entry",
                    );
                }
                Err(e) => {
                    error!(%nonce, error = %e, "Failed to consume pass");
                    return VerificationOutcome::Rejected(RejectReason::ServerError);
                }
            };

        if subject_id != claims.sub {
            error!(
                %nonce,
                token_subject = %claims.sub,
                ledger_subject = %subject_id,
                "Pass subject disagrees with ledger"
            );
            return VerificationOutcome::Rejected(RejectReason::Unknown);
        }

        let user = match self.users.find_by_id(subject_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return rejected(
                    RejectReason::UnknownUser,
                    nonce,
                    subject_id,
                    "Pass holder no longer exists",
                );
            }
            Err(e) => {
                error!(%nonce, %subject_id, error = %e, "Failed to load pass holder");
                return VerificationOutcome::Rejected(RejectReason::ServerError);
            }
        };

        let within_shift = self.shifts.classify(scanned_at, user.shift.as_deref());
        let event = NewAccessEvent::snapshot(nonce, &user, scanned_at, within_shift, client);

        let recorded = match self.access_log.append(&event).await {
            Ok(recorded) => recorded,
            Err(e) => {
                error!(%nonce, %subject_id, error = %e, "Failed to record access event");
                return VerificationOutcome::Rejected(RejectReason::ServerError);
            }
        };

        info!(
            %nonce,
            %subject_id,
            within_shift,
            scanned_at = %recorded.scanned_at,
            "Pass admitted"
        );

        VerificationOutcome::Valid(AdmittedPass {
            user: PassHolder::from(&user),
            nonce,
            issued_at: claims.iat,
            expires_at: claims.exp,
            scanned_at: recorded.scanned_at,
            within_shift,
        })
    }
}

/// Log a rejection at a level matching its cause and return it.
fn rejected(
    reason: RejectReason,
    nonce: Uuid,
    subject_id: Uuid,
    message: &'static str,
) -> VerificationOutcome {
    if reason.is_integrity_violation() {
        error!(%nonce, %subject_id, %reason, "{message}");
    } else {
        info!(%nonce, %subject_id, %reason, "{message}");
    }
    VerificationOutcome::Rejected(reason)
}

//! The consent ledger. Append-only: a revocation is a new record, the
//! grant it supersedes is never touched, and the current state of a
//! (principal, category) pair is whichever record was inserted last.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    AuditEvent, AuditEventKind, ConsentCategory, ConsentRecord, ConsentState, RequestOrigin,
    ResourceType, RevokeOutcome,
};
use crate::error::{ApiError, ApiResult};
use crate::store::ConsentStore;

use super::audit_trail::AuditTrailRecorder;

pub struct ConsentLedger {
    store: Arc<dyn ConsentStore>,
    recorder: AuditTrailRecorder,
}

impl ConsentLedger {
    pub fn new(store: Arc<dyn ConsentStore>, recorder: AuditTrailRecorder) -> Self {
        Self { store, recorder }
    }

    /// Append a grant record. Granting twice appends twice; history keeps
    /// both.
    pub async fn grant(
        &self,
        principal_id: Uuid,
        category: ConsentCategory,
        origin: &RequestOrigin,
        policy_version: &str,
    ) -> ApiResult<ConsentRecord> {
        let record = ConsentRecord::new(principal_id, category.clone(), true, origin, policy_version);
        let stored = self
            .store
            .append(record)
            .await
            .map_err(|e| ApiError::System(format!("consent append failed: {e}")))?;

        self.recorder
            .record(
                AuditEvent::new(AuditEventKind::ConsentGranted, origin.clone())
                    .by(principal_id)
                    .on(ResourceType::ConsentRecord, stored.id)
                    .with_detail(serde_json::json!({
                        "category": category.code(),
                        "policy_version": policy_version,
                    })),
            )
            .await;
        Ok(stored)
    }

    /// Append a revocation. Revoking a category that was never granted is
    /// a no-op with a deterministic outcome, not an error; revoking one
    /// already revoked reports when the revocation took effect.
    pub async fn revoke(
        &self,
        principal_id: Uuid,
        category: ConsentCategory,
        origin: &RequestOrigin,
        policy_version: &str,
    ) -> ApiResult<RevokeOutcome> {
        let latest = self
            .store
            .latest(principal_id, &category)
            .await
            .map_err(|e| ApiError::System(format!("consent lookup failed: {e}")))?;

        match latest {
            None => Ok(RevokeOutcome::NeverGranted),
            Some(record) if !record.granted => Ok(RevokeOutcome::AlreadyRevoked {
                since: record.created_at,
            }),
            Some(_) => {
                let record =
                    ConsentRecord::new(principal_id, category.clone(), false, origin, policy_version);
                let stored = self
                    .store
                    .append(record)
                    .await
                    .map_err(|e| ApiError::System(format!("consent append failed: {e}")))?;

                self.recorder
                    .record(
                        AuditEvent::new(AuditEventKind::ConsentRevoked, origin.clone())
                            .by(principal_id)
                            .on(ResourceType::ConsentRecord, stored.id)
                            .with_detail(serde_json::json!({
                                "category": category.code(),
                                "policy_version": policy_version,
                            })),
                    )
                    .await;
                Ok(RevokeOutcome::Revoked { record: stored })
            }
        }
    }

    /// Current state of the pair: latest record by insertion order, or
    /// None when no record exists.
    pub async fn current_state(
        &self,
        principal_id: Uuid,
        category: &ConsentCategory,
    ) -> ApiResult<Option<ConsentState>> {
        let latest = self
            .store
            .latest(principal_id, category)
            .await
            .map_err(|e| ApiError::System(format!("consent lookup failed: {e}")))?;
        Ok(latest.map(|record| ConsentState {
            granted: record.granted,
            since: record.created_at,
        }))
    }

    /// Full history for the pair, in insertion order.
    pub async fn history(
        &self,
        principal_id: Uuid,
        category: &ConsentCategory,
    ) -> ApiResult<Vec<ConsentRecord>> {
        self.store
            .history(principal_id, category)
            .await
            .map_err(|e| ApiError::System(format!("consent history failed: {e}")))
    }

    /// Whether the principal currently grants the category. Used by
    /// consent-gated operations; absence of any record reads as not
    /// granted.
    pub async fn is_granted(
        &self,
        principal_id: Uuid,
        category: &ConsentCategory,
    ) -> ApiResult<bool> {
        Ok(self
            .current_state(principal_id, category)
            .await?
            .map(|state| state.granted)
            .unwrap_or(false))
    }
}

//! Clinical record operations behind the access engine. Every handler
//! path funnels through here: resolve ownership, authorize, execute, then
//! report to the audit trail. Denials are audited with their specific
//! internal reason while the returned error stays generic on the wire.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    AuditEvent, AuditEventKind, ClinicalRecord, Decision, DenyReason, Operation, Principal,
    RequestOrigin, ResourceRef, ResourceType,
};
use crate::error::{ApiError, ApiResult};
use crate::store::{ClinicalRecordStore, RelationshipStore};

use super::access::AccessDecisionEngine;
use super::audit_trail::AuditTrailRecorder;

pub struct ClinicalRecordService {
    engine: Arc<AccessDecisionEngine>,
    relationships: Arc<dyn RelationshipStore>,
    records: Arc<dyn ClinicalRecordStore>,
    recorder: AuditTrailRecorder,
}

impl ClinicalRecordService {
    pub fn new(
        engine: Arc<AccessDecisionEngine>,
        relationships: Arc<dyn RelationshipStore>,
        records: Arc<dyn ClinicalRecordStore>,
        recorder: AuditTrailRecorder,
    ) -> Self {
        Self {
            engine,
            relationships,
            records,
            recorder,
        }
    }

    /// Create a doctor-authored clinical record for a patient. The
    /// assignment between author and patient is validated at creation
    /// time by the engine; the write lands exactly one
    /// `DataModification` entry with a null "before" snapshot.
    pub async fn create_record(
        &self,
        actor: &Principal,
        operation: Operation,
        resource_type: ResourceType,
        patient_id: Uuid,
        content: serde_json::Value,
        origin: &RequestOrigin,
    ) -> ApiResult<ClinicalRecord> {
        let record_id = Uuid::new_v4();
        let target = ResourceRef::new(resource_type, record_id, patient_id).authored_by(actor.id);

        let decision = self
            .engine
            .authorize(Some(actor), &operation, Some(&target))
            .await;
        if let Decision::Deny(reason) = decision {
            self.audit_denial(Some(actor), &operation, Some(&target), reason, origin)
                .await;
            return Err(deny_to_error(reason));
        }

        let now = Utc::now();
        let record = ClinicalRecord {
            id: record_id,
            resource_type,
            patient_id,
            doctor_id: Some(actor.id),
            content,
            created_at: now,
            updated_at: now,
            anonymized: false,
        };
        self.records
            .create(&record)
            .await
            .map_err(|e| ApiError::System(format!("record create failed: {e}")))?;

        self.recorder
            .record(
                AuditEvent::new(AuditEventKind::DataModification, origin.clone())
                    .by(actor.id)
                    .on(resource_type, record.id)
                    .with_diff(None, Some(record.content.clone())),
            )
            .await;
        Ok(record)
    }

    /// Read one clinical record. Sensitive reads are audited even though
    /// they change nothing; denials are audited with their reason.
    ///
    /// A missing record is reported as NotFound only once authorization
    /// has passed — for an admin, who may see anything. Any other caller
    /// gets the same generic denial as for a foreign record, so probing
    /// ids cannot reveal whether they exist.
    pub async fn read_record(
        &self,
        actor: Option<&Principal>,
        operation: Operation,
        resource_type: ResourceType,
        record_id: Uuid,
        origin: &RequestOrigin,
    ) -> ApiResult<ClinicalRecord> {
        let target = self
            .relationships
            .resource_ref(resource_type, record_id)
            .await
            .map_err(|e| ApiError::System(format!("ownership lookup failed: {e}")))?;

        let target = match target {
            Some(target) => target,
            None => {
                return match actor {
                    None => {
                        self.audit_denial(None, &operation, None, DenyReason::Unauthenticated, origin)
                            .await;
                        Err(deny_to_error(DenyReason::Unauthenticated))
                    }
                    Some(actor) if actor.role == crate::domain::Role::Admin => {
                        Err(ApiError::NotFound(resource_type.as_str().to_string()))
                    }
                    Some(actor) => {
                        self.audit_denial(
                            Some(actor),
                            &operation,
                            None,
                            DenyReason::NoMatchingRule,
                            origin,
                        )
                        .await;
                        Err(deny_to_error(DenyReason::NoMatchingRule))
                    }
                };
            }
        };

        let decision = self.engine.authorize(actor, &operation, Some(&target)).await;
        if let Decision::Deny(reason) = decision {
            self.audit_denial(actor, &operation, Some(&target), reason, origin)
                .await;
            return Err(deny_to_error(reason));
        }

        let record = self
            .records
            .find_by_id(record_id)
            .await
            .map_err(|e| ApiError::System(format!("record load failed: {e}")))?
            .ok_or_else(|| ApiError::NotFound(resource_type.as_str().to_string()))?;

        if operation.sensitive {
            let mut event = AuditEvent::new(AuditEventKind::DataAccess, origin.clone())
                .on(resource_type, record.id)
                .with_detail(serde_json::json!({"operation": operation.name}));
            if let Some(actor) = actor {
                event = event.by(actor.id);
            }
            self.recorder.record(event).await;
        }
        Ok(record)
    }

    async fn audit_denial(
        &self,
        actor: Option<&Principal>,
        operation: &Operation,
        target: Option<&ResourceRef>,
        reason: DenyReason,
        origin: &RequestOrigin,
    ) {
        let mut event = AuditEvent::new(AuditEventKind::AccessDenied, origin.clone())
            .with_detail(serde_json::json!({
                "operation": operation.name,
                "reason": reason.as_str(),
            }));
        if let Some(actor) = actor {
            event = event.by(actor.id);
        }
        if let Some(target) = target {
            event = event.on(target.resource_type, target.resource_id);
        }
        self.recorder.record(event).await;
    }
}

/// Unauthenticated denials surface as 401, everything else as a generic
/// 403 whose specific reason lives only in the audit trail and logs.
pub fn deny_to_error(reason: DenyReason) -> ApiError {
    match reason {
        DenyReason::Unauthenticated => {
            ApiError::Authentication(crate::error::AuthenticationError::MissingCredentials)
        }
        other => ApiError::Authorization(other),
    }
}

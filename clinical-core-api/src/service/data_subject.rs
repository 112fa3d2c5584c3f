//! Data-subject rights: the structured export of everything held about a
//! principal, and deletion scheduling. Medical records are exempt from
//! deletion: statutory retention outranks the deletion request, so the
//! sweep anonymizes identifying fields and keeps clinical content.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::domain::{
    AuditEvent, AuditEventKind, AuditFilter, DeletionSchedule, ExportedProfile, PageRequest,
    RequestOrigin, ResourceType, Role, StructuredExport,
};
use crate::error::{ApiError, ApiResult};
use crate::store::{ClinicalRecordStore, ConsentStore, PrincipalStore};

use super::audit_trail::AuditTrailRecorder;

/// Cap on audit entries included in one export document.
const EXPORT_AUDIT_LIMIT: usize = 1_000;

pub struct DataSubjectService {
    principals: Arc<dyn PrincipalStore>,
    clinical_records: Arc<dyn ClinicalRecordStore>,
    consents: Arc<dyn ConsentStore>,
    recorder: AuditTrailRecorder,
    config: CoreConfig,
}

impl DataSubjectService {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        clinical_records: Arc<dyn ClinicalRecordStore>,
        consents: Arc<dyn ConsentStore>,
        recorder: AuditTrailRecorder,
        config: CoreConfig,
    ) -> Self {
        Self {
            principals,
            clinical_records,
            consents,
            recorder,
            config,
        }
    }

    /// Aggregate profile, clinical data (patients only), full consent
    /// history and the recent audit window into one document. The export
    /// itself is an audited event.
    pub async fn export_all(
        &self,
        principal_id: Uuid,
        origin: &RequestOrigin,
    ) -> ApiResult<StructuredExport> {
        let principal = self.load(principal_id).await?;

        let clinical_records = if principal.role == Role::Patient {
            self.clinical_records
                .list_for_patient(principal_id)
                .await
                .map_err(|e| ApiError::System(format!("clinical record listing failed: {e}")))?
        } else {
            Vec::new()
        };

        let consent_history = self
            .consents
            .history_for_principal(principal_id)
            .await
            .map_err(|e| ApiError::System(format!("consent history failed: {e}")))?;

        let window_start = Utc::now()
            - chrono::Duration::from_std(self.config.export_audit_window)
                .unwrap_or(chrono::Duration::days(90));
        let recent_audit_history = self
            .recorder
            .query(
                &AuditFilter {
                    principal_id: Some(principal_id),
                    from: Some(window_start),
                    ..Default::default()
                },
                PageRequest::new(EXPORT_AUDIT_LIMIT, 0),
            )
            .await?
            .items;

        let export = StructuredExport {
            generated_at: Utc::now(),
            profile: ExportedProfile {
                id: principal.id,
                role: principal.role,
                email: principal.email.clone(),
                display_name: principal.display_name.clone(),
                created_at: principal.created_at,
                deletion_scheduled_for: principal.deletion_scheduled_for,
            },
            clinical_records,
            consent_history,
            recent_audit_history,
        };

        self.recorder
            .record(
                AuditEvent::new(AuditEventKind::DataExport, origin.clone())
                    .by(principal_id)
                    .on(ResourceType::Account, principal_id)
                    .with_detail(serde_json::json!({
                        "clinical_records": export.clinical_records.len(),
                        "consent_records": export.consent_history.len(),
                    })),
            )
            .await;
        Ok(export)
    }

    /// Schedule irreversible anonymization after the grace period.
    /// Idempotent: a second request while one is pending returns the
    /// existing schedule untouched instead of resetting the clock.
    pub async fn schedule_deletion(
        &self,
        principal_id: Uuid,
        origin: &RequestOrigin,
    ) -> ApiResult<DeletionSchedule> {
        let mut principal = self.load(principal_id).await?;

        if let Some(existing) = principal.deletion_scheduled_for {
            return Ok(DeletionSchedule {
                principal_id,
                scheduled_for: existing,
                newly_scheduled: false,
            });
        }

        let scheduled_for = Utc::now()
            + chrono::Duration::from_std(self.config.deletion_grace)
                .unwrap_or(chrono::Duration::days(30));
        principal.deletion_scheduled_for = Some(scheduled_for);
        principal.updated_at = Utc::now();
        self.principals
            .update(&principal)
            .await
            .map_err(|e| ApiError::System(format!("principal update failed: {e}")))?;

        self.recorder
            .record(
                AuditEvent::new(AuditEventKind::AccountDeletionScheduled, origin.clone())
                    .by(principal_id)
                    .on(ResourceType::Account, principal_id)
                    .with_detail(serde_json::json!({
                        "scheduled_for": scheduled_for,
                        "grace_days": self.config.deletion_grace.as_secs() / 86_400,
                    })),
            )
            .await;

        Ok(DeletionSchedule {
            principal_id,
            scheduled_for,
            newly_scheduled: true,
        })
    }

    async fn load(&self, principal_id: Uuid) -> ApiResult<crate::domain::Principal> {
        self.principals
            .find_by_id(principal_id)
            .await
            .map_err(|e| ApiError::System(format!("principal lookup failed: {e}")))?
            .ok_or_else(|| ApiError::NotFound("principal".to_string()))
    }
}

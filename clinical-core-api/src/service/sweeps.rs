//! Periodic background sweeps: the scheduled-deletion executor and the
//! inactive-account scan. Both are idempotent — a second run over the
//! same state touches nothing — and both audit every action they take.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::CoreConfig;
use crate::domain::{AuditEvent, AuditEventKind, RequestOrigin, ResourceType};
use crate::error::{ApiError, ApiResult};
use crate::store::{ClinicalRecordStore, PrincipalStore};

use super::audit_trail::AuditTrailRecorder;

/// Minimum gap between two inactivity notices for the same account.
const NOTICE_CADENCE: chrono::Duration = chrono::Duration::days(1);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub principals_anonymized: usize,
    pub clinical_records_anonymized: u64,
    pub inactivity_notices: usize,
}

pub struct SweepService {
    principals: Arc<dyn PrincipalStore>,
    clinical_records: Arc<dyn ClinicalRecordStore>,
    recorder: AuditTrailRecorder,
    config: CoreConfig,
}

impl SweepService {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        clinical_records: Arc<dyn ClinicalRecordStore>,
        recorder: AuditTrailRecorder,
        config: CoreConfig,
    ) -> Self {
        Self {
            principals,
            clinical_records,
            recorder,
            config,
        }
    }

    /// Execute deletion schedules whose grace period has elapsed.
    ///
    /// Profile fields are anonymized; clinical records linked to the
    /// principal keep their clinical content with direct identifiers
    /// stripped, because statutory retention outranks the deletion
    /// request. Already-anonymized principals are filtered by the store,
    /// which makes re-running the sweep a no-op.
    pub async fn run_deletion_sweep(&self, now: DateTime<Utc>) -> ApiResult<SweepReport> {
        let due = self
            .principals
            .list_deletions_due(now)
            .await
            .map_err(|e| ApiError::System(format!("deletion-due listing failed: {e}")))?;

        let mut report = SweepReport::default();
        let origin = RequestOrigin::internal("deletion-sweep");

        for mut principal in due {
            let principal_id = principal.id;
            let records_touched = self
                .clinical_records
                .anonymize_for_patient(principal_id)
                .await
                .map_err(|e| ApiError::System(format!("clinical anonymization failed: {e}")))?;

            principal.email = format!("anonymized-{principal_id}@retained.invalid");
            principal.display_name = "Anonymized".to_string();
            principal.credential_hash = String::new();
            principal.token_generation += 1;
            principal.anonymized = true;
            principal.updated_at = now;
            self.principals
                .update(&principal)
                .await
                .map_err(|e| ApiError::System(format!("principal update failed: {e}")))?;

            self.recorder
                .record(
                    AuditEvent::new(AuditEventKind::DataAnonymization, origin.clone())
                        .by(principal_id)
                        .on(ResourceType::Account, principal_id)
                        .with_detail(serde_json::json!({
                            "clinical_records_retained": records_touched,
                            "retention_years": self.config.medical_retention.as_secs() / (365 * 86_400),
                        })),
                )
                .await;

            report.principals_anonymized += 1;
            report.clinical_records_anonymized += records_touched;
        }

        if report.principals_anonymized > 0 {
            info!(
                anonymized = report.principals_anonymized,
                records = report.clinical_records_anonymized,
                "deletion sweep executed"
            );
        }
        Ok(report)
    }

    /// Flag accounts idle past the threshold. The per-principal notice
    /// timestamp keeps a same-day re-run from double-notifying.
    pub async fn run_inactivity_scan(&self, now: DateTime<Utc>) -> ApiResult<SweepReport> {
        let cutoff = now
            - chrono::Duration::from_std(self.config.inactivity_threshold)
                .unwrap_or(chrono::Duration::days(730));
        let inactive = self
            .principals
            .list_inactive_since(cutoff)
            .await
            .map_err(|e| ApiError::System(format!("inactivity listing failed: {e}")))?;

        let mut report = SweepReport::default();
        let origin = RequestOrigin::internal("inactivity-scan");

        for principal in inactive {
            if principal
                .inactivity_notified_at
                .is_some_and(|at| now - at < NOTICE_CADENCE)
            {
                continue;
            }
            let mut updated = principal.clone();
            updated.inactivity_notified_at = Some(now);
            self.principals
                .update(&updated)
                .await
                .map_err(|e| ApiError::System(format!("principal update failed: {e}")))?;

            self.recorder
                .record(
                    AuditEvent::new(AuditEventKind::InactivityNotice, origin.clone())
                        .by(principal.id)
                        .on(ResourceType::Account, principal.id)
                        .with_detail(serde_json::json!({
                            "last_activity": principal.updated_at,
                        })),
                )
                .await;
            report.inactivity_notices += 1;
        }
        Ok(report)
    }

    /// Drive both sweeps on a fixed cadence until the task is dropped.
    pub async fn run_forever(self: Arc<Self>, cadence: Duration) {
        let mut ticker = tokio::time::interval(cadence);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let now = Utc::now();
            if let Err(error) = self.run_deletion_sweep(now).await {
                warn!(%error, "deletion sweep failed");
            }
            if let Err(error) = self.run_inactivity_scan(now).await {
                warn!(%error, "inactivity scan failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuditFilter, ClinicalRecord, PageRequest, Principal, Role};
    use crate::store::MemoryStore;
    use uuid::Uuid;

    fn service(store: &Arc<MemoryStore>) -> SweepService {
        let recorder = AuditTrailRecorder::new(store.clone(), Duration::from_millis(200));
        SweepService::new(
            store.clone(),
            store.clone(),
            recorder,
            CoreConfig::new(b"test-secret".to_vec()),
        )
    }

    async fn patient_due_for_deletion(store: &Arc<MemoryStore>) -> Principal {
        let mut patient = Principal::new(
            Role::Patient,
            "paciente@example.com",
            "Paciente Teste",
            "v1$00$00".into(),
        );
        patient.deletion_scheduled_for = Some(Utc::now() - chrono::Duration::days(1));
        PrincipalStore::create(store.as_ref(), &patient).await.unwrap();
        patient
    }

    #[tokio::test]
    async fn deletion_sweep_anonymizes_profile_but_keeps_clinical_content() -> ApiResult<()> {
        let store = Arc::new(MemoryStore::new());
        let sweeps = service(&store);
        let patient = patient_due_for_deletion(&store).await;

        let prescription = ClinicalRecord {
            id: Uuid::new_v4(),
            resource_type: ResourceType::Prescription,
            patient_id: patient.id,
            doctor_id: Some(Uuid::new_v4()),
            content: serde_json::json!({
                "patient_name": "Paciente Teste",
                "medication": "losartan 50mg",
                "dosage": "1x daily",
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            anonymized: false,
        };
        ClinicalRecordStore::create(store.as_ref(), &prescription)
            .await
            .unwrap();

        let report = sweeps.run_deletion_sweep(Utc::now()).await?;
        assert_eq!(report.principals_anonymized, 1);
        assert_eq!(report.clinical_records_anonymized, 1);

        let stored_principal = PrincipalStore::find_by_id(store.as_ref(), patient.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored_principal.anonymized);
        assert_ne!(stored_principal.email, "paciente@example.com");

        // Clinical substance survives, identifiers do not.
        let stored_record = ClinicalRecordStore::find_by_id(store.as_ref(), prescription.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored_record.content.get("medication").and_then(|v| v.as_str()),
            Some("losartan 50mg")
        );
        assert!(stored_record.content.get("patient_name").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn deletion_sweep_is_idempotent_and_audited_once() -> ApiResult<()> {
        let store = Arc::new(MemoryStore::new());
        let sweeps = service(&store);
        let patient = patient_due_for_deletion(&store).await;

        let now = Utc::now();
        let first = sweeps.run_deletion_sweep(now).await?;
        let second = sweeps.run_deletion_sweep(now).await?;
        assert_eq!(first.principals_anonymized, 1);
        assert_eq!(second.principals_anonymized, 0);

        let recorder = AuditTrailRecorder::new(store.clone(), Duration::from_millis(200));
        let page = recorder
            .query(
                &AuditFilter {
                    principal_id: Some(patient.id),
                    kind: Some(AuditEventKind::DataAnonymization),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await?;
        assert_eq!(page.total, 1);
        Ok(())
    }

    #[tokio::test]
    async fn inactivity_scan_does_not_double_notify_same_day() -> ApiResult<()> {
        let store = Arc::new(MemoryStore::new());
        let sweeps = service(&store);

        let mut idle = Principal::new(Role::Patient, "idle@example.com", "Idle", "v1$00$00".into());
        idle.updated_at = Utc::now() - chrono::Duration::days(800);
        PrincipalStore::create(store.as_ref(), &idle).await.unwrap();

        let now = Utc::now();
        let first = sweeps.run_inactivity_scan(now).await?;
        let second = sweeps.run_inactivity_scan(now).await?;
        assert_eq!(first.inactivity_notices, 1);
        assert_eq!(second.inactivity_notices, 0);
        Ok(())
    }
}

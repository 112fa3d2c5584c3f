//! End-to-end scenarios over the in-memory store: token verification,
//! access decisions, the CRUD gate, audit, consent and the sweeps wired
//! together the way a request path composes them.

use std::sync::Arc;
use std::time::Duration;

use clinical_core_api::config::CoreConfig;
use clinical_core_api::domain::{
    AuditEventKind, AuditFilter, ConsentCategory, Operation, PageRequest, Principal, RequestOrigin,
    ResourceType, RevokeOutcome, Role,
};
use clinical_core_api::error::{ApiError, ApiResult};
use clinical_core_api::service::{
    AccessDecisionEngine, AuditTrailRecorder, ClinicalRecordService, ConsentLedger,
    DataSubjectService, SweepService, TokenService,
};
use clinical_core_api::store::{MemoryStore, PrincipalStore, RelationshipStore};
use uuid::Uuid;

struct Harness {
    store: Arc<MemoryStore>,
    recorder: AuditTrailRecorder,
    records: ClinicalRecordService,
    consents: ConsentLedger,
    data_subject: DataSubjectService,
    sweeps: SweepService,
    tokens: TokenService,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let config = CoreConfig::new(b"scenario-secret".to_vec());
    let recorder = AuditTrailRecorder::new(store.clone(), config.store_timeout);
    let engine = Arc::new(AccessDecisionEngine::new(store.clone(), config.store_timeout));
    let records = ClinicalRecordService::new(
        engine.clone(),
        store.clone(),
        store.clone(),
        recorder.clone(),
    );
    let consents = ConsentLedger::new(store.clone(), recorder.clone());
    let data_subject = DataSubjectService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        recorder.clone(),
        config.clone(),
    );
    let sweeps = SweepService::new(
        store.clone(),
        store.clone(),
        recorder.clone(),
        config.clone(),
    );
    let tokens = TokenService::new(config.token_secret.clone(), config.token_ttl, store.clone());
    Harness {
        store,
        recorder,
        records,
        consents,
        data_subject,
        sweeps,
        tokens,
    }
}

fn origin() -> RequestOrigin {
    RequestOrigin::new("198.51.100.4", "scenario-client/1.0")
}

async fn seeded(store: &Arc<MemoryStore>, role: Role, email: &str) -> Principal {
    let principal = Principal::new(role, email, email.split('@').next().unwrap(), "v1$00$00".into());
    store.create(&principal).await.unwrap();
    principal
}

#[tokio::test]
async fn scenario_a_unauthenticated_read_is_401_and_audited_with_null_principal() -> ApiResult<()> {
    let h = harness();

    let err = h
        .records
        .read_record(
            None,
            Operation::read_prescription(),
            ResourceType::Prescription,
            Uuid::new_v4(),
            &origin(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 401);

    let page = h
        .recorder
        .query(
            &AuditFilter {
                kind: Some(AuditEventKind::AccessDenied),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].principal_id, None);
    Ok(())
}

#[tokio::test]
async fn scenario_b_unassignment_cuts_doctor_access_immediately() -> ApiResult<()> {
    let h = harness();
    let doctor = seeded(&h.store, Role::Doctor, "doctor@example.com").await;
    let patient = seeded(&h.store, Role::Patient, "patient@example.com").await;
    h.store.assign(patient.id, doctor.id).await.unwrap();

    let prescription = h
        .records
        .create_record(
            &doctor,
            Operation::create_prescription(),
            ResourceType::Prescription,
            patient.id,
            serde_json::json!({"medication": "ibuprofen 400mg"}),
            &origin(),
        )
        .await?;

    // Exactly one modification entry, with a null "before" snapshot.
    let page = h
        .recorder
        .query(
            &AuditFilter {
                kind: Some(AuditEventKind::DataModification),
                resource_type: Some(ResourceType::Prescription),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await?;
    assert_eq!(page.total, 1);
    assert!(page.items[0].detail["before"].is_null());
    assert_eq!(
        page.items[0].detail["after"]["medication"],
        serde_json::json!("ibuprofen 400mg")
    );

    // While assigned, the read succeeds and is itself audited.
    h.records
        .read_record(
            Some(&doctor),
            Operation::read_prescription(),
            ResourceType::Prescription,
            prescription.id,
            &origin(),
        )
        .await?;

    h.store.unassign(patient.id).await.unwrap();
    let err = h
        .records
        .read_record(
            Some(&doctor),
            Operation::read_prescription(),
            ResourceType::Prescription,
            prescription.id,
            &origin(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 403);

    // The denial reason is preserved internally.
    let denials = h
        .recorder
        .query(
            &AuditFilter {
                principal_id: Some(doctor.id),
                kind: Some(AuditEventKind::AccessDenied),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await?;
    assert_eq!(denials.total, 1);
    assert_eq!(
        denials.items[0].detail["reason"],
        serde_json::json!("doctor_not_assigned")
    );
    Ok(())
}

#[tokio::test]
async fn scenario_c_double_revoke_is_deterministic_not_an_error() -> ApiResult<()> {
    let h = harness();
    let patient = seeded(&h.store, Role::Patient, "patient@example.com").await;
    let category = ConsentCategory::MarketingCommunications;

    h.consents
        .grant(patient.id, category.clone(), &origin(), "v3")
        .await?;

    let first = h
        .consents
        .revoke(patient.id, category.clone(), &origin(), "v3")
        .await?;
    assert!(matches!(first, RevokeOutcome::Revoked { .. }));

    let second = h
        .consents
        .revoke(patient.id, category.clone(), &origin(), "v3")
        .await?;
    assert!(matches!(second, RevokeOutcome::AlreadyRevoked { .. }));
    Ok(())
}

#[tokio::test]
async fn probing_unknown_and_foreign_records_is_indistinguishable() -> ApiResult<()> {
    let h = harness();
    let doctor = seeded(&h.store, Role::Doctor, "doctor@example.com").await;
    let patient = seeded(&h.store, Role::Patient, "patient@example.com").await;
    let other = seeded(&h.store, Role::Patient, "other@example.com").await;
    h.store.assign(patient.id, doctor.id).await.unwrap();

    let foreign = h
        .records
        .create_record(
            &doctor,
            Operation::create_prescription(),
            ResourceType::Prescription,
            patient.id,
            serde_json::json!({"medication": "amoxicillin"}),
            &origin(),
        )
        .await?;

    let on_foreign = h
        .records
        .read_record(
            Some(&other),
            Operation::read_prescription(),
            ResourceType::Prescription,
            foreign.id,
            &origin(),
        )
        .await
        .unwrap_err();
    let on_missing = h
        .records
        .read_record(
            Some(&other),
            Operation::read_prescription(),
            ResourceType::Prescription,
            Uuid::new_v4(),
            &origin(),
        )
        .await
        .unwrap_err();

    assert_eq!(on_foreign.http_status(), on_missing.http_status());
    assert_eq!(on_foreign.public_message(), on_missing.public_message());
    assert_eq!(on_foreign.code(), on_missing.code());
    Ok(())
}

#[tokio::test]
async fn admin_sensitive_read_is_allowed_but_still_audited() -> ApiResult<()> {
    let h = harness();
    let doctor = seeded(&h.store, Role::Doctor, "doctor@example.com").await;
    let patient = seeded(&h.store, Role::Patient, "patient@example.com").await;
    let admin = seeded(&h.store, Role::Admin, "admin@example.com").await;
    h.store.assign(patient.id, doctor.id).await.unwrap();

    let exam = h
        .records
        .create_record(
            &doctor,
            Operation::create_clinical_note(),
            ResourceType::ClinicalNote,
            patient.id,
            serde_json::json!({"note": "follow-up in 30 days"}),
            &origin(),
        )
        .await?;

    h.records
        .read_record(
            Some(&admin),
            Operation::read_clinical_note(),
            ResourceType::ClinicalNote,
            exam.id,
            &origin(),
        )
        .await?;

    let reads = h
        .recorder
        .query(
            &AuditFilter {
                principal_id: Some(admin.id),
                kind: Some(AuditEventKind::DataAccess),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await?;
    assert_eq!(reads.total, 1);
    Ok(())
}

#[tokio::test]
async fn deletion_precedence_retention_outranks_erasure_end_to_end() -> ApiResult<()> {
    let h = harness();
    let doctor = seeded(&h.store, Role::Doctor, "doctor@example.com").await;
    let patient = seeded(&h.store, Role::Patient, "patient@example.com").await;
    h.store.assign(patient.id, doctor.id).await.unwrap();

    let exam = h
        .records
        .create_record(
            &doctor,
            Operation::create_prescription(),
            ResourceType::Prescription,
            patient.id,
            serde_json::json!({
                "patient_name": "Patient Example",
                "medication": "metformin 850mg",
            }),
            &origin(),
        )
        .await?;

    let schedule = h.data_subject.schedule_deletion(patient.id, &origin()).await?;
    assert!(schedule.newly_scheduled);

    // Run the sweep after the grace period has elapsed.
    let after_grace = schedule.scheduled_for + chrono::Duration::days(1);
    let report = h.sweeps.run_deletion_sweep(after_grace).await?;
    assert_eq!(report.principals_anonymized, 1);

    // Profile anonymized and unable to authenticate.
    let stored = h.store.find_by_id(patient.id).await.unwrap().unwrap();
    assert!(stored.anonymized);
    let stale_token = h.tokens.issue(&patient);
    assert!(h.tokens.verify(&stale_token).await.is_err());

    // Clinical substance retained, identifiers stripped.
    let kept = clinical_core_api::store::ClinicalRecordStore::find_by_id(h.store.as_ref(), exam.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        kept.content.get("medication").and_then(|v| v.as_str()),
        Some("metformin 850mg")
    );
    assert!(kept.content.get("patient_name").is_none());
    Ok(())
}

#[tokio::test]
async fn export_is_self_scoped_through_the_engine() -> ApiResult<()> {
    let h = harness();
    let patient = seeded(&h.store, Role::Patient, "patient@example.com").await;
    let config = CoreConfig::new(b"scenario-secret".to_vec());
    let engine = AccessDecisionEngine::new(h.store.clone(), config.store_timeout);

    let own = clinical_core_api::domain::ResourceRef::new(
        ResourceType::Account,
        patient.id,
        patient.id,
    );
    let decision = engine
        .authorize(Some(&patient), &Operation::export_personal_data(), Some(&own))
        .await;
    assert!(decision.is_allow());

    let export = h.data_subject.export_all(patient.id, &origin()).await?;
    assert_eq!(export.profile.id, patient.id);
    Ok(())
}

#[tokio::test]
async fn wire_envelope_matches_contract() {
    let err = ApiError::Authorization(clinical_core_api::domain::DenyReason::DoctorNotAssigned);
    let body = clinical_core_api::error::ErrorBody::from_error(&err);
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["success"], serde_json::json!(false));
    assert_eq!(value["code"], serde_json::json!("FORBIDDEN"));
    assert!(value["timestamp"].is_string());

    let ok = clinical_core_api::error::ApiResponse::new(serde_json::json!({"id": 1}));
    let value = serde_json::to_value(&ok).unwrap();
    assert_eq!(value["success"], serde_json::json!(true));
    assert_eq!(value["data"]["id"], serde_json::json!(1));
}

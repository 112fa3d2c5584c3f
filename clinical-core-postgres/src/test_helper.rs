//! Shared setup for database-backed tests.
//!
//! Tests here run against the database named by `DATABASE_URL` and skip
//! silently when no database is reachable, so the suite stays green on
//! machines without Postgres.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::postgres_stores::PostgresStores;

/// Connects and migrates, or returns None when `DATABASE_URL` is unset
/// or the database cannot be reached.
pub async fn try_stores() -> Option<Arc<PostgresStores>> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let pool: PgPool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await
        .ok()?;
    sqlx::migrate!().run(&pool).await.ok()?;
    Some(Arc::new(PostgresStores::new(Arc::new(pool))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serial_test::serial;
    use uuid::Uuid;

    use clinical_core_api::domain::{
        AuditEvent, AuditEventKind, AuditFilter, ClinicalRecord, ConsentCategory, ConsentRecord,
        PageRequest, Principal, RequestOrigin, ResourceType, Role,
    };
    use clinical_core_api::store::{
        AuditStore, ClinicalRecordStore, ConsentStore, PrincipalStore, RelationshipStore,
    };

    fn unique_email(tag: &str) -> String {
        format!("{tag}-{}@example.org", Uuid::new_v4())
    }

    async fn insert_principal(stores: &PostgresStores, role: Role, tag: &str) -> Principal {
        let principal = Principal::new(role, unique_email(tag), tag, "v1$00$00".to_string());
        PrincipalStore::create(stores, &principal)
            .await
            .expect("create principal");
        principal
    }

    #[tokio::test]
    #[serial]
    async fn principal_round_trip() {
        let Some(stores) = try_stores().await else {
            return;
        };
        let principal = insert_principal(&stores, Role::Patient, "round-trip").await;

        let by_id = PrincipalStore::find_by_id(&*stores, principal.id)
            .await
            .expect("find_by_id")
            .expect("present");
        assert_eq!(by_id.email, principal.email);
        assert_eq!(by_id.role, Role::Patient);
        assert_eq!(by_id.token_generation, 0);

        let by_email = stores
            .find_by_email(&principal.email)
            .await
            .expect("find_by_email")
            .expect("present");
        assert_eq!(by_email.id, principal.id);
    }

    #[tokio::test]
    #[serial]
    async fn audit_append_assigns_monotonic_sequence() {
        let Some(stores) = try_stores().await else {
            return;
        };
        let principal = insert_principal(&stores, Role::Doctor, "audit-seq").await;

        let origin = RequestOrigin::new("10.0.0.1", "test-agent");
        let first = AuditStore::append(
            &*stores,
            &AuditEvent::new(AuditEventKind::DataAccess, origin.clone()).by(principal.id),
        )
        .await
        .expect("append first");
        let second = AuditStore::append(
            &*stores,
            &AuditEvent::new(AuditEventKind::DataModification, origin).by(principal.id),
        )
        .await
        .expect("append second");
        assert!(second.sequence > first.sequence);

        let page = stores
            .query(&AuditFilter::for_principal(principal.id), PageRequest::new(10, 0))
            .await
            .expect("query");
        assert_eq!(page.total, 2);
        // Newest first.
        assert_eq!(page.items[0].id, second.id);
        assert_eq!(page.items[1].id, first.id);
    }

    #[tokio::test]
    #[serial]
    async fn consent_latest_follows_insertion_order() {
        let Some(stores) = try_stores().await else {
            return;
        };
        let principal = insert_principal(&stores, Role::Patient, "consent").await;
        let category = ConsentCategory::GeneralDataProcessing;

        for granted in [true, false] {
            let record = ConsentRecord {
                id: Uuid::new_v4(),
                sequence: 0,
                principal_id: principal.id,
                category: category.clone(),
                granted,
                created_at: Utc::now(),
                origin_ip: "10.0.0.1".to_string(),
                client_identifier: "test-agent".to_string(),
                policy_version: "2026-01".to_string(),
            };
            ConsentStore::append(&*stores, record).await.expect("append");
        }

        let latest = stores
            .latest(principal.id, &category)
            .await
            .expect("latest")
            .expect("present");
        assert!(!latest.granted);

        let history = stores
            .history(principal.id, &category)
            .await
            .expect("history");
        assert_eq!(history.len(), 2);
        assert!(history[0].granted);
        assert!(history[0].sequence < history[1].sequence);
    }

    #[tokio::test]
    #[serial]
    async fn reassignment_replaces_previous_doctor() {
        let Some(stores) = try_stores().await else {
            return;
        };
        let patient = insert_principal(&stores, Role::Patient, "assign-patient").await;
        let first_doctor = insert_principal(&stores, Role::Doctor, "assign-doc-a").await;
        let second_doctor = insert_principal(&stores, Role::Doctor, "assign-doc-b").await;

        stores
            .assign(patient.id, first_doctor.id)
            .await
            .expect("assign first");
        assert!(stores
            .active_assignment(first_doctor.id, patient.id)
            .await
            .expect("check first"));

        stores
            .assign(patient.id, second_doctor.id)
            .await
            .expect("assign second");
        assert!(!stores
            .active_assignment(first_doctor.id, patient.id)
            .await
            .expect("first replaced"));
        assert_eq!(
            stores.assigned_doctor(patient.id).await.expect("assigned"),
            Some(second_doctor.id)
        );

        stores.unassign(patient.id).await.expect("unassign");
        assert_eq!(stores.assigned_doctor(patient.id).await.expect("none"), None);
    }

    #[tokio::test]
    #[serial]
    async fn anonymize_strips_identifiers_and_is_idempotent() {
        let Some(stores) = try_stores().await else {
            return;
        };
        let patient = insert_principal(&stores, Role::Patient, "anon").await;
        let doctor = insert_principal(&stores, Role::Doctor, "anon-doc").await;

        let now = Utc::now();
        let record = ClinicalRecord {
            id: Uuid::new_v4(),
            resource_type: ResourceType::Prescription,
            patient_id: patient.id,
            doctor_id: Some(doctor.id),
            content: serde_json::json!({
                "patient_name": "Ana",
                "patient_email": "ana@example.org",
                "medication": "ibuprofen 400mg",
            }),
            created_at: now,
            updated_at: now,
            anonymized: false,
        };
        ClinicalRecordStore::create(&*stores, &record)
            .await
            .expect("create record");

        let touched = stores
            .anonymize_for_patient(patient.id)
            .await
            .expect("anonymize");
        assert_eq!(touched, 1);
        let touched_again = stores
            .anonymize_for_patient(patient.id)
            .await
            .expect("anonymize again");
        assert_eq!(touched_again, 0);

        let stored = ClinicalRecordStore::find_by_id(&*stores, record.id)
            .await
            .expect("find")
            .expect("present");
        assert!(stored.anonymized);
        assert!(stored.content.get("patient_name").is_none());
        assert!(stored.content.get("patient_email").is_none());
        assert_eq!(
            stored.content.get("medication").and_then(|v| v.as_str()),
            Some("ibuprofen 400mg")
        );

        let reference = stores
            .resource_ref(ResourceType::Prescription, record.id)
            .await
            .expect("resource_ref")
            .expect("present");
        assert_eq!(reference.owner_patient_id, patient.id);
        assert_eq!(reference.author_doctor_id, Some(doctor.id));
    }
}

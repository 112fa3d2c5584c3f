use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use clinical_core_api::domain::{
    AuditEntry, AuditEvent, AuditFilter, ClinicalRecord, ConsentCategory, ConsentRecord, Page,
    PageRequest, Principal, ResourceRef, ResourceType,
};
use clinical_core_api::error::StoreResult;
use clinical_core_api::store::{
    AuditStore, ClinicalRecordStore, ConsentStore, PrincipalStore, RelationshipStore,
};
use clinical_core_db::models::assignment::AssignmentModel;
use clinical_core_db::models::audit_entry::AuditEntryModel;
use clinical_core_db::models::clinical_record::ClinicalRecordModel;
use clinical_core_db::models::consent_record::ConsentRecordModel;
use clinical_core_db::models::principal::PrincipalModel;
use clinical_core_db::repository::{
    append::Append, create::Create, find_by_id::FindById, query_audits::QueryAudits,
    update::Update,
};

use crate::repository::assignment_repository::AssignmentRepositoryImpl;
use crate::repository::audit_entry_repository::AuditEntryRepositoryImpl;
use crate::repository::clinical_record_repository::ClinicalRecordRepositoryImpl;
use crate::repository::consent_record_repository::ConsentRecordRepositoryImpl;
use crate::repository::principal_repository::PrincipalRepositoryImpl;

/// All store ports backed by one shared connection pool. Services hold
/// `Arc<PostgresStores>` coerced to the individual port traits.
pub struct PostgresStores {
    principals: PrincipalRepositoryImpl,
    assignments: AssignmentRepositoryImpl,
    clinical_records: ClinicalRecordRepositoryImpl,
    audit_entries: AuditEntryRepositoryImpl,
    consent_records: ConsentRecordRepositoryImpl,
}

impl PostgresStores {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            principals: PrincipalRepositoryImpl::new(pool.clone()),
            assignments: AssignmentRepositoryImpl::new(pool.clone()),
            clinical_records: ClinicalRecordRepositoryImpl::new(pool.clone()),
            audit_entries: AuditEntryRepositoryImpl::new(pool.clone()),
            consent_records: ConsentRecordRepositoryImpl::new(pool),
        }
    }
}

#[async_trait]
impl PrincipalStore for PostgresStores {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Principal>> {
        let model: Option<PrincipalModel> = self.principals.find_by_id(id).await?;
        Ok(model.map(Principal::from))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        let model = self.principals.find_by_email(email).await?;
        Ok(model.map(Principal::from))
    }

    async fn create(&self, principal: &Principal) -> StoreResult<()> {
        self.principals.create(&PrincipalModel::from(principal)).await
    }

    async fn update(&self, principal: &Principal) -> StoreResult<()> {
        self.principals.update(&PrincipalModel::from(principal)).await
    }

    async fn list_deletions_due(&self, now: DateTime<Utc>) -> StoreResult<Vec<Principal>> {
        let models = self.principals.list_deletions_due(now).await?;
        Ok(models.into_iter().map(Principal::from).collect())
    }

    async fn list_inactive_since(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Principal>> {
        let models = self.principals.list_inactive_since(cutoff).await?;
        Ok(models.into_iter().map(Principal::from).collect())
    }
}

#[async_trait]
impl RelationshipStore for PostgresStores {
    async fn active_assignment(&self, doctor_id: Uuid, patient_id: Uuid) -> StoreResult<bool> {
        self.assignments.active_assignment(doctor_id, patient_id).await
    }

    async fn assigned_doctor(&self, patient_id: Uuid) -> StoreResult<Option<Uuid>> {
        self.assignments.assigned_doctor(patient_id).await
    }

    async fn assign(&self, patient_id: Uuid, doctor_id: Uuid) -> StoreResult<()> {
        let assignment = AssignmentModel {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            assigned_at: Utc::now(),
        };
        self.assignments.assign(&assignment).await
    }

    async fn unassign(&self, patient_id: Uuid) -> StoreResult<()> {
        self.assignments.unassign(patient_id).await
    }

    async fn resource_ref(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> StoreResult<Option<ResourceRef>> {
        let model: Option<ClinicalRecordModel> =
            self.clinical_records.find_by_id(resource_id).await?;
        Ok(model
            .filter(|record| record.resource_type == resource_type)
            .map(|record| ResourceRef {
                resource_type: record.resource_type,
                resource_id: record.id,
                owner_patient_id: record.patient_id,
                author_doctor_id: record.doctor_id,
            }))
    }
}

#[async_trait]
impl ClinicalRecordStore for PostgresStores {
    async fn create(&self, record: &ClinicalRecord) -> StoreResult<()> {
        self.clinical_records
            .create(&ClinicalRecordModel::from(record))
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ClinicalRecord>> {
        let model: Option<ClinicalRecordModel> = self.clinical_records.find_by_id(id).await?;
        Ok(model.map(ClinicalRecord::from))
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> StoreResult<Vec<ClinicalRecord>> {
        let models = self.clinical_records.list_for_patient(patient_id).await?;
        Ok(models.into_iter().map(ClinicalRecord::from).collect())
    }

    async fn anonymize_for_patient(&self, patient_id: Uuid) -> StoreResult<u64> {
        self.clinical_records.anonymize_for_patient(patient_id).await
    }
}

#[async_trait]
impl AuditStore for PostgresStores {
    async fn append(&self, event: &AuditEvent) -> StoreResult<AuditEntry> {
        let model = AuditEntryModel {
            id: Uuid::new_v4(),
            // Assigned by the database on insert.
            sequence: 0,
            principal_id: event.principal_id,
            kind: event.kind,
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            recorded_at: Utc::now(),
            origin_ip: event.origin.ip_address.clone(),
            client_identifier: event.origin.user_agent.clone(),
            detail: event.detail.clone(),
        };
        let stored = self.audit_entries.append(&model).await?;
        Ok(AuditEntry::from(stored))
    }

    async fn query(&self, filter: &AuditFilter, page: PageRequest) -> StoreResult<Page<AuditEntry>> {
        let models = self.audit_entries.query_audits(filter, page).await?;
        Ok(Page::new(
            models.items.into_iter().map(AuditEntry::from).collect(),
            models.total,
            models.limit,
            models.offset,
        ))
    }
}

#[async_trait]
impl ConsentStore for PostgresStores {
    async fn append(&self, record: ConsentRecord) -> StoreResult<ConsentRecord> {
        let stored = self
            .consent_records
            .append(&ConsentRecordModel::from(&record))
            .await?;
        Ok(ConsentRecord::from(stored))
    }

    async fn latest(
        &self,
        principal_id: Uuid,
        category: &ConsentCategory,
    ) -> StoreResult<Option<ConsentRecord>> {
        let model = self
            .consent_records
            .latest(principal_id, category.code())
            .await?;
        Ok(model.map(ConsentRecord::from))
    }

    async fn history(
        &self,
        principal_id: Uuid,
        category: &ConsentCategory,
    ) -> StoreResult<Vec<ConsentRecord>> {
        let models = self
            .consent_records
            .history(principal_id, category.code())
            .await?;
        Ok(models.into_iter().map(ConsentRecord::from).collect())
    }

    async fn history_for_principal(&self, principal_id: Uuid) -> StoreResult<Vec<ConsentRecord>> {
        let models = self.consent_records.history_for_principal(principal_id).await?;
        Ok(models.into_iter().map(ConsentRecord::from).collect())
    }
}

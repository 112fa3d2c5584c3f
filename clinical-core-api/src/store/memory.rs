//! In-process store implementing every port over `tokio::sync::RwLock`
//! maps. Backs the unit and scenario tests, and is usable as-is by
//! single-process embedders. Failure and latency injection exercise the
//! fail-closed and dead-letter paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    AuditEntry, AuditEvent, AuditFilter, ClinicalRecord, ConsentCategory, ConsentRecord, Page,
    PageRequest, Principal, ResourceRef, ResourceType,
};
use crate::error::StoreResult;

use super::{AuditStore, ClinicalRecordStore, ConsentStore, PrincipalStore, RelationshipStore};

#[derive(Default)]
pub struct MemoryStore {
    principals: RwLock<HashMap<Uuid, Principal>>,
    /// patient id -> doctor id, at most one per patient.
    assignments: RwLock<HashMap<Uuid, Uuid>>,
    clinical_records: RwLock<HashMap<Uuid, ClinicalRecord>>,
    audit_entries: RwLock<Vec<AuditEntry>>,
    consent_records: RwLock<Vec<ConsentRecord>>,
    audit_sequence: AtomicI64,
    consent_sequence: AtomicI64,
    /// When set, relationship lookups fail; exercises fail-closed.
    pub fail_relationship: AtomicBool,
    /// When set, audit appends fail; exercises the dead-letter path.
    pub fail_audit: AtomicBool,
    /// Artificial latency on relationship lookups; exercises timeouts.
    relationship_delay: RwLock<Option<Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_relationship_delay(&self, delay: Option<Duration>) {
        *self.relationship_delay.write().await = delay;
    }

    async fn relationship_gate(&self) -> StoreResult<()> {
        if let Some(delay) = *self.relationship_delay.read().await {
            tokio::time::sleep(delay).await;
        }
        if self.fail_relationship.load(Ordering::SeqCst) {
            return Err("relationship store unavailable".into());
        }
        Ok(())
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Principal>> {
        Ok(self.principals.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn create(&self, principal: &Principal) -> StoreResult<()> {
        let mut principals = self.principals.write().await;
        if principals.contains_key(&principal.id) {
            return Err("principal already exists".into());
        }
        principals.insert(principal.id, principal.clone());
        Ok(())
    }

    async fn update(&self, principal: &Principal) -> StoreResult<()> {
        let mut principals = self.principals.write().await;
        match principals.get_mut(&principal.id) {
            Some(existing) => {
                *existing = principal.clone();
                Ok(())
            }
            None => Err("principal not found".into()),
        }
    }

    async fn list_deletions_due(&self, now: DateTime<Utc>) -> StoreResult<Vec<Principal>> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .filter(|p| !p.anonymized && p.deletion_scheduled_for.is_some_and(|at| at <= now))
            .cloned()
            .collect())
    }

    async fn list_inactive_since(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Principal>> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .filter(|p| !p.anonymized && p.updated_at < cutoff)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn active_assignment(&self, doctor_id: Uuid, patient_id: Uuid) -> StoreResult<bool> {
        self.relationship_gate().await?;
        Ok(self.assignments.read().await.get(&patient_id) == Some(&doctor_id))
    }

    async fn assigned_doctor(&self, patient_id: Uuid) -> StoreResult<Option<Uuid>> {
        self.relationship_gate().await?;
        Ok(self.assignments.read().await.get(&patient_id).copied())
    }

    async fn assign(&self, patient_id: Uuid, doctor_id: Uuid) -> StoreResult<()> {
        self.assignments.write().await.insert(patient_id, doctor_id);
        Ok(())
    }

    async fn unassign(&self, patient_id: Uuid) -> StoreResult<()> {
        self.assignments.write().await.remove(&patient_id);
        Ok(())
    }

    async fn resource_ref(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> StoreResult<Option<ResourceRef>> {
        self.relationship_gate().await?;
        Ok(self
            .clinical_records
            .read()
            .await
            .get(&resource_id)
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
impl ClinicalRecordStore for MemoryStore {
    async fn create(&self, record: &ClinicalRecord) -> StoreResult<()> {
        self.clinical_records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ClinicalRecord>> {
        Ok(self.clinical_records.read().await.get(&id).cloned())
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> StoreResult<Vec<ClinicalRecord>> {
        let mut records: Vec<ClinicalRecord> = self
            .clinical_records
            .read()
            .await
            .values()
            .filter(|record| record.patient_id == patient_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }

    async fn anonymize_for_patient(&self, patient_id: Uuid) -> StoreResult<u64> {
        let mut records = self.clinical_records.write().await;
        let mut touched = 0;
        for record in records.values_mut() {
            if record.patient_id == patient_id && !record.anonymized {
                // Clinical content stays; only direct identifiers inside
                // the payload are stripped.
                if let Some(object) = record.content.as_object_mut() {
                    object.remove("patient_name");
                    object.remove("patient_email");
                    object.remove("patient_document");
                }
                record.anonymized = true;
                record.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, event: &AuditEvent) -> StoreResult<AuditEntry> {
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err("audit store unavailable".into());
        }
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            sequence: self.audit_sequence.fetch_add(1, Ordering::SeqCst) + 1,
            principal_id: event.principal_id,
            kind: event.kind,
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            recorded_at: Utc::now(),
            origin_ip: event.origin.ip_address.clone(),
            client_identifier: event.origin.user_agent.clone(),
            detail: event.detail.clone(),
        };
        self.audit_entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn query(&self, filter: &AuditFilter, page: PageRequest) -> StoreResult<Page<AuditEntry>> {
        let entries = self.audit_entries.read().await;
        let mut matched: Vec<AuditEntry> = entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        // Newest-first, sequence as the insertion-order tie-breaker.
        matched.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();
        Ok(Page::new(items, total, page.limit, page.offset))
    }
}

#[async_trait]
impl ConsentStore for MemoryStore {
    async fn append(&self, mut record: ConsentRecord) -> StoreResult<ConsentRecord> {
        record.sequence = self.consent_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.consent_records.write().await.push(record.clone());
        Ok(record)
    }

    async fn latest(
        &self,
        principal_id: Uuid,
        category: &ConsentCategory,
    ) -> StoreResult<Option<ConsentRecord>> {
        Ok(self
            .consent_records
            .read()
            .await
            .iter()
            .filter(|record| record.principal_id == principal_id && &record.category == category)
            .max_by_key(|record| record.sequence)
            .cloned())
    }

    async fn history(
        &self,
        principal_id: Uuid,
        category: &ConsentCategory,
    ) -> StoreResult<Vec<ConsentRecord>> {
        let mut records: Vec<ConsentRecord> = self
            .consent_records
            .read()
            .await
            .iter()
            .filter(|record| record.principal_id == principal_id && &record.category == category)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.sequence);
        Ok(records)
    }

    async fn history_for_principal(&self, principal_id: Uuid) -> StoreResult<Vec<ConsentRecord>> {
        let mut records: Vec<ConsentRecord> = self
            .consent_records
            .read()
            .await
            .iter()
            .filter(|record| record.principal_id == principal_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.sequence);
        Ok(records)
    }
}

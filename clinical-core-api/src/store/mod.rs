pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AuditEntry, AuditEvent, AuditFilter, ClinicalRecord, ConsentCategory, ConsentRecord, Page,
    PageRequest, Principal, ResourceRef, ResourceType,
};
use crate::error::StoreResult;

/// Lookup and atomic create/update over user records. The core never
/// touches credential storage beyond this interface.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Principal>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Principal>>;

    async fn create(&self, principal: &Principal) -> StoreResult<()>;

    async fn update(&self, principal: &Principal) -> StoreResult<()>;

    /// Principals whose deletion schedule has passed and who are not yet
    /// anonymized.
    async fn list_deletions_due(&self, now: DateTime<Utc>) -> StoreResult<Vec<Principal>>;

    /// Principals not updated since the cutoff. The caller applies the
    /// notice-cadence filter.
    async fn list_inactive_since(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Principal>>;
}

/// Doctor-patient assignment and resource ownership. Assignment checks
/// are re-validated on every call; implementations must not cache.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Whether `doctor_id` currently holds the assignment for
    /// `patient_id`. Used by the access engine at decision time.
    async fn active_assignment(&self, doctor_id: Uuid, patient_id: Uuid) -> StoreResult<bool>;

    async fn assigned_doctor(&self, patient_id: Uuid) -> StoreResult<Option<Uuid>>;

    /// Set the patient's primary doctor, replacing any existing
    /// assignment. A patient has at most one at a time.
    async fn assign(&self, patient_id: Uuid, doctor_id: Uuid) -> StoreResult<()>;

    async fn unassign(&self, patient_id: Uuid) -> StoreResult<()>;

    /// Resolve a concrete record to its ownership. Returns None for an
    /// unknown record.
    async fn resource_ref(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> StoreResult<Option<ResourceRef>>;
}

/// Storage for clinical record envelopes.
#[async_trait]
pub trait ClinicalRecordStore: Send + Sync {
    async fn create(&self, record: &ClinicalRecord) -> StoreResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ClinicalRecord>>;

    async fn list_for_patient(&self, patient_id: Uuid) -> StoreResult<Vec<ClinicalRecord>>;

    /// Strip direct identifiers from every record of the patient while
    /// preserving clinical content. Returns the number of records
    /// touched. Idempotent.
    async fn anonymize_for_patient(&self, patient_id: Uuid) -> StoreResult<u64>;
}

/// Append-only audit storage. There is deliberately no update or delete
/// method on this trait.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist one event, assigning its monotonic sequence, and return
    /// the stored entry.
    async fn append(&self, event: &AuditEvent) -> StoreResult<AuditEntry>;

    /// Filtered, paginated query, newest-first.
    async fn query(&self, filter: &AuditFilter, page: PageRequest) -> StoreResult<Page<AuditEntry>>;
}

/// Append-only consent storage.
#[async_trait]
pub trait ConsentStore: Send + Sync {
    /// Persist one grant/revoke record, assigning its sequence.
    async fn append(&self, record: ConsentRecord) -> StoreResult<ConsentRecord>;

    /// The most recent record for the pair, by insertion order.
    async fn latest(
        &self,
        principal_id: Uuid,
        category: &ConsentCategory,
    ) -> StoreResult<Option<ConsentRecord>>;

    /// Full history for the pair, in insertion order.
    async fn history(
        &self,
        principal_id: Uuid,
        category: &ConsentCategory,
    ) -> StoreResult<Vec<ConsentRecord>>;

    /// Full history across categories for one principal, in insertion
    /// order. Feeds the personal-data export.
    async fn history_for_principal(&self, principal_id: Uuid) -> StoreResult<Vec<ConsentRecord>>;
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::AuditEntry;
use super::consent::ConsentRecord;
use super::resource::ResourceType;
use super::role::Role;

/// A clinical record as carried through the core: typed envelope around a
/// structured clinical payload. The payload's shape is owned by the
/// producing service; the core only needs ownership and type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub id: Uuid,
    pub resource_type: ResourceType,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub content: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set by the deletion sweep: direct identifiers stripped, clinical
    /// content retained under statutory retention.
    pub anonymized: bool,
}

/// Profile fields included in an export. Credential hashes never leave
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedProfile {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub deletion_scheduled_for: Option<DateTime<Utc>>,
}

/// The structured document returned by the export-all operation: profile,
/// clinical data (patients only), full consent history, and a bounded
/// recent window of audit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredExport {
    pub generated_at: DateTime<Utc>,
    pub profile: ExportedProfile,
    pub clinical_records: Vec<ClinicalRecord>,
    pub consent_history: Vec<ConsentRecord>,
    /// Audit entries from the recent window only (default 90 days).
    pub recent_audit_history: Vec<AuditEntry>,
}

/// Result of scheduling account deletion. Idempotent: re-invoking while a
/// schedule exists returns the existing one unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeletionSchedule {
    pub principal_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
    /// False when an earlier request already set the schedule.
    pub newly_scheduled: bool,
}

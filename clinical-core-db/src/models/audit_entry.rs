use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use clinical_core_api::domain::{AuditEntry, AuditEventKind, ResourceType};

use crate::models::Identifiable;

/// Row of the append-only `audit_entries` table. `sequence` is a
/// bigserial: insertion order is preserved even when wall-clock
/// timestamps tie. No update or delete statement for this table exists
/// anywhere in the workspace; retention is enforced at the schema level.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEntryModel {
    pub id: Uuid,
    pub sequence: i64,
    pub principal_id: Option<Uuid>,
    pub kind: AuditEventKind,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
    pub origin_ip: String,
    pub client_identifier: String,
    pub detail: serde_json::Value,
}

impl Identifiable for AuditEntryModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl From<AuditEntryModel> for AuditEntry {
    fn from(model: AuditEntryModel) -> Self {
        AuditEntry {
            id: model.id,
            sequence: model.sequence,
            principal_id: model.principal_id,
            kind: model.kind,
            resource_type: model.resource_type,
            resource_id: model.resource_id,
            recorded_at: model.recorded_at,
            origin_ip: model.origin_ip,
            client_identifier: model.client_identifier,
            detail: model.detail,
        }
    }
}

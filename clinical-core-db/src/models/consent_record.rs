use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use clinical_core_api::domain::{ConsentCategory, ConsentRecord};

use crate::models::Identifiable;

/// Row of the append-only `consent_records` table. Category is stored as
/// its stable string code so new categories need no schema change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsentRecordModel {
    pub id: Uuid,
    pub sequence: i64,
    pub principal_id: Uuid,
    pub category: String,
    pub granted: bool,
    pub created_at: DateTime<Utc>,
    pub origin_ip: String,
    pub client_identifier: String,
    pub policy_version: String,
}

impl Identifiable for ConsentRecordModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl From<ConsentRecordModel> for ConsentRecord {
    fn from(model: ConsentRecordModel) -> Self {
        ConsentRecord {
            id: model.id,
            sequence: model.sequence,
            principal_id: model.principal_id,
            category: ConsentCategory::from(model.category),
            granted: model.granted,
            created_at: model.created_at,
            origin_ip: model.origin_ip,
            client_identifier: model.client_identifier,
            policy_version: model.policy_version,
        }
    }
}

impl From<&ConsentRecord> for ConsentRecordModel {
    fn from(record: &ConsentRecord) -> Self {
        ConsentRecordModel {
            id: record.id,
            sequence: record.sequence,
            principal_id: record.principal_id,
            category: record.category.code().to_string(),
            granted: record.granted,
            created_at: record.created_at,
            origin_ip: record.origin_ip.clone(),
            client_identifier: record.client_identifier.clone(),
            policy_version: record.policy_version.clone(),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use clinical_core_api::domain::{ClinicalRecord, ResourceType};

use crate::models::Identifiable;

/// Row of the `clinical_records` table. Every record resolves to exactly
/// one owning patient; doctor-authored kinds carry the author that was
/// validated as assigned at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClinicalRecordModel {
    pub id: Uuid,
    pub resource_type: ResourceType,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub content: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub anonymized: bool,
}

impl Identifiable for ClinicalRecordModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl From<ClinicalRecordModel> for ClinicalRecord {
    fn from(model: ClinicalRecordModel) -> Self {
        ClinicalRecord {
            id: model.id,
            resource_type: model.resource_type,
            patient_id: model.patient_id,
            doctor_id: model.doctor_id,
            content: model.content,
            created_at: model.created_at,
            updated_at: model.updated_at,
            anonymized: model.anonymized,
        }
    }
}

impl From<&ClinicalRecord> for ClinicalRecordModel {
    fn from(record: &ClinicalRecord) -> Self {
        ClinicalRecordModel {
            id: record.id,
            resource_type: record.resource_type,
            patient_id: record.patient_id,
            doctor_id: record.doctor_id,
            content: record.content.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            anonymized: record.anonymized,
        }
    }
}

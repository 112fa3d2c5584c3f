use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of records the access model reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "resource_type", rename_all = "snake_case"))]
pub enum ResourceType {
    Appointment,
    Prescription,
    Exam,
    MoodEntry,
    ClinicalNote,
    Profile,
    Account,
    ConsentRecord,
    AuditLog,
}

impl ResourceType {
    /// Medical content whose reads are themselves audited and which a
    /// secretary may never see, regardless of other scoping.
    pub fn medical_sensitive(&self) -> bool {
        matches!(
            self,
            ResourceType::Prescription
                | ResourceType::Exam
                | ResourceType::MoodEntry
                | ResourceType::ClinicalNote
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Appointment => "appointment",
            ResourceType::Prescription => "prescription",
            ResourceType::Exam => "exam",
            ResourceType::MoodEntry => "mood_entry",
            ResourceType::ClinicalNote => "clinical_note",
            ResourceType::Profile => "profile",
            ResourceType::Account => "account",
            ResourceType::ConsentRecord => "consent_record",
            ResourceType::AuditLog => "audit_log",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved ownership of a concrete record: which patient it belongs to
/// and, for doctor-authored records, which doctor wrote it. Every
/// clinical record resolves to exactly one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub resource_type: ResourceType,
    pub resource_id: Uuid,
    pub owner_patient_id: Uuid,
    pub author_doctor_id: Option<Uuid>,
}

impl ResourceRef {
    pub fn new(resource_type: ResourceType, resource_id: Uuid, owner_patient_id: Uuid) -> Self {
        Self {
            resource_type,
            resource_id,
            owner_patient_id,
            author_doctor_id: None,
        }
    }

    pub fn authored_by(mut self, doctor_id: Uuid) -> Self {
        self.author_doctor_id = Some(doctor_id);
        self
    }
}

/// Where a request originated, carried into audit and consent records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOrigin {
    pub ip_address: String,
    pub user_agent: String,
}

impl RequestOrigin {
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Origin for internally initiated work (sweeps, migrations).
    pub fn internal(task: &str) -> Self {
        Self {
            ip_address: "127.0.0.1".to_string(),
            user_agent: format!("clinical-core/{task}"),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::resource::RequestOrigin;

/// Named classes of data-processing purpose. Open enumeration: categories
/// unknown to this build round-trip through `Other` so new purposes need
/// no schema or code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConsentCategory {
    GeneralDataProcessing,
    SensitiveHealthData,
    DoctorSharing,
    DataRetention,
    MarketingCommunications,
    Other(String),
}

impl ConsentCategory {
    pub fn code(&self) -> &str {
        match self {
            ConsentCategory::GeneralDataProcessing => "general_data_processing",
            ConsentCategory::SensitiveHealthData => "sensitive_health_data",
            ConsentCategory::DoctorSharing => "doctor_sharing",
            ConsentCategory::DataRetention => "data_retention",
            ConsentCategory::MarketingCommunications => "marketing_communications",
            ConsentCategory::Other(code) => code,
        }
    }
}

impl From<String> for ConsentCategory {
    fn from(code: String) -> Self {
        match code.as_str() {
            "general_data_processing" => ConsentCategory::GeneralDataProcessing,
            "sensitive_health_data" => ConsentCategory::SensitiveHealthData,
            "doctor_sharing" => ConsentCategory::DoctorSharing,
            "data_retention" => ConsentCategory::DataRetention,
            "marketing_communications" => ConsentCategory::MarketingCommunications,
            _ => ConsentCategory::Other(code),
        }
    }
}

impl From<ConsentCategory> for String {
    fn from(category: ConsentCategory) -> Self {
        category.code().to_string()
    }
}

impl std::fmt::Display for ConsentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One grant or revoke event. History rows are never mutated: a
/// revocation appends a new record, it does not touch the grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub id: Uuid,
    /// Store-assigned insertion order per (principal, category).
    pub sequence: i64,
    pub principal_id: Uuid,
    pub category: ConsentCategory,
    pub granted: bool,
    pub created_at: DateTime<Utc>,
    pub origin_ip: String,
    pub client_identifier: String,
    pub policy_version: String,
}

impl ConsentRecord {
    pub fn new(
        principal_id: Uuid,
        category: ConsentCategory,
        granted: bool,
        origin: &RequestOrigin,
        policy_version: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0,
            principal_id,
            category,
            granted,
            created_at: Utc::now(),
            origin_ip: origin.ip_address.clone(),
            client_identifier: origin.user_agent.clone(),
            policy_version: policy_version.into(),
        }
    }
}

/// The current state of a (principal, category) pair: the latest record
/// by creation order wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsentState {
    pub granted: bool,
    pub since: DateTime<Utc>,
}

/// Outcome of a revoke call. Revoking a category that was never granted
/// is not an error; it reports `NeverGranted` deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RevokeOutcome {
    Revoked { record: ConsentRecord },
    AlreadyRevoked { since: DateTime<Utc> },
    NeverGranted,
}

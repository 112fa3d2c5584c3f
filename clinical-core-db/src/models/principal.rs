use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use clinical_core_api::domain::{Principal, Role};

use crate::models::Identifiable;

/// Row of the `principals` table. Credential hash and rotation marker
/// never leave the store layer except inside the domain `Principal`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PrincipalModel {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    pub display_name: String,
    pub credential_hash: String,
    pub token_generation: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deletion_scheduled_for: Option<DateTime<Utc>>,
    pub inactivity_notified_at: Option<DateTime<Utc>>,
    pub anonymized: bool,
}

impl Identifiable for PrincipalModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl From<PrincipalModel> for Principal {
    fn from(model: PrincipalModel) -> Self {
        Principal {
            id: model.id,
            role: model.role,
            email: model.email,
            display_name: model.display_name,
            credential_hash: model.credential_hash,
            token_generation: model.token_generation,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deletion_scheduled_for: model.deletion_scheduled_for,
            inactivity_notified_at: model.inactivity_notified_at,
            anonymized: model.anonymized,
        }
    }
}

impl From<&Principal> for PrincipalModel {
    fn from(principal: &Principal) -> Self {
        PrincipalModel {
            id: principal.id,
            role: principal.role,
            email: principal.email.clone(),
            display_name: principal.display_name.clone(),
            credential_hash: principal.credential_hash.clone(),
            token_generation: principal.token_generation,
            created_at: principal.created_at,
            updated_at: principal.updated_at,
            deletion_scheduled_for: principal.deletion_scheduled_for,
            inactivity_notified_at: principal.inactivity_notified_at,
            anonymized: principal.anonymized,
        }
    }
}

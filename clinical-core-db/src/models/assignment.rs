use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::Identifiable;

/// Current doctor for a patient. One row per patient; re-assignment
/// replaces the row, and the history of who held the assignment lives in
/// the audit trail, not here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssignmentModel {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

impl Identifiable for AssignmentModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

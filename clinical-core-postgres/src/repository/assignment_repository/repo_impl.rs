use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::assignment::AssignmentModel;

/// Assignment lookups hit the table on every call. There is no cache in
/// front of this repository: a re-assignment must flip the next access
/// decision immediately.
pub struct AssignmentRepositoryImpl {
    pub(crate) pool: Arc<PgPool>,
}

impl AssignmentRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn active_assignment(&self, doctor_id: Uuid, patient_id: Uuid) -> StoreResult<bool> {
        super::queries::active_assignment_impl(&self.pool, doctor_id, patient_id).await
    }

    pub async fn assigned_doctor(&self, patient_id: Uuid) -> StoreResult<Option<Uuid>> {
        super::queries::assigned_doctor_impl(&self.pool, patient_id).await
    }

    pub async fn assign(&self, item: &AssignmentModel) -> StoreResult<()> {
        super::queries::assign_impl(&self.pool, item).await
    }

    pub async fn unassign(&self, patient_id: Uuid) -> StoreResult<()> {
        super::queries::unassign_impl(&self.pool, patient_id).await
    }
}

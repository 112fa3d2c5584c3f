use sqlx::PgPool;
use uuid::Uuid;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::clinical_record::ClinicalRecordModel;

use super::find_by_id::SELECT_COLUMNS;

pub(super) async fn list_for_patient_impl(
    pool: &PgPool,
    patient_id: Uuid,
) -> StoreResult<Vec<ClinicalRecordModel>> {
    let rows = sqlx::query_as::<_, ClinicalRecordModel>(&format!(
        "{SELECT_COLUMNS} WHERE patient_id = $1 ORDER BY created_at ASC, id ASC"
    ))
    .bind(patient_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

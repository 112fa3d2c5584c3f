use sqlx::PgPool;
use uuid::Uuid;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::clinical_record::ClinicalRecordModel;

pub(super) const SELECT_COLUMNS: &str = "SELECT id, resource_type, patient_id, doctor_id, \
     content, created_at, updated_at, anonymized FROM clinical_records";

pub(super) async fn find_by_id_impl(
    pool: &PgPool,
    id: Uuid,
) -> StoreResult<Option<ClinicalRecordModel>> {
    let row = sqlx::query_as::<_, ClinicalRecordModel>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

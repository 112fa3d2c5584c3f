use sqlx::PgPool;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::clinical_record::ClinicalRecordModel;

pub(super) async fn create_impl(pool: &PgPool, item: &ClinicalRecordModel) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO clinical_records
            (id, resource_type, patient_id, doctor_id, content, created_at, updated_at, anonymized)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(item.id)
    .bind(item.resource_type)
    .bind(item.patient_id)
    .bind(item.doctor_id)
    .bind(&item.content)
    .bind(item.created_at)
    .bind(item.updated_at)
    .bind(item.anonymized)
    .execute(pool)
    .await?;
    Ok(())
}

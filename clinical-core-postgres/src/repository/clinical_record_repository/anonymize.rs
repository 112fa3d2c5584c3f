use sqlx::PgPool;
use uuid::Uuid;

use clinical_core_api::error::StoreResult;

/// Strips direct identifiers from the JSONB content of every record the
/// patient owns, leaving clinical substance (medications, diagnoses,
/// measurements) intact for retention. Already-anonymized rows are
/// skipped, so a second run touches nothing.
pub(super) async fn anonymize_for_patient_impl(pool: &PgPool, patient_id: Uuid) -> StoreResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE clinical_records
        SET content = content - 'patient_name' - 'patient_email' - 'patient_document',
            anonymized = TRUE,
            updated_at = NOW()
        WHERE patient_id = $1 AND anonymized = FALSE
        "#,
    )
    .bind(patient_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

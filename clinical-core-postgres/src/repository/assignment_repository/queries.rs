use sqlx::PgPool;
use uuid::Uuid;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::assignment::AssignmentModel;

const SELECT_COLUMNS: &str = "SELECT id, patient_id, doctor_id, assigned_at FROM assignments";

pub(super) async fn active_assignment_impl(
    pool: &PgPool,
    doctor_id: Uuid,
    patient_id: Uuid,
) -> StoreResult<bool> {
    let row = sqlx::query_as::<_, AssignmentModel>(&format!(
        "{SELECT_COLUMNS} WHERE patient_id = $1 AND doctor_id = $2"
    ))
    .bind(patient_id)
    .bind(doctor_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub(super) async fn assigned_doctor_impl(
    pool: &PgPool,
    patient_id: Uuid,
) -> StoreResult<Option<Uuid>> {
    let row = sqlx::query_as::<_, AssignmentModel>(&format!(
        "{SELECT_COLUMNS} WHERE patient_id = $1"
    ))
    .bind(patient_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|assignment| assignment.doctor_id))
}

/// Upsert on patient_id: a patient has at most one primary doctor, so a
/// new assignment replaces the old one atomically.
pub(super) async fn assign_impl(pool: &PgPool, item: &AssignmentModel) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO assignments (id, patient_id, doctor_id, assigned_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (patient_id)
        DO UPDATE SET doctor_id = EXCLUDED.doctor_id, assigned_at = EXCLUDED.assigned_at
        "#,
    )
    .bind(item.id)
    .bind(item.patient_id)
    .bind(item.doctor_id)
    .bind(item.assigned_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub(super) async fn unassign_impl(pool: &PgPool, patient_id: Uuid) -> StoreResult<()> {
    sqlx::query("DELETE FROM assignments WHERE patient_id = $1")
        .bind(patient_id)
        .execute(pool)
        .await?;
    Ok(())
}

use sqlx::PgPool;
use uuid::Uuid;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::principal::PrincipalModel;

pub(super) const SELECT_COLUMNS: &str = r#"
    SELECT id, role, email, display_name, credential_hash, token_generation,
           created_at, updated_at, deletion_scheduled_for, inactivity_notified_at, anonymized
    FROM principals
"#;

pub(super) async fn find_by_id_impl(pool: &PgPool, id: Uuid) -> StoreResult<Option<PrincipalModel>> {
    let row = sqlx::query_as::<_, PrincipalModel>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

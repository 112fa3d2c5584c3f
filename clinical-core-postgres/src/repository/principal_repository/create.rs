use sqlx::PgPool;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::principal::PrincipalModel;

pub(super) async fn create_impl(pool: &PgPool, principal: &PrincipalModel) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO principals (
            id, role, email, display_name, credential_hash, token_generation,
            created_at, updated_at, deletion_scheduled_for, inactivity_notified_at, anonymized
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(principal.id)
    .bind(principal.role)
    .bind(&principal.email)
    .bind(&principal.display_name)
    .bind(&principal.credential_hash)
    .bind(principal.token_generation)
    .bind(principal.created_at)
    .bind(principal.updated_at)
    .bind(principal.deletion_scheduled_for)
    .bind(principal.inactivity_notified_at)
    .bind(principal.anonymized)
    .execute(pool)
    .await?;

    Ok(())
}

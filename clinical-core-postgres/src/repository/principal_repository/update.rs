use sqlx::PgPool;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::principal::PrincipalModel;

pub(super) async fn update_impl(pool: &PgPool, principal: &PrincipalModel) -> StoreResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE principals
        SET role = $2,
            email = $3,
            display_name = $4,
            credential_hash = $5,
            token_generation = $6,
            updated_at = $7,
            deletion_scheduled_for = $8,
            inactivity_notified_at = $9,
            anonymized = $10
        WHERE id = $1
        "#,
    )
    .bind(principal.id)
    .bind(principal.role)
    .bind(&principal.email)
    .bind(&principal.display_name)
    .bind(&principal.credential_hash)
    .bind(principal.token_generation)
    .bind(principal.updated_at)
    .bind(principal.deletion_scheduled_for)
    .bind(principal.inactivity_notified_at)
    .bind(principal.anonymized)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err("principal not found".into());
    }
    Ok(())
}

use sqlx::PgPool;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::principal::PrincipalModel;

use super::find_by_id::SELECT_COLUMNS;

pub(super) async fn find_by_email_impl(
    pool: &PgPool,
    email: &str,
) -> StoreResult<Option<PrincipalModel>> {
    let row = sqlx::query_as::<_, PrincipalModel>(&format!("{SELECT_COLUMNS} WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

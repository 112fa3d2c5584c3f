use sqlx::PgPool;
use uuid::Uuid;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::consent_record::ConsentRecordModel;

const SELECT_COLUMNS: &str = "SELECT id, sequence, principal_id, category, granted, \
     created_at, origin_ip, client_identifier, policy_version FROM consent_records";

/// Current state of the pair is whichever record was inserted last, by
/// sequence rather than timestamp.
pub(super) async fn latest_impl(
    pool: &PgPool,
    principal_id: Uuid,
    category: &str,
) -> StoreResult<Option<ConsentRecordModel>> {
    let row = sqlx::query_as::<_, ConsentRecordModel>(&format!(
        "{SELECT_COLUMNS} WHERE principal_id = $1 AND category = $2 ORDER BY sequence DESC LIMIT 1"
    ))
    .bind(principal_id)
    .bind(category)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub(super) async fn history_impl(
    pool: &PgPool,
    principal_id: Uuid,
    category: &str,
) -> StoreResult<Vec<ConsentRecordModel>> {
    let rows = sqlx::query_as::<_, ConsentRecordModel>(&format!(
        "{SELECT_COLUMNS} WHERE principal_id = $1 AND category = $2 ORDER BY sequence ASC"
    ))
    .bind(principal_id)
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub(super) async fn history_for_principal_impl(
    pool: &PgPool,
    principal_id: Uuid,
) -> StoreResult<Vec<ConsentRecordModel>> {
    let rows = sqlx::query_as::<_, ConsentRecordModel>(&format!(
        "{SELECT_COLUMNS} WHERE principal_id = $1 ORDER BY sequence ASC"
    ))
    .bind(principal_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

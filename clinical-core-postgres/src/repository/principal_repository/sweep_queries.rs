use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::principal::PrincipalModel;

use super::find_by_id::SELECT_COLUMNS;

/// Principals whose deletion schedule has passed and who still await
/// anonymization.
pub(super) async fn list_deletions_due_impl(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> StoreResult<Vec<PrincipalModel>> {
    let rows = sqlx::query_as::<_, PrincipalModel>(&format!(
        "{SELECT_COLUMNS} WHERE anonymized = FALSE AND deletion_scheduled_for IS NOT NULL AND deletion_scheduled_for <= $1"
    ))
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Principals with no activity since the cutoff. The caller applies the
/// notice-cadence filter on `inactivity_notified_at`.
pub(super) async fn list_inactive_since_impl(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
) -> StoreResult<Vec<PrincipalModel>> {
    let rows = sqlx::query_as::<_, PrincipalModel>(&format!(
        "{SELECT_COLUMNS} WHERE anonymized = FALSE AND updated_at < $1"
    ))
    .bind(cutoff)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

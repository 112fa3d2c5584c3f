use sqlx::PgPool;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::consent_record::ConsentRecordModel;

pub(super) async fn append_impl(
    pool: &PgPool,
    item: &ConsentRecordModel,
) -> StoreResult<ConsentRecordModel> {
    let row = sqlx::query_as::<_, ConsentRecordModel>(
        r#"
        INSERT INTO consent_records
            (id, principal_id, category, granted, created_at,
             origin_ip, client_identifier, policy_version)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, sequence, principal_id, category, granted, created_at,
                  origin_ip, client_identifier, policy_version
        "#,
    )
    .bind(item.id)
    .bind(item.principal_id)
    .bind(&item.category)
    .bind(item.granted)
    .bind(item.created_at)
    .bind(&item.origin_ip)
    .bind(&item.client_identifier)
    .bind(&item.policy_version)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

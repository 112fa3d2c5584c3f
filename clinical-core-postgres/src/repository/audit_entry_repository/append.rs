use sqlx::PgPool;

use clinical_core_api::error::StoreResult;
use clinical_core_db::models::audit_entry::AuditEntryModel;

/// The sequence column is a bigserial assigned by the database, so the
/// incoming model's `sequence` field is ignored and the stored row is
/// returned with the real value.
pub(super) async fn append_impl(
    pool: &PgPool,
    item: &AuditEntryModel,
) -> StoreResult<AuditEntryModel> {
    let row = sqlx::query_as::<_, AuditEntryModel>(
        r#"
        INSERT INTO audit_entries
            (id, principal_id, kind, resource_type, resource_id,
             recorded_at, origin_ip, client_identifier, detail)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, sequence, principal_id, kind, resource_type, resource_id,
                  recorded_at, origin_ip, client_identifier, detail
        "#,
    )
    .bind(item.id)
    .bind(item.principal_id)
    .bind(item.kind)
    .bind(item.resource_type)
    .bind(item.resource_id)
    .bind(item.recorded_at)
    .bind(&item.origin_ip)
    .bind(&item.client_identifier)
    .bind(&item.detail)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

use sqlx::{PgPool, Postgres, QueryBuilder};

use clinical_core_api::domain::{AuditFilter, Page, PageRequest};
use clinical_core_api::error::StoreResult;
use clinical_core_db::models::audit_entry::AuditEntryModel;

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AuditFilter) {
    builder.push(" WHERE TRUE");
    if let Some(principal_id) = filter.principal_id {
        builder.push(" AND principal_id = ").push_bind(principal_id);
    }
    if let Some(kind) = filter.kind {
        builder.push(" AND kind = ").push_bind(kind);
    }
    if let Some(resource_type) = filter.resource_type {
        builder.push(" AND resource_type = ").push_bind(resource_type);
    }
    if let Some(from) = filter.from {
        builder.push(" AND recorded_at >= ").push_bind(from);
    }
    if let Some(until) = filter.until {
        builder.push(" AND recorded_at <= ").push_bind(until);
    }
}

/// Newest-first compliance query. Ordering is by the bigserial sequence,
/// not `recorded_at`, so wall-clock ties never reorder entries across
/// pages.
pub(super) async fn query_audits_impl(
    pool: &PgPool,
    filter: &AuditFilter,
    page: PageRequest,
) -> StoreResult<Page<AuditEntryModel>> {
    let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM audit_entries");
    push_filters(&mut count_builder, filter);
    let (total,): (i64,) = count_builder.build_query_as().fetch_one(pool).await?;

    let mut builder = QueryBuilder::new(
        "SELECT id, sequence, principal_id, kind, resource_type, resource_id, \
         recorded_at, origin_ip, client_identifier, detail FROM audit_entries",
    );
    push_filters(&mut builder, filter);
    builder
        .push(" ORDER BY sequence DESC LIMIT ")
        .push_bind(page.limit as i64)
        .push(" OFFSET ")
        .push_bind(page.offset as i64);
    let items = builder
        .build_query_as::<AuditEntryModel>()
        .fetch_all(pool)
        .await?;

    Ok(Page::new(items, total as usize, page.limit, page.offset))
}

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use clinical_core_api::domain::{AuditFilter, Page, PageRequest};
use clinical_core_api::error::StoreResult;
use clinical_core_db::{
    models::audit_entry::AuditEntryModel,
    repository::{append::Append, query_audits::QueryAudits},
};

pub struct AuditEntryRepositoryImpl {
    pub(crate) pool: Arc<PgPool>,
}

impl AuditEntryRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Append<Postgres, AuditEntryModel> for AuditEntryRepositoryImpl {
    async fn append(&self, item: &AuditEntryModel) -> StoreResult<AuditEntryModel> {
        super::append::append_impl(&self.pool, item).await
    }
}

#[async_trait]
impl QueryAudits<Postgres> for AuditEntryRepositoryImpl {
    async fn query_audits(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> StoreResult<Page<AuditEntryModel>> {
        super::query_audits::query_audits_impl(&self.pool, filter, page).await
    }
}

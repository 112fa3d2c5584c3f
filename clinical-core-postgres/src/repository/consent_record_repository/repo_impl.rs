use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use clinical_core_api::error::StoreResult;
use clinical_core_db::{models::consent_record::ConsentRecordModel, repository::append::Append};

pub struct ConsentRecordRepositoryImpl {
    pub(crate) pool: Arc<PgPool>,
}

impl ConsentRecordRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn latest(
        &self,
        principal_id: Uuid,
        category: &str,
    ) -> StoreResult<Option<ConsentRecordModel>> {
        super::history::latest_impl(&self.pool, principal_id, category).await
    }

    pub async fn history(
        &self,
        principal_id: Uuid,
        category: &str,
    ) -> StoreResult<Vec<ConsentRecordModel>> {
        super::history::history_impl(&self.pool, principal_id, category).await
    }

    pub async fn history_for_principal(
        &self,
        principal_id: Uuid,
    ) -> StoreResult<Vec<ConsentRecordModel>> {
        super::history::history_for_principal_impl(&self.pool, principal_id).await
    }
}

#[async_trait]
impl Append<Postgres, ConsentRecordModel> for ConsentRecordRepositoryImpl {
    async fn append(&self, item: &ConsentRecordModel) -> StoreResult<ConsentRecordModel> {
        super::append::append_impl(&self.pool, item).await
    }
}

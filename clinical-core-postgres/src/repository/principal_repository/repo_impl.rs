use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use clinical_core_api::error::StoreResult;
use clinical_core_db::{
    models::principal::PrincipalModel,
    repository::{create::Create, find_by_id::FindById, update::Update},
};

pub struct PrincipalRepositoryImpl {
    pub(crate) pool: Arc<PgPool>,
}

impl PrincipalRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<PrincipalModel>> {
        super::find_by_email::find_by_email_impl(&self.pool, email).await
    }

    pub async fn list_deletions_due(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> StoreResult<Vec<PrincipalModel>> {
        super::sweep_queries::list_deletions_due_impl(&self.pool, now).await
    }

    pub async fn list_inactive_since(
        &self,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> StoreResult<Vec<PrincipalModel>> {
        super::sweep_queries::list_inactive_since_impl(&self.pool, cutoff).await
    }
}

#[async_trait]
impl FindById<Postgres, PrincipalModel> for PrincipalRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<PrincipalModel>> {
        super::find_by_id::find_by_id_impl(&self.pool, id).await
    }
}

#[async_trait]
impl Create<Postgres, PrincipalModel> for PrincipalRepositoryImpl {
    async fn create(&self, item: &PrincipalModel) -> StoreResult<()> {
        super::create::create_impl(&self.pool, item).await
    }
}

#[async_trait]
impl Update<Postgres, PrincipalModel> for PrincipalRepositoryImpl {
    async fn update(&self, item: &PrincipalModel) -> StoreResult<()> {
        super::update::update_impl(&self.pool, item).await
    }
}

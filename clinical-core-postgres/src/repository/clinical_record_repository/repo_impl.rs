use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use clinical_core_api::error::StoreResult;
use clinical_core_db::{
    models::clinical_record::ClinicalRecordModel,
    repository::{create::Create, find_by_id::FindById},
};

pub struct ClinicalRecordRepositoryImpl {
    pub(crate) pool: Arc<PgPool>,
}

impl ClinicalRecordRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn list_for_patient(&self, patient_id: Uuid) -> StoreResult<Vec<ClinicalRecordModel>> {
        super::list_for_patient::list_for_patient_impl(&self.pool, patient_id).await
    }

    pub async fn anonymize_for_patient(&self, patient_id: Uuid) -> StoreResult<u64> {
        super::anonymize::anonymize_for_patient_impl(&self.pool, patient_id).await
    }
}

#[async_trait]
impl FindById<Postgres, ClinicalRecordModel> for ClinicalRecordRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ClinicalRecordModel>> {
        super::find_by_id::find_by_id_impl(&self.pool, id).await
    }
}

#[async_trait]
impl Create<Postgres, ClinicalRecordModel> for ClinicalRecordRepositoryImpl {
    async fn create(&self, item: &ClinicalRecordModel) -> StoreResult<()> {
        super::create::create_impl(&self.pool, item).await
    }
}

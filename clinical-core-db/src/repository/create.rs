use async_trait::async_trait;
use sqlx::Database;

use clinical_core_api::error::StoreResult;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for inserting one entity
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement the Identifiable trait
#[async_trait]
pub trait Create<DB: Database, T: Identifiable>: Send + Sync {
    /// Insert the entity. Fails when a row with the same id already
    /// exists.
    async fn create(&self, item: &T) -> StoreResult<()>;
}

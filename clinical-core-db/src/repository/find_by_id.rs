use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use clinical_core_api::error::StoreResult;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for loading an entity by its ID
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement the Identifiable trait
///
/// # Example
/// ```ignore
/// impl FindById<Postgres, PrincipalModel> for PrincipalRepositoryImpl {
///     async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<PrincipalModel>> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait FindById<DB: Database, T: Identifiable>: Send + Sync {
    /// Load an entity by its unique identifier, or None when no row
    /// exists.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<T>>;
}

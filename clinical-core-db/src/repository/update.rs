use async_trait::async_trait;
use sqlx::Database;

use clinical_core_api::error::StoreResult;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for updating one entity in place.
///
/// Implemented only for mutable entities (principals, assignments,
/// clinical records). Audit and consent models deliberately have no
/// Update implementation anywhere in the workspace.
#[async_trait]
pub trait Update<DB: Database, T: Identifiable>: Send + Sync {
    /// Replace the stored row. Fails when the entity does not exist.
    async fn update(&self, item: &T) -> StoreResult<()>;
}

use async_trait::async_trait;
use sqlx::Database;

use clinical_core_api::error::StoreResult;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for append-only entities (audit entries,
/// consent records). The store assigns the monotonic sequence and
/// returns the stored row; there is no matching update or delete trait
/// for these types.
#[async_trait]
pub trait Append<DB: Database, T: Identifiable>: Send + Sync {
    /// Append one row and return it with its assigned sequence.
    async fn append(&self, item: &T) -> StoreResult<T>;
}

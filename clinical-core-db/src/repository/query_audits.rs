use async_trait::async_trait;
use sqlx::Database;

use clinical_core_api::domain::{AuditFilter, Page, PageRequest};
use clinical_core_api::error::StoreResult;

use crate::models::audit_entry::AuditEntryModel;

/// Repository trait for compliance queries over the audit trail
///
/// Results are always newest-first; the sequence column breaks wall-clock
/// ties so per-principal creation order survives pagination.
///
/// # Example
/// ```ignore
/// use clinical_core_api::domain::{AuditFilter, PageRequest};
///
/// let page = repo.query_audits(&AuditFilter::for_principal(id), PageRequest::new(20, 0)).await?;
/// println!("Page {} of {}", page.page_number(), page.total_pages());
/// ```
#[async_trait]
pub trait QueryAudits<DB: Database>: Send + Sync {
    async fn query_audits(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> StoreResult<Page<AuditEntryModel>>;
}

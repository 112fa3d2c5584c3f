pub mod append;
pub mod query_audits;
pub mod repo_impl;

pub use repo_impl::AuditEntryRepositoryImpl;

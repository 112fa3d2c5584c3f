pub mod postgres_stores;
pub mod repository;

pub use postgres_stores::PostgresStores;
pub use repository::audit_entry_repository::AuditEntryRepositoryImpl;
pub use repository::principal_repository::PrincipalRepositoryImpl;

#[cfg(test)]
pub mod test_helper;

pub mod create;
pub mod find_by_email;
pub mod find_by_id;
pub mod repo_impl;
pub mod sweep_queries;
pub mod update;

pub use repo_impl::PrincipalRepositoryImpl;

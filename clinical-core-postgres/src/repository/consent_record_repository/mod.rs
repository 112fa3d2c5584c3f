pub mod append;
pub mod history;
pub mod repo_impl;

pub use repo_impl::ConsentRecordRepositoryImpl;

pub mod anonymize;
pub mod create;
pub mod find_by_id;
pub mod list_for_patient;
pub mod repo_impl;

pub use repo_impl::ClinicalRecordRepositoryImpl;

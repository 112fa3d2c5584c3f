pub mod assignment_repository;
pub mod audit_entry_repository;
pub mod clinical_record_repository;
pub mod consent_record_repository;
pub mod principal_repository;

pub mod assignment;
pub mod audit_entry;
pub mod clinical_record;
pub mod consent_record;
pub mod identifiable;
pub mod principal;

// Re-exports
pub use assignment::*;
pub use audit_entry::*;
pub use clinical_record::*;
pub use consent_record::*;
pub use identifiable::*;
pub use principal::*;

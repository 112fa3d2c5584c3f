pub mod access;
pub mod audit_trail;
pub mod auth;
pub mod consent;
pub mod data_subject;
pub mod records;
pub mod sweeps;
pub mod token;

// Re-exports
pub use access::*;
pub use audit_trail::*;
pub use auth::*;
pub use consent::*;
pub use data_subject::*;
pub use records::*;
pub use sweeps::*;
pub use token::*;

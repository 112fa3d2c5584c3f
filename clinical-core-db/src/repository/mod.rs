pub mod append;
pub mod create;
pub mod find_by_id;
pub mod query_audits;
pub mod update;

// Re-exports
pub use append::*;
pub use create::*;
pub use find_by_id::*;
pub use query_audits::*;
pub use update::*;

pub mod audit;
pub mod consent;
pub mod decision;
pub mod export;
pub mod operation;
pub mod pagination;
pub mod principal;
pub mod requests;
pub mod resource;
pub mod role;

// Re-exports
pub use audit::*;
pub use consent::*;
pub use decision::*;
pub use export::*;
pub use operation::*;
pub use pagination::*;
pub use principal::*;
pub use requests::*;
pub use resource::*;
pub use role::*;

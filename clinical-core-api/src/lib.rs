pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;

pub use config::*;
pub use domain::*;
pub use error::*;

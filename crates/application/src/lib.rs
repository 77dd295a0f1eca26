//! Application layer - the company consistency protocol
//!
//! Contains the port definitions for every collaborator in the surrounding
//! world and the company service that keeps the company aggregate and the
//! world consistent with each other.

pub mod error;
pub mod policy;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use policy::CompanyPolicy;
pub use ports::*;
pub use services::*;

//! Request workflows. Each function resolves the caller, checks the
//! permission table and then talks to the repository traits.

pub mod customers;
pub mod errors;
pub mod roles;
pub mod session;
pub mod users;

pub use errors::{ServiceError, ServiceResult};

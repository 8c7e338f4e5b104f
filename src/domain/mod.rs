//! Domain aggregates shared by the server and the sync client.

pub mod auth;
pub mod customer;
pub mod permissions;
pub mod query;
pub mod types;
pub mod user;

//! DTO modules that bridge services with the HTTP API and its client.

pub mod api;

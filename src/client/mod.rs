//! Client-side sync layer: URL query codec, list controller, optimistic
//! mutations and the HTTP transport they run on.
//!
//! Everything here is single-threaded and built on `Rc`/`RefCell`; futures are
//! not `Send` and are meant for a current-thread executor.

pub mod api;
pub mod errors;
pub mod list;
pub mod optimistic;
pub mod query;
pub mod session;

#[cfg(test)]
mod fake;

pub use api::{ClientConfig, CustomerApi, CustomerCollection, HttpCustomerApi};
pub use errors::{MutationError, Operation, SyncError};
pub use list::{CustomerList, RefreshOutcome};
pub use optimistic::{Entry, EntryKey, OptimisticList, RemoteCollection};
pub use session::Session;

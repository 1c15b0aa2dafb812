//! SQLite backend for quill's client-local storage.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The store implements
//! [`quill_core::storage::KeyValueStore`], which is what the credential
//! store persists the session token through.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

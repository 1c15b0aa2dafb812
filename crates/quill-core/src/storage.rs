//! The [`KeyValueStore`] trait: durable, client-local string storage.
//!
//! Implemented by storage backends (e.g. `quill-store-sqlite`). The
//! [`MemoryStore`] here keeps everything in process and is used by tests and
//! by sessions that should not outlive the process.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{Mutex, PoisonError},
};

/// A string-keyed, string-valued store scoped to one client installation.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value stored under `key`, if any.
  fn get_item<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous value.
  fn set_item<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove `key`. Removing an absent key is not an error.
  fn remove_item<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// In-process [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
  items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn with_items<R>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> R {
    let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut items)
  }
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  async fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
    Ok(self.with_items(|items| items.get(key).cloned()))
  }

  async fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
    self.with_items(|items| items.insert(key.to_owned(), value.to_owned()));
    Ok(())
  }

  async fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
    self.with_items(|items| items.remove(key));
    Ok(())
  }
}

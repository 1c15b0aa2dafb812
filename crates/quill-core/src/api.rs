//! Seams to the remote API.
//!
//! [`ResourceApi`] is implemented once per transport (the `quill` binary
//! ships a reqwest implementation) and used by the synchronizer for every
//! collection. No retries happen behind these traits: a failed call
//! resolves to an [`Error`](crate::Error) immediately.

use std::future::Future;

use crate::{
  Result,
  credential::Token,
  resource::{Resource, ResourceId},
};

/// What the server sent back for a write.
///
/// The synchronizer never inserts `item` into its mirror; it only uses
/// `message` for user feedback. Both are optional because backends differ in
/// what they echo.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt<T> {
  pub item:    Option<T>,
  pub message: Option<String>,
}

impl<T> Receipt<T> {
  pub fn empty() -> Self {
    Self {
      item:    None,
      message: None,
    }
  }

  pub fn with_message(message: impl Into<String>) -> Self {
    Self {
      item:    None,
      message: Some(message.into()),
    }
  }
}

impl<T> Default for Receipt<T> {
  fn default() -> Self { Self::empty() }
}

/// CRUD operations against one remote collection.
///
/// Every call carries the caller's [`Token`].
pub trait ResourceApi<T: Resource>: Send + Sync {
  /// Fetch the whole collection.
  fn list<'a>(
    &'a self,
    token: &'a Token,
  ) -> impl Future<Output = Result<Vec<T>>> + Send + 'a;

  /// Create a new resource from `draft`.
  fn create<'a>(
    &'a self,
    token: &'a Token,
    draft: &'a T::Draft,
  ) -> impl Future<Output = Result<Receipt<T>>> + Send + 'a;

  /// Replace the editable fields of resource `id` with `draft`.
  fn update<'a>(
    &'a self,
    token: &'a Token,
    id: &'a ResourceId,
    draft: &'a T::Draft,
  ) -> impl Future<Output = Result<Receipt<T>>> + Send + 'a;

  /// Delete resource `id`.
  fn remove<'a>(
    &'a self,
    token: &'a Token,
    id: &'a ResourceId,
  ) -> impl Future<Output = Result<Receipt<T>>> + Send + 'a;
}

/// Exchanges the operator's shared key for a [`Token`].
pub trait AuthApi: Send + Sync {
  fn login<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Token>> + Send + 'a;
}

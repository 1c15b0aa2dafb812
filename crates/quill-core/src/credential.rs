//! The credential: one bearer token per client installation.
//!
//! [`CredentialStore`] is the single writer of the token. It loads the
//! persisted value once ([`CredentialStore::load`]), answers reads from
//! memory, and writes changes through to its [`KeyValueStore`] before
//! updating the in-memory slot. The token is trusted until the server
//! rejects it; no expiry is tracked here.

use std::{
  fmt,
  sync::{PoisonError, RwLock},
};

use crate::{Error, Result, storage::KeyValueStore};

/// Storage key the token lives under.
pub const CREDENTIAL_KEY: &str = "jwt";

// ─── Token ───────────────────────────────────────────────────────────────────

/// An opaque bearer token. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
  pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }

  /// The raw token, for attaching to a request.
  pub fn expose(&self) -> &str { &self.0 }
}

impl fmt::Debug for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Token(<redacted>)")
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Single-slot, persisted credential.
pub struct CredentialStore<S> {
  backend: S,
  slot:    RwLock<Option<Token>>,
}

impl<S: KeyValueStore> CredentialStore<S> {
  /// Load the persisted token (if any) from `backend`.
  pub async fn load(backend: S) -> Result<Self> {
    let persisted = backend
      .get_item(CREDENTIAL_KEY)
      .await
      .map_err(Error::storage)?
      .filter(|raw| !raw.is_empty())
      .map(Token::new);
    tracing::debug!(present = persisted.is_some(), "credential loaded");
    Ok(Self {
      backend,
      slot: RwLock::new(persisted),
    })
  }

  /// The current token, if one is stored.
  pub fn get(&self) -> Option<Token> {
    self.slot.read().unwrap_or_else(PoisonError::into_inner).clone()
  }

  pub fn is_present(&self) -> bool {
    self
      .slot
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .is_some()
  }

  /// Persist `token` and make it the current credential.
  pub async fn set(&self, token: Token) -> Result<()> {
    self
      .backend
      .set_item(CREDENTIAL_KEY, token.expose())
      .await
      .map_err(Error::storage)?;
    *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    Ok(())
  }

  /// Forget the credential, both persisted and in memory.
  ///
  /// The in-memory slot is cleared even if the backend fails.
  pub async fn clear(&self) -> Result<()> {
    *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    self
      .backend
      .remove_item(CREDENTIAL_KEY)
      .await
      .map_err(Error::storage)
  }

  pub fn backend(&self) -> &S { &self.backend }
}

//! Integration tests for `SqliteStore`.

use quill_core::{
  credential::{CREDENTIAL_KEY, CredentialStore, Token},
  storage::KeyValueStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Key/value ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_key_returns_none() {
  let s = store().await;
  assert_eq!(s.get_item("jwt").await.unwrap(), None);
}

#[tokio::test]
async fn set_overwrites_single_slot() {
  let s = store().await;
  s.set_item("jwt", "first").await.unwrap();
  s.set_item("jwt", "second").await.unwrap();

  assert_eq!(s.get_item("jwt").await.unwrap().as_deref(), Some("second"));
  assert_eq!(s.len().await.unwrap(), 1);
}

#[tokio::test]
async fn remove_is_idempotent() {
  let s = store().await;
  s.set_item("jwt", "token").await.unwrap();
  s.remove_item("jwt").await.unwrap();
  s.remove_item("jwt").await.unwrap();
  assert_eq!(s.get_item("jwt").await.unwrap(), None);
  assert_eq!(s.len().await.unwrap(), 0);
}

#[tokio::test]
async fn keys_are_independent() {
  let s = store().await;
  s.set_item("jwt", "token").await.unwrap();
  s.set_item("theme", "dark").await.unwrap();
  s.remove_item("theme").await.unwrap();
  assert_eq!(s.get_item("jwt").await.unwrap().as_deref(), Some("token"));
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn credential_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nested").join("storage.db");

  {
    let creds = CredentialStore::load(SqliteStore::open(&path).await.unwrap())
      .await
      .unwrap();
    assert!(!creds.is_present());
    creds.set(Token::new("persisted")).await.unwrap();
  }

  let creds = CredentialStore::load(SqliteStore::open(&path).await.unwrap())
    .await
    .unwrap();
  assert_eq!(creds.get(), Some(Token::new("persisted")));

  creds.clear().await.unwrap();
  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(reopened.get_item(CREDENTIAL_KEY).await.unwrap(), None);
}

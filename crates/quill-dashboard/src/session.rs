//! Login, logout and the navigator they drive.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quill_core::{
  Error, Result, api::AuthApi, credential::CredentialStore, storage::KeyValueStore,
};

use crate::gate::{HOME_ROUTE, Navigator, Route, SessionGate};

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const LOGIN_UNREACHABLE: &str = "An error occurred. Please try again.";
const KEY_REQUIRED: &str = "Please enter the access key.";

/// The operator's session: credential, location, and the login error slot.
pub struct Session<A, S> {
  auth:        A,
  credentials: Arc<CredentialStore<S>>,
  navigator:   Mutex<Navigator>,
  last_error:  Mutex<Option<String>>,
}

impl<A, S> Session<A, S>
where
  A: AuthApi,
  S: KeyValueStore,
{
  /// Start at `start`, already settled against the gate.
  pub fn new(auth: A, credentials: Arc<CredentialStore<S>>, start: &str) -> Self {
    let mut navigator = Navigator::new(SessionGate::default(), start);
    navigator.settle(credentials.is_present());
    Self {
      auth,
      credentials,
      navigator: Mutex::new(navigator),
      last_error: Mutex::new(None),
    }
  }

  fn navigator(&self) -> MutexGuard<'_, Navigator> {
    self.navigator.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn set_error(&self, message: Option<String>) {
    *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = message;
  }

  pub fn credentials(&self) -> &Arc<CredentialStore<S>> { &self.credentials }

  pub fn is_authenticated(&self) -> bool { self.credentials.is_present() }

  pub fn location(&self) -> String { self.navigator().current().to_owned() }

  pub fn route(&self) -> Option<Route> { self.navigator().route() }

  pub fn last_error(&self) -> Option<String> {
    self
      .last_error
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Dismiss the login error, e.g. once the operator edits the key.
  pub fn clear_error(&self) { self.set_error(None); }

  /// Go to `path`; the gate may send us elsewhere. Returns where we landed.
  pub fn navigate(&self, path: &str) -> String {
    let present = self.credentials.is_present();
    self.navigator().navigate(path, present).to_owned()
  }

  /// Re-run the gate. Returns whether the location changed.
  pub fn settle(&self) -> bool {
    let present = self.credentials.is_present();
    self.navigator().settle(present)
  }

  /// Exchange `key` for a token, store it and go home.
  pub async fn login(&self, key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
      let err = Error::ValidationFailed(KEY_REQUIRED.to_owned());
      self.set_error(Some(KEY_REQUIRED.to_owned()));
      return Err(err);
    }

    let token = match self.auth.login(key).await {
      Ok(token) => token,
      Err(err) => {
        let message = match err.server_message() {
          Some(message) => message.to_owned(),
          None if err.is_transport() => LOGIN_UNREACHABLE.to_owned(),
          None => LOGIN_FAILED.to_owned(),
        };
        tracing::warn!(error = %err, "login failed");
        self.set_error(Some(message));
        return Err(err);
      }
    };

    if let Err(err) = self.credentials.set(token).await {
      tracing::warn!(error = %err, "could not persist credential");
      self.set_error(Some(LOGIN_UNREACHABLE.to_owned()));
      return Err(err);
    }

    tracing::info!("logged in");
    self.set_error(None);
    self.navigate(HOME_ROUTE);
    Ok(())
  }

  /// Forget the credential and return to the login route.
  pub async fn logout(&self) -> Result<()> {
    let result = self.credentials.clear().await;
    tracing::info!("logged out");
    self.set_error(None);
    self.settle();
    result
  }
}

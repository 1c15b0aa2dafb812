//! The resource synchronizer: CRUD against one remote collection plus the
//! local mirror of it.
//!
//! The mirror has exactly one writer, the list path. Writes never patch the
//! mirror; a successful write bumps the *refresh epoch*, and
//! [`Synchronizer::sync_epoch`] re-fetches whenever the epoch has moved
//! since the last fetch. Overlapping `list()` calls are ordered by issue
//! ticket: only the most recently issued call may replace the mirror.
//!
//! Known limitation: if the most recent `list()` never resolves, earlier
//! responses are still discarded and `is_loading` stays `true` until another
//! list is issued and resolves.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quill_core::{
  Error, Result,
  api::{Receipt, ResourceApi},
  credential::{CredentialStore, Token},
  resource::{Collection, Resource, ResourceId},
  storage::KeyValueStore,
};

// ─── Notices ─────────────────────────────────────────────────────────────────

/// The single user-visible message slot. Latest wins; nothing is queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  Success(String),
  Error(String),
}

/// Which operation a message describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
  List,
  Create,
  Update,
  Remove,
}

impl Op {
  fn verbs(self) -> (&'static str, &'static str, &'static str) {
    match self {
      Self::List => ("fetch", "fetching", "fetched"),
      Self::Create => ("add", "adding", "added"),
      Self::Update => ("update", "updating", "updated"),
      Self::Remove => ("delete", "deleting", "deleted"),
    }
  }

  fn object(self, collection: &Collection) -> &'static str {
    match self {
      Self::List => collection.plural,
      _ => collection.noun,
    }
  }

  /// "Career added successfully!"
  pub fn success_message(self, collection: &Collection) -> String {
    let (_, _, past) = self.verbs();
    format!("{} {past} successfully!", collection.title_noun())
  }

  /// The message shown for `err`: the server's own message when it sent
  /// one, otherwise a fallback worded after the failure class.
  pub fn failure_message(self, collection: &Collection, err: &Error) -> String {
    if let Some(message) = err.server_message() {
      return message.to_owned();
    }
    let (verb, gerund, _) = self.verbs();
    let object = self.object(collection);
    match err {
      Error::ValidationFailed(message) => message.clone(),
      Error::NotFound { .. } => {
        format!("{} no longer exists.", collection.title_noun())
      }
      Error::Unauthenticated => "Your session has expired.".to_owned(),
      Error::Storage(_) => "Could not access local storage.".to_owned(),
      err if err.is_transport() => format!("Error {gerund} {object}."),
      Error::RemoteFailure { .. } => format!("Failed to {verb} {object}."),
    }
  }
}

// ─── Delete confirmation ─────────────────────────────────────────────────────

/// A pending delete awaiting the operator's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
  id:    ResourceId,
  title: String,
}

impl DeleteRequest {
  pub fn id(&self) -> &ResourceId { &self.id }

  /// Title of the targeted resource, for the confirmation prompt.
  pub fn title(&self) -> &str { &self.title }

  /// The operator said yes.
  pub fn confirm(self) -> ConfirmedDelete { ConfirmedDelete { id: self.id } }
}

/// Proof that a delete was confirmed. Only obtainable from
/// [`DeleteRequest::confirm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedDelete {
  id: ResourceId,
}

impl ConfirmedDelete {
  pub fn id(&self) -> &ResourceId { &self.id }
}

// ─── Synchronizer ────────────────────────────────────────────────────────────

/// What became of a `list()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
  /// The response replaced the mirror.
  Applied { count: usize },
  /// A newer `list()` was issued meanwhile; the response was dropped.
  Superseded,
}

struct SyncState<T> {
  mirror:        Arc<Vec<T>>,
  /// Ticket of the most recently issued `list()`.
  latest_ticket: u64,
  loading:       bool,
  epoch:         u64,
  fetched_epoch: u64,
  notice:        Option<Notice>,
}

/// Keeps a local mirror of one remote collection.
pub struct Synchronizer<T, A, S> {
  api:         A,
  credentials: Arc<CredentialStore<S>>,
  state:       Mutex<SyncState<T>>,
}

impl<T, A, S> Synchronizer<T, A, S>
where
  T: Resource,
  A: ResourceApi<T>,
  S: KeyValueStore,
{
  pub fn new(api: A, credentials: Arc<CredentialStore<S>>) -> Self {
    Self {
      api,
      credentials,
      state: Mutex::new(SyncState {
        mirror:        Arc::new(Vec::new()),
        latest_ticket: 0,
        loading:       false,
        epoch:         0,
        fetched_epoch: 0,
        notice:        None,
      }),
    }
  }

  fn state(&self) -> MutexGuard<'_, SyncState<T>> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn collection() -> Collection { T::COLLECTION }

  // ── Reactive state ────────────────────────────────────────────────────────

  pub fn api(&self) -> &A { &self.api }

  /// Snapshot of the mirror.
  pub fn mirror(&self) -> Arc<Vec<T>> { Arc::clone(&self.state().mirror) }

  /// The mirror entry with `id`, if present.
  pub fn find(&self, id: &ResourceId) -> Option<T> {
    self.state().mirror.iter().find(|r| r.id() == id).cloned()
  }

  /// `true` while the most recently issued `list()` is outstanding. Writes
  /// never set this.
  pub fn is_loading(&self) -> bool { self.state().loading }

  pub fn epoch(&self) -> u64 { self.state().epoch }

  pub fn notice(&self) -> Option<Notice> { self.state().notice.clone() }

  pub fn last_error(&self) -> Option<String> {
    match self.state().notice {
      Some(Notice::Error(ref m)) => Some(m.clone()),
      _ => None,
    }
  }

  pub fn last_success(&self) -> Option<String> {
    match self.state().notice {
      Some(Notice::Success(ref m)) => Some(m.clone()),
      _ => None,
    }
  }

  pub fn clear_notice(&self) { self.state().notice = None; }

  fn set_notice(&self, notice: Notice) { self.state().notice = Some(notice); }

  /// Record a failure of `op` in the notice slot.
  ///
  /// A rejected credential is not shown inline; it is cleared so the
  /// session gate sends the operator back to login.
  pub async fn report(&self, op: Op, err: &Error) {
    if matches!(err, Error::Unauthenticated) {
      tracing::warn!(
        collection = Self::collection().plural,
        ?op,
        "credential missing or rejected; clearing it"
      );
      if let Err(clear_err) = self.credentials.clear().await {
        tracing::warn!(error = %clear_err, "failed to clear credential");
      }
      return;
    }
    let message = op.failure_message(&Self::collection(), err);
    tracing::warn!(collection = Self::collection().plural, ?op, error = %err, "{message}");
    self.set_notice(Notice::Error(message));
  }

  fn token(&self) -> Result<Token> {
    self.credentials.get().ok_or(Error::Unauthenticated)
  }

  // ── Refresh epoch ─────────────────────────────────────────────────────────

  fn bump_epoch(&self) {
    let mut state = self.state();
    state.epoch += 1;
    tracing::debug!(
      collection = Self::collection().plural,
      epoch = state.epoch,
      "refresh epoch advanced"
    );
  }

  /// Initial fetch: advances the epoch and syncs to it.
  pub async fn mount(&self) -> Result<Option<ListOutcome>> {
    self.bump_epoch();
    self.sync_epoch().await
  }

  /// Fetch if (and only if) the epoch moved since the last fetch. Cheap to
  /// call on every render.
  pub async fn sync_epoch(&self) -> Result<Option<ListOutcome>> {
    {
      let mut state = self.state();
      if state.fetched_epoch == state.epoch {
        return Ok(None);
      }
      state.fetched_epoch = state.epoch;
    }
    self.list().await.map(Some)
  }

  // ── Operations ────────────────────────────────────────────────────────────

  /// Fetch the collection and replace the mirror, unless a newer `list()`
  /// was issued while this one was in flight.
  pub async fn list(&self) -> Result<ListOutcome> {
    let token = match self.token() {
      Ok(token) => token,
      Err(err) => {
        self.report(Op::List, &err).await;
        return Err(err);
      }
    };

    let ticket = {
      let mut state = self.state();
      state.latest_ticket += 1;
      state.loading = true;
      state.latest_ticket
    };

    let result = self.api.list(&token).await;

    let err = {
      let mut state = self.state();
      if ticket != state.latest_ticket {
        tracing::debug!(
          collection = Self::collection().plural,
          ticket,
          latest = state.latest_ticket,
          "discarding superseded list response"
        );
        return Ok(ListOutcome::Superseded);
      }
      state.loading = false;
      match result {
        Ok(items) => {
          let count = items.len();
          state.mirror = Arc::new(items);
          return Ok(ListOutcome::Applied { count });
        }
        Err(err) => err,
      }
    };

    self.report(Op::List, &err).await;
    Err(err)
  }

  /// Create a resource. On success the epoch advances; the mirror is left
  /// alone until the next fetch.
  pub async fn create(&self, draft: &T::Draft) -> Result<Receipt<T>> {
    let result = match self.token() {
      Ok(token) => self.api.create(&token, draft).await,
      Err(err) => Err(err),
    };
    self.finish_write(Op::Create, result).await
  }

  /// Replace the editable fields of `id`. Same refresh policy as
  /// [`Synchronizer::create`]. A target deleted meanwhile surfaces as
  /// `NotFound` and the mirror stays as it is.
  pub async fn update(
    &self,
    id: &ResourceId,
    draft: &T::Draft,
  ) -> Result<Receipt<T>> {
    let result = match self.token() {
      Ok(token) => self.api.update(&token, id, draft).await,
      Err(err) => Err(err),
    };
    self.finish_write(Op::Update, result).await
  }

  /// Start a delete of `id`. Returns `None` if the mirror has no such entry.
  pub fn request_delete(&self, id: &ResourceId) -> Option<DeleteRequest> {
    self.find(id).map(|r| DeleteRequest {
      id:    r.id().clone(),
      title: r.title().to_owned(),
    })
  }

  /// Delete a confirmed target.
  pub async fn remove(&self, confirmed: ConfirmedDelete) -> Result<Receipt<T>> {
    let result = match self.token() {
      Ok(token) => self.api.remove(&token, &confirmed.id).await,
      Err(err) => Err(err),
    };
    self.finish_write(Op::Remove, result).await
  }

  async fn finish_write(
    &self,
    op: Op,
    result: Result<Receipt<T>>,
  ) -> Result<Receipt<T>> {
    match result {
      Ok(receipt) => {
        let message = match op {
          Op::Remove => receipt
            .message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| op.success_message(&Self::collection())),
          _ => op.success_message(&Self::collection()),
        };
        tracing::info!(collection = Self::collection().plural, ?op, "{message}");
        self.set_notice(Notice::Success(message));
        self.bump_epoch();
        Ok(receipt)
      }
      Err(err) => {
        self.report(op, &err).await;
        Err(err)
      }
    }
  }
}

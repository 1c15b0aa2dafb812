//! [`Board`]: one collection page. A [`Synchronizer`] for the mirror plus a
//! [`FormController`] for the draft, behind the operations a presentation
//! layer calls.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quill_core::{
  Error, Result,
  api::{Receipt, ResourceApi},
  credential::CredentialStore,
  resource::{Resource, ResourceId},
  storage::KeyValueStore,
};

use crate::{
  form::{FormController, Mode, SubmitStart, SubmitTarget},
  sync::{ConfirmedDelete, DeleteRequest, ListOutcome, Notice, Op, Synchronizer},
};

/// What a call to [`Board::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
  Created,
  Updated,
  /// A submission from this form is still in flight; nothing was sent.
  Busy,
  /// The board is viewing; there is no draft to submit.
  NotEditing,
}

pub struct Board<T: Resource, A, S> {
  sync: Synchronizer<T, A, S>,
  form: Mutex<FormController<T::Draft>>,
}

impl<T, A, S> Board<T, A, S>
where
  T: Resource,
  A: ResourceApi<T>,
  S: KeyValueStore,
{
  pub fn new(api: A, credentials: Arc<CredentialStore<S>>) -> Self {
    Self {
      sync: Synchronizer::new(api, credentials),
      form: Mutex::new(FormController::new()),
    }
  }

  fn form(&self) -> MutexGuard<'_, FormController<T::Draft>> {
    self.form.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn synchronizer(&self) -> &Synchronizer<T, A, S> { &self.sync }

  // ── Refresh ───────────────────────────────────────────────────────────────

  /// First fetch when the page is shown.
  pub async fn mount(&self) -> Result<Option<ListOutcome>> { self.sync.mount().await }

  /// Operator-requested re-fetch. Advances the epoch like [`Board::mount`].
  pub async fn reload(&self) -> Result<Option<ListOutcome>> { self.sync.mount().await }

  /// Re-fetch if a write advanced the epoch since the last fetch.
  pub async fn refresh(&self) -> Result<Option<ListOutcome>> {
    self.sync.sync_epoch().await
  }

  async fn refresh_after_write(&self) {
    // Failures are already in the notice slot.
    let _ = self.sync.sync_epoch().await;
  }

  // ── Reactive state ────────────────────────────────────────────────────────

  pub fn mirror(&self) -> Arc<Vec<T>> { self.sync.mirror() }

  pub fn mode(&self) -> Mode { self.form().mode() }

  /// A copy of the current draft, if adding or editing.
  pub fn draft(&self) -> Option<T::Draft> { self.form().draft().cloned() }

  /// Apply `f` to the draft. Returns `false` while viewing.
  pub fn edit_draft(&self, f: impl FnOnce(&mut T::Draft)) -> bool {
    match self.form().draft_mut() {
      Some(draft) => {
        f(draft);
        true
      }
      None => false,
    }
  }

  pub fn is_loading(&self) -> bool { self.sync.is_loading() }

  pub fn is_submitting(&self) -> bool { self.form().is_submitting() }

  pub fn notice(&self) -> Option<Notice> { self.sync.notice() }

  pub fn last_error(&self) -> Option<String> { self.sync.last_error() }

  pub fn last_success(&self) -> Option<String> { self.sync.last_success() }

  pub fn clear_notice(&self) { self.sync.clear_notice() }

  // ── Mode transitions ──────────────────────────────────────────────────────

  pub fn open_add(&self) -> bool { self.form().open_add() }

  /// Open the edit form for `id`. If the entry vanished from the mirror the
  /// mode stays `Viewing` and the miss is shown as a notice.
  pub async fn open_edit(&self, id: &ResourceId) -> bool {
    let mirror = self.sync.mirror();
    let opened = self.form().open_edit(id, mirror.as_slice());
    match opened {
      Ok(opened) => opened,
      Err(err) => {
        self.sync.report(Op::Update, &err).await;
        false
      }
    }
  }

  pub fn cancel(&self) -> bool { self.form().cancel() }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Validate the draft and send it. On success the form closes and the
  /// mirror is re-fetched.
  pub async fn submit(&self) -> Result<Submitted> {
    let (mode, start) = {
      let mut form = self.form();
      (form.mode(), form.begin_submit())
    };
    let submission = match start {
      Ok(SubmitStart::Ready(submission)) => submission,
      Ok(SubmitStart::Busy) => return Ok(Submitted::Busy),
      Ok(SubmitStart::Closed) => return Ok(Submitted::NotEditing),
      Err(err) => {
        let op = match mode {
          Mode::Editing(_) => Op::Update,
          _ => Op::Create,
        };
        self.sync.report(op, &err).await;
        return Err(err);
      }
    };

    let result = match &submission.target {
      SubmitTarget::Create => self
        .sync
        .create(&submission.draft)
        .await
        .map(|_| Submitted::Created),
      SubmitTarget::Update(id) => self
        .sync
        .update(id, &submission.draft)
        .await
        .map(|_| Submitted::Updated),
    };

    self.form().finish_submit(&submission, result.is_ok());
    if result.is_ok() {
      self.refresh_after_write().await;
    }
    result
  }

  /// Ask to delete `id`. `NotFound` if it is no longer in the mirror.
  pub fn request_delete(&self, id: &ResourceId) -> Result<DeleteRequest> {
    self.sync.request_delete(id).ok_or_else(|| Error::NotFound {
      id:      id.clone(),
      message: None,
    })
  }

  /// Delete a confirmed target and re-fetch on success.
  pub async fn delete(&self, confirmed: ConfirmedDelete) -> Result<Receipt<T>> {
    let receipt = self.sync.remove(confirmed).await?;
    self.refresh_after_write().await;
    Ok(receipt)
  }
}

//! Scriptable in-process stand-ins for the remote API.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use quill_core::{
  Error, Result,
  api::{AuthApi, Receipt, ResourceApi},
  credential::Token,
  listing::Listing,
  post::Post,
  resource::{Resource, ResourceId},
};
use tokio::sync::oneshot;

/// One call as the fake server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  List,
  Create,
  Update(ResourceId),
  Remove(ResourceId),
}

/// Builds what the server would store for a draft.
pub trait FromDraft: Resource {
  fn from_draft(id: ResourceId, draft: &Self::Draft) -> Self;
}

impl FromDraft for Post {
  fn from_draft(id: ResourceId, draft: &Self::Draft) -> Self {
    Post {
      id,
      title: draft.title.clone(),
      thumbnail: draft.thumbnail.clone(),
      body: draft.body.clone(),
      tags: draft.tags.items().to_vec(),
      created_at: None,
      views: Some(0),
    }
  }
}

impl FromDraft for Listing {
  fn from_draft(id: ResourceId, draft: &Self::Draft) -> Self {
    Listing {
      id,
      title: draft.title.clone(),
      description: draft.description.clone(),
      deadline: draft.deadline.clone(),
      qualification: draft.qualification.items().to_vec(),
      required_skills: draft.required_skills.items().to_vec(),
      tags: draft.tags.items().to_vec(),
      employment_type: draft.employment_type,
      work_mode: draft.work_mode,
      job_level: draft.job_level,
      salary: draft.salary.clone(),
      created_at: None,
    }
  }
}

fn dropped_gate() -> Error {
  Error::RemoteFailure {
    status:  None,
    message: None,
  }
}

// ─── Resource API ────────────────────────────────────────────────────────────

struct ScriptedList<T> {
  items: Vec<T>,
  gate:  oneshot::Receiver<()>,
}

struct FakeState<T> {
  items:       Vec<T>,
  calls:       Vec<Call>,
  tokens:      Vec<String>,
  scripted:    VecDeque<ScriptedList<T>>,
  write_gates: VecDeque<oneshot::Receiver<()>>,
  failures:    VecDeque<Error>,
}

/// A collection server held in memory. Clones share the same server.
pub struct FakeApi<T> {
  state: Arc<Mutex<FakeState<T>>>,
}

impl<T> Clone for FakeApi<T> {
  fn clone(&self) -> Self {
    Self {
      state: Arc::clone(&self.state),
    }
  }
}

impl<T: FromDraft> FakeApi<T> {
  pub fn with_items(items: Vec<T>) -> Self {
    Self {
      state: Arc::new(Mutex::new(FakeState {
        items,
        calls: Vec::new(),
        tokens: Vec::new(),
        scripted: VecDeque::new(),
        write_gates: VecDeque::new(),
        failures: VecDeque::new(),
      })),
    }
  }

  pub fn new() -> Self { Self::with_items(Vec::new()) }

  fn state(&self) -> MutexGuard<'_, FakeState<T>> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn calls(&self) -> Vec<Call> { self.state().calls.clone() }

  pub fn count(&self, call: &Call) -> usize {
    self.state().calls.iter().filter(|c| *c == call).count()
  }

  /// Tokens attached to each call, in order.
  pub fn tokens(&self) -> Vec<String> { self.state().tokens.clone() }

  pub fn server_items(&self) -> Vec<T> { self.state().items.clone() }

  /// Delete `id` behind the client's back.
  pub fn server_remove(&self, id: &ResourceId) {
    self.state().items.retain(|item| item.id() != id);
  }

  /// The next call of any kind fails with `err`.
  pub fn fail_next(&self, err: Error) { self.state().failures.push_back(err); }

  /// The next `list()` answers `items` once the returned sender fires.
  pub fn script_list(&self, items: Vec<T>) -> oneshot::Sender<()> {
    let (tx, rx) = oneshot::channel();
    self
      .state()
      .scripted
      .push_back(ScriptedList { items, gate: rx });
    tx
  }

  /// The next write is held until the returned sender fires.
  pub fn hold_next_write(&self) -> oneshot::Sender<()> {
    let (tx, rx) = oneshot::channel();
    self.state().write_gates.push_back(rx);
    tx
  }

  /// Yield until `call` has been seen `n` times.
  pub async fn wait_for(&self, call: &Call, n: usize) {
    while self.count(call) < n {
      tokio::task::yield_now().await;
    }
  }

  fn begin(&self, call: Call, token: &Token) -> Result<()> {
    let mut state = self.state();
    state.calls.push(call);
    state.tokens.push(token.expose().to_owned());
    match state.failures.pop_front() {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }

  async fn write_gate(&self) -> Result<()> {
    let gate = self.state().write_gates.pop_front();
    if let Some(gate) = gate {
      gate.await.map_err(|_| dropped_gate())?;
    }
    Ok(())
  }

  fn not_found(id: &ResourceId) -> Error {
    Error::NotFound {
      id:      id.clone(),
      message: None,
    }
  }
}

impl<T: FromDraft> ResourceApi<T> for FakeApi<T> {
  async fn list(&self, token: &Token) -> Result<Vec<T>> {
    self.begin(Call::List, token)?;
    let scripted = self.state().scripted.pop_front();
    match scripted {
      Some(ScriptedList { items, gate }) => {
        gate.await.map_err(|_| dropped_gate())?;
        Ok(items)
      }
      None => Ok(self.state().items.clone()),
    }
  }

  async fn create(&self, token: &Token, draft: &T::Draft) -> Result<Receipt<T>> {
    self.begin(Call::Create, token)?;
    self.write_gate().await?;
    let item = T::from_draft(ResourceId::new(uuid::Uuid::new_v4().to_string()), draft);
    self.state().items.push(item.clone());
    Ok(Receipt {
      item:    Some(item),
      message: None,
    })
  }

  async fn update(
    &self,
    token: &Token,
    id: &ResourceId,
    draft: &T::Draft,
  ) -> Result<Receipt<T>> {
    self.begin(Call::Update(id.clone()), token)?;
    self.write_gate().await?;
    let mut state = self.state();
    let slot = state
      .items
      .iter_mut()
      .find(|item| item.id() == id)
      .ok_or_else(|| Self::not_found(id))?;
    *slot = T::from_draft(id.clone(), draft);
    Ok(Receipt {
      item:    Some(slot.clone()),
      message: None,
    })
  }

  async fn remove(&self, token: &Token, id: &ResourceId) -> Result<Receipt<T>> {
    self.begin(Call::Remove(id.clone()), token)?;
    self.write_gate().await?;
    let mut state = self.state();
    let before = state.items.len();
    state.items.retain(|item| item.id() != id);
    if state.items.len() == before {
      return Err(Self::not_found(id));
    }
    Ok(Receipt::empty())
  }
}

// ─── Auth API ────────────────────────────────────────────────────────────────

/// Accepts exactly one key.
pub struct FakeAuth {
  key:      String,
  token:    String,
  calls:    Mutex<usize>,
  failures: Mutex<VecDeque<Error>>,
}

impl FakeAuth {
  pub fn new(key: &str, token: &str) -> Self {
    Self {
      key:      key.to_owned(),
      token:    token.to_owned(),
      calls:    Mutex::new(0),
      failures: Mutex::new(VecDeque::new()),
    }
  }

  pub fn calls(&self) -> usize { *self.calls.lock().unwrap_or_else(PoisonError::into_inner) }

  pub fn fail_next(&self, err: Error) {
    self
      .failures
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push_back(err);
  }
}

impl AuthApi for FakeAuth {
  async fn login(&self, key: &str) -> Result<Token> {
    *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    let failure = self
      .failures
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .pop_front();
    if let Some(err) = failure {
      return Err(err);
    }
    if key == self.key {
      Ok(Token::new(self.token.clone()))
    } else {
      Err(Error::Unauthenticated)
    }
  }
}

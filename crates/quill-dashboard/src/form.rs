//! The form mode controller: view / add / edit, and the draft that lives
//! only while adding or editing.
//!
//! The draft is carried inside the mode, so "editing without a draft" or
//! "adding and editing at once" cannot be represented. Drafts are discarded,
//! never merged back, on cancel or successful submit.

use quill_core::{
  Error, Result,
  resource::{Draft, Resource, ResourceId},
};

/// The externally visible mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Viewing,
  Adding,
  Editing(ResourceId),
}

#[derive(Debug, Clone, PartialEq)]
enum FormState<D> {
  Viewing,
  Adding { draft: D },
  Editing { id: ResourceId, draft: D },
}

/// Where a submission goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
  Create,
  Update(ResourceId),
}

/// A validated snapshot of the draft, handed to the synchronizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission<D> {
  pub target: SubmitTarget,
  pub draft:  D,
  session:    u64,
}

/// Result of asking to submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart<D> {
  Ready(Submission<D>),
  /// This form already has a submission in flight.
  Busy,
  /// Nothing to submit while viewing.
  Closed,
}

/// Owns the mode and the draft.
#[derive(Debug, Clone)]
pub struct FormController<D> {
  state:     FormState<D>,
  /// Bumped on every open and close; a submission only closes the form
  /// session it was started from.
  session:   u64,
  in_flight: Option<u64>,
}

impl<D: Draft> Default for FormController<D> {
  fn default() -> Self { Self::new() }
}

impl<D: Draft> FormController<D> {
  pub fn new() -> Self {
    Self {
      state:     FormState::Viewing,
      session:   0,
      in_flight: None,
    }
  }

  pub fn mode(&self) -> Mode {
    match &self.state {
      FormState::Viewing => Mode::Viewing,
      FormState::Adding { .. } => Mode::Adding,
      FormState::Editing { id, .. } => Mode::Editing(id.clone()),
    }
  }

  pub fn is_viewing(&self) -> bool { matches!(self.state, FormState::Viewing) }

  pub fn draft(&self) -> Option<&D> {
    match &self.state {
      FormState::Viewing => None,
      FormState::Adding { draft } | FormState::Editing { draft, .. } => Some(draft),
    }
  }

  pub fn draft_mut(&mut self) -> Option<&mut D> {
    match &mut self.state {
      FormState::Viewing => None,
      FormState::Adding { draft } | FormState::Editing { draft, .. } => Some(draft),
    }
  }

  /// `true` while a submission from the current form session is outstanding.
  pub fn is_submitting(&self) -> bool { self.in_flight == Some(self.session) }

  fn enter(&mut self, state: FormState<D>) {
    self.state = state;
    self.session += 1;
  }

  /// `Viewing -> Adding` with a default draft (every list field empty).
  /// Returns `false` if not currently viewing.
  pub fn open_add(&mut self) -> bool {
    if !self.is_viewing() {
      return false;
    }
    self.enter(FormState::Adding { draft: D::default() });
    true
  }

  /// `Viewing -> Editing(id)`, seeding the draft from the mirror entry.
  ///
  /// A missing entry (the mirror was refreshed since the list was drawn)
  /// yields `NotFound` and leaves the mode unchanged. Opening while already
  /// adding or editing is ignored.
  pub fn open_edit<T>(&mut self, id: &ResourceId, mirror: &[T]) -> Result<bool>
  where
    T: Resource<Draft = D>,
  {
    if !self.is_viewing() {
      return Ok(false);
    }
    let resource = mirror
      .iter()
      .find(|r| r.id() == id)
      .ok_or_else(|| Error::NotFound {
        id:      id.clone(),
        message: None,
      })?;
    self.enter(FormState::Editing {
      id:    id.clone(),
      draft: resource.to_draft(),
    });
    Ok(true)
  }

  /// Back to `Viewing`, discarding the draft.
  pub fn cancel(&mut self) -> bool {
    if self.is_viewing() {
      return false;
    }
    self.enter(FormState::Viewing);
    true
  }

  /// Validate and snapshot the draft for submission.
  ///
  /// Validation failures leave the mode untouched and never mark the form
  /// as in flight.
  pub fn begin_submit(&mut self) -> Result<SubmitStart<D>> {
    let (target, draft) = match &self.state {
      FormState::Viewing => return Ok(SubmitStart::Closed),
      FormState::Adding { draft } => (SubmitTarget::Create, draft),
      FormState::Editing { id, draft } => (SubmitTarget::Update(id.clone()), draft),
    };
    if self.in_flight == Some(self.session) {
      return Ok(SubmitStart::Busy);
    }
    draft.validate()?;
    let submission = Submission {
      target,
      draft: draft.clone(),
      session: self.session,
    };
    self.in_flight = Some(self.session);
    Ok(SubmitStart::Ready(submission))
  }

  /// Settle a submission. On success the form it came from closes, unless
  /// the operator already moved on to another form session.
  pub fn finish_submit(&mut self, submission: &Submission<D>, succeeded: bool) {
    if self.in_flight == Some(submission.session) {
      self.in_flight = None;
    }
    if succeeded && submission.session == self.session && !self.is_viewing() {
      self.enter(FormState::Viewing);
    }
  }
}

#[cfg(test)]
mod tests {
  use quill_core::{
    listing::{Listing, ListingDraft},
    post::{Post, PostDraft},
  };

  use super::*;

  fn post(id: &str, title: &str) -> Post {
    Post {
      id:         ResourceId::new(id),
      title:      title.into(),
      thumbnail:  "https://cdn.example/t.png".into(),
      body:       "body".into(),
      tags:       vec!["news".into()],
      created_at: None,
      views:      Some(3),
    }
  }

  fn ready<D: std::fmt::Debug>(start: SubmitStart<D>) -> Submission<D> {
    match start {
      SubmitStart::Ready(s) => s,
      other => panic!("expected a ready submission, got {other:?}"),
    }
  }

  #[test]
  fn starts_viewing_without_draft() {
    let form = FormController::<PostDraft>::new();
    assert_eq!(form.mode(), Mode::Viewing);
    assert!(form.draft().is_none());
  }

  #[test]
  fn open_add_resets_draft_and_list_fields() {
    let mut form = FormController::<PostDraft>::new();
    let mirror = vec![post("p1", "Hello")];
    form.open_edit(&ResourceId::new("p1"), &mirror).unwrap();
    form.cancel();

    assert!(form.open_add());
    assert_eq!(form.mode(), Mode::Adding);
    assert_eq!(form.draft(), Some(&PostDraft::default()));
    assert!(form.draft().unwrap().tags.is_empty());
  }

  #[test]
  fn open_edit_seeds_from_mirror() {
    let mut form = FormController::<PostDraft>::new();
    let mirror = vec![post("p1", "Hello"), post("p2", "World")];
    assert!(form.open_edit(&ResourceId::new("p2"), &mirror).unwrap());
    assert_eq!(form.mode(), Mode::Editing(ResourceId::new("p2")));
    let draft = form.draft().unwrap();
    assert_eq!(draft.title, "World");
    assert_eq!(draft.tags.items(), ["news"]);
  }

  #[test]
  fn open_edit_on_missing_id_is_a_no_op() {
    let mut form = FormController::<PostDraft>::new();
    let mirror = vec![post("p1", "Hello")];
    let err = form.open_edit(&ResourceId::new("gone"), &mirror).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(form.mode(), Mode::Viewing);
  }

  #[test]
  fn transitions_only_from_viewing() {
    let mut form = FormController::<PostDraft>::new();
    let mirror = vec![post("p1", "Hello")];
    assert!(form.open_add());
    assert!(!form.open_add());
    assert!(!form.open_edit(&ResourceId::new("p1"), &mirror).unwrap());
    assert_eq!(form.mode(), Mode::Adding);
    assert!(form.cancel());
    assert!(!form.cancel());
  }

  #[test]
  fn cancel_discards_edits_without_touching_mirror() {
    let mut form = FormController::<PostDraft>::new();
    let mirror = vec![post("p1", "Hello")];
    let before = mirror.clone();

    form.open_edit(&ResourceId::new("p1"), &mirror).unwrap();
    form.draft_mut().unwrap().title = "Changed".into();
    form.draft_mut().unwrap().tags.set_pending("extra");
    form.draft_mut().unwrap().tags.add();
    form.cancel();

    assert_eq!(mirror, before);
    assert!(form.draft().is_none());
  }

  #[test]
  fn submit_from_viewing_is_closed() {
    let mut form = FormController::<PostDraft>::new();
    assert_eq!(form.begin_submit().unwrap(), SubmitStart::Closed);
  }

  #[test]
  fn validation_failure_keeps_mode_and_is_not_in_flight() {
    let mut form = FormController::<ListingDraft>::new();
    form.open_add();
    form.draft_mut().unwrap().title = "Launch".into();

    let err = form.begin_submit().unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(_)));
    assert_eq!(form.mode(), Mode::Adding);
    assert!(!form.is_submitting());
  }

  #[test]
  fn second_submit_while_in_flight_is_busy() {
    let mut form = FormController::<PostDraft>::new();
    let mirror = vec![post("p1", "Hello")];
    form.open_edit(&ResourceId::new("p1"), &mirror).unwrap();

    let submission = ready(form.begin_submit().unwrap());
    assert_eq!(submission.target, SubmitTarget::Update(ResourceId::new("p1")));
    assert!(form.is_submitting());
    assert_eq!(form.begin_submit().unwrap(), SubmitStart::Busy);

    form.finish_submit(&submission, false);
    assert!(!form.is_submitting());
    assert_eq!(form.mode(), Mode::Editing(ResourceId::new("p1")));
  }

  #[test]
  fn success_closes_only_the_originating_session() {
    let mut form = FormController::<PostDraft>::new();
    let mirror = vec![post("p1", "Hello")];
    form.open_edit(&ResourceId::new("p1"), &mirror).unwrap();
    let submission = ready(form.begin_submit().unwrap());

    // Operator cancels and starts a new draft while the call is outstanding.
    form.cancel();
    form.open_add();
    form.finish_submit(&submission, true);
    assert_eq!(form.mode(), Mode::Adding);

    let mut form = FormController::<PostDraft>::new();
    form.open_edit(&ResourceId::new("p1"), &mirror).unwrap();
    let submission = ready(form.begin_submit().unwrap());
    form.finish_submit(&submission, true);
    assert_eq!(form.mode(), Mode::Viewing);
    assert!(form.draft().is_none());
  }

  #[test]
  fn listing_edit_seeds_every_list_field() {
    let listing: Listing = serde_json::from_value(serde_json::json!({
      "_id": "c1",
      "title": "Dev",
      "qualification": ["BSc"],
      "requiredSkills": ["Rust", "SQL"],
      "tags": ["Web Development"]
    }))
    .unwrap();
    let mut form = FormController::<ListingDraft>::new();
    form.open_edit(&ResourceId::new("c1"), &[listing]).unwrap();
    let draft = form.draft().unwrap();
    assert_eq!(draft.qualification.items(), ["BSc"]);
    assert_eq!(draft.required_skills.items(), ["Rust", "SQL"]);
    assert_eq!(draft.tags.items(), ["Web Development"]);
  }
}

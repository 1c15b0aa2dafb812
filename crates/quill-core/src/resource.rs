//! The [`Resource`] and [`Draft`] traits implemented by every managed
//! collection, plus the field descriptors the form layer is generic over.
//!
//! A resource is what the server returns; a draft is the client's working
//! copy of a resource's *editable* fields. Drafts never carry the identity
//! or server-managed fields, so those can never be sent on write.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::{Error, Result, list_field::ListField};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Server-assigned identifier of a resource. Opaque to the client and
/// immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ResourceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ResourceId {
  fn from(id: &str) -> Self { Self::new(id) }
}

impl From<String> for ResourceId {
  fn from(id: String) -> Self { Self(id) }
}

/// Read an explicit `null` as the field's default. The backend stores
/// records whose optional fields were never filled in as `null`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ─── Collection metadata ─────────────────────────────────────────────────────

/// Default remote routes for one collection. `{id}` in `update` and `remove`
/// is replaced with the target id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routes {
  pub list:     &'static str,
  /// Key of the array inside the list response envelope.
  pub list_key: &'static str,
  pub create:   &'static str,
  pub update:   &'static str,
  pub remove:   &'static str,
}

/// Static description of a managed collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
  /// Singular, lower-case noun used in user-facing messages ("blog").
  pub noun:   &'static str,
  /// Plural, lower-case noun ("blogs"). Also used as the collection's key in
  /// configuration.
  pub plural: &'static str,
  pub routes: Routes,
}

impl Collection {
  /// The singular noun with its first letter upper-cased ("Blog").
  pub fn title_noun(&self) -> String { capitalize(self.noun) }
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

// ─── Field descriptors ───────────────────────────────────────────────────────

/// How a draft field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  /// Single-line free text.
  Text,
  /// Multi-line free text.
  LongText,
  /// A media reference: a URL or a `data:` URI.
  Media,
  /// Exactly one of a fixed set of options.
  Choice(&'static [&'static str]),
  /// An ordered list of free-text entries, edited through a [`ListField`].
  List,
  /// An ordered subset of a fixed vocabulary, toggled on and off.
  Tags(&'static [&'static str]),
}

impl FieldKind {
  pub fn is_list(&self) -> bool { matches!(self, Self::List | Self::Tags(_)) }
}

/// Describes one editable field of a [`Draft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  /// Name used by [`Draft`] accessors; matches the wire name.
  pub name:      &'static str,
  pub label:     &'static str,
  pub kind:      FieldKind,
  /// Required scalars must be non-blank and required lists non-empty
  /// before a submit is dispatched.
  pub required:  bool,
  /// Singular noun for one entry of a list field ("skill").
  pub item_noun: &'static str,
  /// Free-text list fields only: adding a value already present is a no-op.
  pub unique:    bool,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// The editable fields of a resource.
///
/// Field access is by [`FieldSpec::name`] so that validation and form
/// rendering can be written once for every collection.
pub trait Draft:
  Clone + Default + PartialEq + fmt::Debug + Serialize + Send + Sync + 'static
{
  /// Every editable field, in form order.
  const FIELDS: &'static [FieldSpec];

  /// Current value of a scalar field (text, media or choice).
  fn scalar(&self, field: &str) -> Option<&str>;

  /// Mutable access to a free-text scalar field. Choice fields are only
  /// changed through [`Draft::choose`].
  fn scalar_mut(&mut self, field: &str) -> Option<&mut String>;

  /// Select `option` for a choice field. Returns `false` if the field is not
  /// a choice or the option is not one of its values.
  fn choose(&mut self, field: &str, option: &str) -> bool;

  fn list(&self, field: &str) -> Option<&ListField>;

  fn list_mut(&mut self, field: &str) -> Option<&mut ListField>;

  fn field(name: &str) -> Option<&'static FieldSpec> {
    Self::FIELDS.iter().find(|f| f.name == name)
  }

  /// Advance a choice field to its next option, wrapping around.
  fn cycle_choice(&mut self, field: &str, forward: bool) -> bool {
    let Some(FieldKind::Choice(options)) = Self::field(field).map(|f| f.kind)
    else {
      return false;
    };
    if options.is_empty() {
      return false;
    }
    let current = self
      .scalar(field)
      .and_then(|v| options.iter().position(|o| *o == v))
      .unwrap_or(0);
    let next = if forward {
      (current + 1) % options.len()
    } else {
      (current + options.len() - 1) % options.len()
    };
    self.choose(field, options[next])
  }

  /// Reject the draft if a required field is blank or a required list is
  /// empty. All list problems are reported in one combined message.
  fn validate(&self) -> Result<()> {
    let mut blank = Vec::new();
    let mut empty_lists = Vec::new();

    for spec in Self::FIELDS.iter().filter(|f| f.required) {
      if spec.kind.is_list() {
        if self.list(spec.name).is_none_or(ListField::is_empty) {
          empty_lists.push(spec.item_noun);
        }
      } else if self.scalar(spec.name).is_none_or(|v| v.trim().is_empty()) {
        blank.push(spec.label);
      }
    }

    let mut problems = Vec::new();
    if !blank.is_empty() {
      problems.push(format!("Please fill in {}.", join_words(&blank)));
    }
    if !empty_lists.is_empty() {
      problems.push(format!(
        "Please add at least one {}.",
        join_words(&empty_lists)
      ));
    }

    if problems.is_empty() {
      Ok(())
    } else {
      Err(Error::ValidationFailed(problems.join(" ")))
    }
  }
}

/// An item of a remote collection.
pub trait Resource:
  Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
  type Draft: Draft;

  const COLLECTION: Collection;

  fn id(&self) -> &ResourceId;

  /// Short human label, used in lists and confirmation prompts.
  fn title(&self) -> &str;

  /// Copy the editable fields into a fresh draft.
  fn to_draft(&self) -> Self::Draft;
}

/// "a", "a and b", "a, b, and c".
fn join_words(words: &[&str]) -> String {
  match words {
    [] => String::new(),
    [one] => (*one).to_owned(),
    [a, b] => format!("{a} and {b}"),
    [init @ .., last] => format!("{}, and {last}", init.join(", ")),
  }
}

//! [`ListField`], the editor behind list-valued draft fields (tags, skills,
//! qualifications).
//!
//! Entries have no identity beyond their value and position, so views key
//! them by index (see [`ListField::keyed`]). Removing an entry shifts the
//! keys of everything after it; that is accepted because nothing holds on
//! to an entry across edits.
//!
//! Uniqueness is a caller policy: [`ListField::add`] appends whatever was
//! typed, while [`ListField::add_unique`] and [`ListField::toggle`] never
//! produce duplicates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered string entries plus the text currently being typed.
///
/// Serialises as a plain array of the committed entries; the pending input
/// never leaves the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListField {
  items:   Vec<String>,
  pending: String,
}

impl ListField {
  pub fn new() -> Self { Self::default() }

  /// Seed the editor with existing entries (e.g. when opening an edit form).
  pub fn from_items<I, S>(items: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      items:   items.into_iter().map(Into::into).collect(),
      pending: String::new(),
    }
  }

  pub fn items(&self) -> &[String] { &self.items }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  pub fn contains(&self, value: &str) -> bool {
    self.items.iter().any(|i| i == value)
  }

  /// Entries paired with their positional key.
  pub fn keyed(&self) -> impl Iterator<Item = (usize, &str)> {
    self.items.iter().map(String::as_str).enumerate()
  }

  pub fn pending(&self) -> &str { &self.pending }

  pub fn pending_mut(&mut self) -> &mut String { &mut self.pending }

  pub fn set_pending(&mut self, input: impl Into<String>) {
    self.pending = input.into();
  }

  /// Commit the trimmed pending input as a new entry and clear it.
  ///
  /// Blank input is ignored and left as typed. Returns whether an entry was
  /// appended.
  pub fn add(&mut self) -> bool {
    let value = self.pending.trim();
    if value.is_empty() {
      return false;
    }
    self.items.push(value.to_owned());
    self.pending.clear();
    true
  }

  /// Like [`ListField::add`], but a value already present is not appended
  /// again. The pending input is cleared either way.
  pub fn add_unique(&mut self) -> bool {
    let value = self.pending.trim();
    if value.is_empty() {
      return false;
    }
    if self.contains(value) {
      self.pending.clear();
      return false;
    }
    self.add()
  }

  /// Remove the entry at `index`. Out-of-range indexes are ignored.
  pub fn remove_at(&mut self, index: usize) -> Option<String> {
    (index < self.items.len()).then(|| self.items.remove(index))
  }

  /// Add `value` if absent, remove it if present. Returns whether it is
  /// present afterwards.
  pub fn toggle(&mut self, value: &str) -> bool {
    if let Some(pos) = self.items.iter().position(|i| i == value) {
      self.items.remove(pos);
      false
    } else {
      self.items.push(value.to_owned());
      true
    }
  }

  /// Drop every entry and the pending input.
  pub fn clear(&mut self) {
    self.items.clear();
    self.pending.clear();
  }
}

impl Serialize for ListField {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.items.serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for ListField {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    Vec::<String>::deserialize(deserializer).map(Self::from_items)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_ignores_whitespace_only_input() {
    let mut field = ListField::new();
    field.set_pending("  ");
    assert!(!field.add());
    assert!(field.is_empty());
    assert_eq!(field.pending(), "  ");
  }

  #[test]
  fn add_then_remove_returns_to_empty() {
    let mut field = ListField::new();
    field.set_pending("go");
    assert!(field.add());
    assert_eq!(field.items(), ["go"]);
    assert_eq!(field.pending(), "");

    assert_eq!(field.remove_at(0).as_deref(), Some("go"));
    assert!(field.is_empty());
  }

  #[test]
  fn add_trims_and_allows_repeats() {
    let mut field = ListField::new();
    field.set_pending("  rust ");
    field.add();
    field.set_pending("rust");
    field.add();
    assert_eq!(field.items(), ["rust", "rust"]);
  }

  #[test]
  fn add_unique_skips_existing_value() {
    let mut field = ListField::from_items(["rust"]);
    field.set_pending(" rust");
    assert!(!field.add_unique());
    assert_eq!(field.items(), ["rust"]);
    assert_eq!(field.pending(), "");

    field.set_pending("sql");
    assert!(field.add_unique());
    assert_eq!(field.items(), ["rust", "sql"]);
  }

  #[test]
  fn remove_at_out_of_bounds_is_a_no_op() {
    let mut field = ListField::from_items(["a", "b"]);
    assert_eq!(field.remove_at(2), None);
    assert_eq!(field.items(), ["a", "b"]);
  }

  #[test]
  fn remove_at_preserves_order_of_the_rest() {
    let mut field = ListField::from_items(["a", "b", "c"]);
    field.remove_at(1);
    let keyed: Vec<_> = field.keyed().collect();
    assert_eq!(keyed, vec![(0, "a"), (1, "c")]);
  }

  #[test]
  fn toggle_flips_membership_and_keeps_insertion_order() {
    let mut field = ListField::new();
    assert!(field.toggle("Web Development"));
    assert!(field.toggle("Digital Marketing"));
    assert!(!field.toggle("Web Development"));
    assert!(field.toggle("Web Development"));
    assert_eq!(field.items(), ["Digital Marketing", "Web Development"]);
  }

  #[test]
  fn serialises_as_plain_array_without_pending_input() {
    let mut field = ListField::from_items(["a"]);
    field.set_pending("draft");
    assert_eq!(serde_json::to_string(&field).unwrap(), r#"["a"]"#);

    let parsed: ListField = serde_json::from_str(r#"["x","y"]"#).unwrap();
    assert_eq!(parsed.items(), ["x", "y"]);
    assert_eq!(parsed.pending(), "");
  }
}

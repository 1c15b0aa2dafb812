//! Blog posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  list_field::ListField,
  resource::{
    Collection, Draft, FieldKind, FieldSpec, Resource, ResourceId, Routes, null_as_default,
  },
};

/// A blog post as returned by the server.
///
/// `created_at` and `views` are server-managed: they are read but never
/// serialised back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
  #[serde(rename = "_id")]
  pub id:         ResourceId,
  #[serde(deserialize_with = "null_as_default")]
  pub title:      String,
  /// URL or `data:` URI of the cover image.
  #[serde(default, deserialize_with = "null_as_default")]
  pub thumbnail:  String,
  /// HTML fragment.
  #[serde(default, deserialize_with = "null_as_default")]
  pub body:       String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub tags:       Vec<String>,
  #[serde(rename = "createdAt", default, skip_serializing)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing)]
  pub views:      Option<u64>,
}

/// Editable fields of a [`Post`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostDraft {
  pub title:     String,
  pub thumbnail: String,
  pub body:      String,
  pub tags:      ListField,
}

impl Draft for PostDraft {
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec {
      name:      "title",
      label:     "Title",
      kind:      FieldKind::Text,
      required:  true,
      item_noun: "",
      unique:    false,
    },
    FieldSpec {
      name:      "thumbnail",
      label:     "Thumbnail",
      kind:      FieldKind::Media,
      required:  true,
      item_noun: "",
      unique:    false,
    },
    FieldSpec {
      name:      "body",
      label:     "Body",
      kind:      FieldKind::LongText,
      required:  true,
      item_noun: "",
      unique:    false,
    },
    FieldSpec {
      name:      "tags",
      label:     "Tags",
      kind:      FieldKind::List,
      required:  false,
      item_noun: "tag",
      unique:    true,
    },
  ];

  fn scalar(&self, field: &str) -> Option<&str> {
    match field {
      "title" => Some(&self.title),
      "thumbnail" => Some(&self.thumbnail),
      "body" => Some(&self.body),
      _ => None,
    }
  }

  fn scalar_mut(&mut self, field: &str) -> Option<&mut String> {
    match field {
      "title" => Some(&mut self.title),
      "thumbnail" => Some(&mut self.thumbnail),
      "body" => Some(&mut self.body),
      _ => None,
    }
  }

  fn choose(&mut self, _field: &str, _option: &str) -> bool { false }

  fn list(&self, field: &str) -> Option<&ListField> {
    (field == "tags").then_some(&self.tags)
  }

  fn list_mut(&mut self, field: &str) -> Option<&mut ListField> {
    (field == "tags").then_some(&mut self.tags)
  }
}

impl Resource for Post {
  type Draft = PostDraft;

  const COLLECTION: Collection = Collection {
    noun:   "blog",
    plural: "blogs",
    routes: Routes {
      list:     "/get-blogs",
      list_key: "blogs",
      create:   "/add-blog",
      update:   "/update-blog/{id}",
      remove:   "/delete-blog/{id}",
    },
  };

  fn id(&self) -> &ResourceId { &self.id }

  fn title(&self) -> &str { &self.title }

  fn to_draft(&self) -> PostDraft {
    PostDraft {
      title:     self.title.clone(),
      thumbnail: self.thumbnail.clone(),
      body:      self.body.clone(),
      tags:      ListField::from_items(self.tags.iter().cloned()),
    }
  }
}

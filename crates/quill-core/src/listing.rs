//! Career listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr, VariantNames};

use crate::{
  list_field::ListField,
  resource::{
    Collection, Draft, FieldKind, FieldSpec, Resource, ResourceId, Routes, null_as_default,
  },
};

/// The fixed vocabulary a listing's tags are chosen from.
pub const TAG_OPTIONS: &[&str] =
  &["Software Development", "Digital Marketing", "Web Development"];

// ─── Choice fields ───────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  EnumString, IntoStaticStr, VariantNames,
)]
pub enum EmploymentType {
  #[default]
  #[serde(rename = "Full Time")]
  #[strum(serialize = "Full Time")]
  FullTime,
  #[serde(rename = "Part Time")]
  #[strum(serialize = "Part Time")]
  PartTime,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  EnumString, IntoStaticStr, VariantNames,
)]
pub enum WorkMode {
  #[default]
  Onsite,
  Remote,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  EnumString, IntoStaticStr, VariantNames,
)]
pub enum JobLevel {
  #[default]
  #[serde(rename = "Entry Level")]
  #[strum(serialize = "Entry Level")]
  EntryLevel,
  #[serde(rename = "Mid Level")]
  #[strum(serialize = "Mid Level")]
  MidLevel,
  Senior,
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// A job or internship listing as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
  #[serde(rename = "_id")]
  pub id:              ResourceId,
  #[serde(deserialize_with = "null_as_default")]
  pub title:           String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub description:     String,
  /// Free-form; the backend stores whatever the operator typed.
  #[serde(default, deserialize_with = "null_as_default")]
  pub deadline:        String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub qualification:   Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub required_skills: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub tags:            Vec<String>,
  #[serde(rename = "type", default, deserialize_with = "null_as_default")]
  pub employment_type: EmploymentType,
  #[serde(default, deserialize_with = "null_as_default")]
  pub work_mode:       WorkMode,
  #[serde(default, deserialize_with = "null_as_default")]
  pub job_level:       JobLevel,
  #[serde(default, deserialize_with = "null_as_default")]
  pub salary:          String,
  #[serde(default, skip_serializing)]
  pub created_at:      Option<DateTime<Utc>>,
}

/// Editable fields of a [`Listing`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
  pub title:           String,
  pub description:     String,
  pub deadline:        String,
  pub qualification:   ListField,
  pub required_skills: ListField,
  pub tags:            ListField,
  #[serde(rename = "type")]
  pub employment_type: EmploymentType,
  pub work_mode:       WorkMode,
  pub job_level:       JobLevel,
  pub salary:          String,
}

impl Draft for ListingDraft {
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
      name:      "description",
      label:     "Description",
      kind:      FieldKind::LongText,
      required:  true,
      item_noun: "",
      unique:    false,
    },
    FieldSpec {
      name:      "deadline",
      label:     "Deadline",
      kind:      FieldKind::Text,
      required:  false,
      item_noun: "",
      unique:    false,
    },
    FieldSpec {
      name:      "qualification",
      label:     "Qualification",
      kind:      FieldKind::List,
      required:  true,
      item_noun: "qualification",
      unique:    false,
    },
    FieldSpec {
      name:      "requiredSkills",
      label:     "Required Skills",
      kind:      FieldKind::List,
      required:  true,
      item_noun: "skill",
      unique:    false,
    },
    FieldSpec {
      name:      "tags",
      label:     "Tags",
      kind:      FieldKind::Tags(TAG_OPTIONS),
      required:  true,
      item_noun: "tag",
      unique:    false,
    },
    FieldSpec {
      name:      "type",
      label:     "Type",
      kind:      FieldKind::Choice(EmploymentType::VARIANTS),
      required:  true,
      item_noun: "",
      unique:    false,
    },
    FieldSpec {
      name:      "workMode",
      label:     "Work Mode",
      kind:      FieldKind::Choice(WorkMode::VARIANTS),
      required:  true,
      item_noun: "",
      unique:    false,
    },
    FieldSpec {
      name:      "jobLevel",
      label:     "Job Level",
      kind:      FieldKind::Choice(JobLevel::VARIANTS),
      required:  true,
      item_noun: "",
      unique:    false,
    },
    FieldSpec {
      name:      "salary",
      label:     "Salary",
      kind:      FieldKind::Text,
      required:  true,
      item_noun: "",
      unique:    false,
    },
  ];

  fn scalar(&self, field: &str) -> Option<&str> {
    match field {
      "title" => Some(&self.title),
      "description" => Some(&self.description),
      "deadline" => Some(&self.deadline),
      "salary" => Some(&self.salary),
      "type" => Some(self.employment_type.into()),
      "workMode" => Some(self.work_mode.into()),
      "jobLevel" => Some(self.job_level.into()),
      _ => None,
    }
  }

  fn scalar_mut(&mut self, field: &str) -> Option<&mut String> {
    match field {
      "title" => Some(&mut self.title),
      "description" => Some(&mut self.description),
      "deadline" => Some(&mut self.deadline),
      "salary" => Some(&mut self.salary),
      _ => None,
    }
  }

  fn choose(&mut self, field: &str, option: &str) -> bool {
    match field {
      "type" => option.parse().map(|v| self.employment_type = v).is_ok(),
      "workMode" => option.parse().map(|v| self.work_mode = v).is_ok(),
      "jobLevel" => option.parse().map(|v| self.job_level = v).is_ok(),
      _ => false,
    }
  }

  fn list(&self, field: &str) -> Option<&ListField> {
    match field {
      "qualification" => Some(&self.qualification),
      "requiredSkills" => Some(&self.required_skills),
      "tags" => Some(&self.tags),
      _ => None,
    }
  }

  fn list_mut(&mut self, field: &str) -> Option<&mut ListField> {
    match field {
      "qualification" => Some(&mut self.qualification),
      "requiredSkills" => Some(&mut self.required_skills),
      "tags" => Some(&mut self.tags),
      _ => None,
    }
  }
}

impl Resource for Listing {
  type Draft = ListingDraft;

  const COLLECTION: Collection = Collection {
    noun:   "career",
    plural: "careers",
    routes: Routes {
      list:     "/get-careers",
      list_key: "careers",
      create:   "/add-career",
      update:   "/update-career/{id}",
      remove:   "/delete-career/{id}",
    },
  };

  fn id(&self) -> &ResourceId { &self.id }

  fn title(&self) -> &str { &self.title }

  fn to_draft(&self) -> ListingDraft {
    ListingDraft {
      title:           self.title.clone(),
      description:     self.description.clone(),
      deadline:        self.deadline.clone(),
      qualification:   ListField::from_items(self.qualification.iter().cloned()),
      required_skills: ListField::from_items(self.required_skills.iter().cloned()),
      tags:            ListField::from_items(self.tags.iter().cloned()),
      employment_type: self.employment_type,
      work_mode:       self.work_mode,
      job_level:       self.job_level,
      salary:          self.salary.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::Error;

  fn complete_draft() -> ListingDraft {
    ListingDraft {
      title: "Rust Engineer".into(),
      description: "Build things".into(),
      qualification: ListField::from_items(["BSc"]),
      required_skills: ListField::from_items(["Rust"]),
      tags: ListField::from_items(["Software Development"]),
      salary: "Negotiable".into(),
      ..Default::default()
    }
  }

  #[test]
  fn draft_serialises_with_backend_field_names() {
    let json = serde_json::to_value(complete_draft()).unwrap();
    assert_eq!(json["requiredSkills"], json!(["Rust"]));
    assert_eq!(json["type"], "Full Time");
    assert_eq!(json["workMode"], "Onsite");
    assert_eq!(json["jobLevel"], "Entry Level");
    assert!(json.get("createdAt").is_none());
  }

  #[test]
  fn listing_round_trips_into_an_equal_draft() {
    let listing: Listing = serde_json::from_value(json!({
      "_id": "c1",
      "title": "Intern",
      "description": "Learn",
      "deadline": "2024-12-01",
      "qualification": ["HSC"],
      "requiredSkills": ["HTML", "CSS"],
      "tags": ["Web Development"],
      "type": "Part Time",
      "workMode": "Remote",
      "jobLevel": "Mid Level",
      "salary": "10k",
      "createdAt": "2024-09-01T00:00:00.000Z"
    }))
    .unwrap();
    let draft = listing.to_draft();
    assert_eq!(draft.employment_type, EmploymentType::PartTime);
    assert_eq!(draft.required_skills.items(), ["HTML", "CSS"]);
    assert_eq!(draft.scalar("jobLevel"), Some("Mid Level"));
  }

  #[test]
  fn null_fields_read_as_defaults() {
    let listing: Listing = serde_json::from_value(json!({
      "_id": "c1",
      "title": "Dev",
      "description": null,
      "deadline": null,
      "qualification": null,
      "type": null,
      "jobLevel": null,
      "salary": "1"
    }))
    .unwrap();
    assert_eq!(listing.deadline, "");
    assert_eq!(listing.description, "");
    assert!(listing.qualification.is_empty());
    assert_eq!(listing.employment_type, EmploymentType::FullTime);
    assert_eq!(listing.job_level, JobLevel::EntryLevel);
    assert_eq!(listing.salary, "1");
  }

  #[test]
  fn empty_list_fields_yield_one_combined_message() {
    let draft = ListingDraft {
      qualification: ListField::new(),
      required_skills: ListField::new(),
      tags: ListField::new(),
      ..complete_draft()
    };
    match draft.validate() {
      Err(Error::ValidationFailed(msg)) => assert_eq!(
        msg,
        "Please add at least one qualification, skill, and tag."
      ),
      other => panic!("expected validation failure, got {other:?}"),
    }
  }

  #[test]
  fn only_the_missing_lists_are_named() {
    let draft = ListingDraft {
      tags: ListField::new(),
      ..complete_draft()
    };
    match draft.validate() {
      Err(Error::ValidationFailed(msg)) => {
        assert_eq!(msg, "Please add at least one tag.");
      }
      other => panic!("expected validation failure, got {other:?}"),
    }
  }

  #[test]
  fn complete_draft_validates() {
    assert!(complete_draft().validate().is_ok());
  }

  #[test]
  fn choice_fields_cycle_and_wrap() {
    let mut draft = ListingDraft::default();
    assert!(draft.cycle_choice("jobLevel", true));
    assert_eq!(draft.job_level, JobLevel::MidLevel);
    assert!(draft.cycle_choice("jobLevel", true));
    assert!(draft.cycle_choice("jobLevel", true));
    assert_eq!(draft.job_level, JobLevel::EntryLevel);
    assert!(draft.cycle_choice("workMode", false));
    assert_eq!(draft.work_mode, WorkMode::Remote);
    assert!(!draft.cycle_choice("title", true));
  }

  #[test]
  fn choose_rejects_unknown_options() {
    let mut draft = ListingDraft::default();
    assert!(!draft.choose("type", "Contract"));
    assert!(draft.choose("type", "Part Time"));
    assert_eq!(draft.employment_type, EmploymentType::PartTime);
  }
}

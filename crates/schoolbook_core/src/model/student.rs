//! Student domain record.
//!
//! # Invariants
//! - `person_id` is unique per student record.
//! - `last_name` and `first_name` are required and non-empty.
//! - `class_unit_id` is nullable; the row itself is owned by its class
//!   and removed when the class is hard-deleted.

use crate::model::fields::{ActiveState, ContactInfo, Timestamps, ValidationError};
use serde::{Deserialize, Serialize};

/// One student, optionally enrolled in a single class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Row id; `None` until the record is persisted.
    pub id: Option<i64>,
    /// External person identifier, unique per student record.
    pub person_id: i64,
    /// Login in the upstream user system.
    pub user_name: Option<String>,
    /// Messenger account id, unique when present.
    pub max_user_id: Option<String>,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub contact: ContactInfo,
    pub state: ActiveState,
    /// Current class enrollment; clearing it never deletes the student.
    pub class_unit_id: Option<i64>,
    pub timestamps: Timestamps,
}

impl Student {
    /// Creates an unsaved student with the required identity fields.
    pub fn new(
        person_id: i64,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
    ) -> Self {
        Self {
            person_id,
            last_name: last_name.into(),
            first_name: first_name.into(),
            ..Self::default()
        }
    }

    /// `"{last} {first} {middle}"`, trimmed when middle name is absent.
    pub fn full_name(&self) -> String {
        format!(
            "{} {} {}",
            self.last_name,
            self.first_name,
            self.middle_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    /// Replaces the phone value, failing fast on wrong length.
    pub fn set_phone(&mut self, phone: Option<String>) -> Result<(), ValidationError> {
        self.contact.set_phone(phone)
    }

    /// Checked by repository write paths before any SQL mutation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::EmptyName { field: "last_name" });
        }
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::EmptyName { field: "first_name" });
        }
        self.contact.validate()
    }

    /// Marks this student inactive and stamps the deactivation time.
    pub fn deactivate(&mut self) {
        self.state.deactivate();
    }

    /// Restores this student and clears the deactivation time.
    pub fn activate(&mut self) {
        self.state.activate();
    }
}

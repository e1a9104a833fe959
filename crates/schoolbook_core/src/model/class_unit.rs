//! Class unit domain record.
//!
//! # Invariants
//! - A class owns its students: hard-deleting a class cascades to its
//!   student rows (schema-level `ON DELETE CASCADE`).
//! - Classes have no soft-delete state; they are removed by hard delete.

use serde::{Deserialize, Serialize};

use crate::model::fields::{Timestamps, ValidationError};

/// One class (form/homeroom group) of students.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassUnit {
    /// Row id; `None` until the record is persisted.
    pub id: Option<i64>,
    pub school_id: Option<i64>,
    pub class_level_id: Option<i64>,
    /// Display name, e.g. `"7B"`.
    pub name: String,
    /// Grade parallel, e.g. `"7"`.
    pub parallel: Option<String>,
    /// Letter within the parallel, e.g. `"B"`.
    pub literal: Option<String>,
    /// Messenger chat id, unique when present.
    pub max_user_id: Option<String>,
    /// Messenger invite link.
    pub max_link: Option<String>,
    pub timestamps: Timestamps,
}

impl ClassUnit {
    /// Creates an unsaved class with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Checked by repository write paths before any SQL mutation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName { field: "name" });
        }
        Ok(())
    }
}

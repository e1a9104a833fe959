//! Parent domain record.
//!
//! # Invariants
//! - `person_id` is unique per parent record.
//! - Links to students live in the `parent_student` association table.

use crate::model::fields::{ActiveState, ContactInfo, PersonName, Timestamps, ValidationError};
use serde::{Deserialize, Serialize};

/// One parent/guardian, linked to students via `parent_student`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent {
    /// Row id; `None` until the record is persisted.
    pub id: Option<i64>,
    /// External person identifier, unique per parent record.
    pub person_id: i64,
    /// Messenger account id, unique when present.
    pub max_user_id: Option<String>,
    pub name: PersonName,
    pub contact: ContactInfo,
    pub state: ActiveState,
    pub timestamps: Timestamps,
}

impl Parent {
    /// Creates an unsaved parent record for the given external person.
    pub fn new(person_id: i64) -> Self {
        Self {
            person_id,
            ..Self::default()
        }
    }

    /// Composed name, stored display name, or `"ID:{person_id}"` fallback.
    pub fn full_name(&self) -> String {
        self.name
            .composed()
            .or_else(|| self.name.display_name.clone())
            .unwrap_or_else(|| format!("ID:{}", self.person_id))
    }

    /// Replaces the phone value, failing fast on wrong length.
    pub fn set_phone(&mut self, phone: Option<String>) -> Result<(), ValidationError> {
        self.contact.set_phone(phone)
    }

    /// Checked by repository write paths before any SQL mutation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.contact.validate()
    }

    /// Marks this parent inactive and stamps the deactivation time.
    pub fn deactivate(&mut self) {
        self.state.deactivate();
    }

    /// Restores this parent and clears the deactivation time.
    pub fn activate(&mut self) {
        self.state.activate();
    }
}

#[cfg(test)]
mod tests {
    use super::Parent;

    #[test]
    fn full_name_fallback_chain() {
        let mut parent = Parent::new(77);
        assert_eq!(parent.full_name(), "ID:77");

        parent.name.display_name = Some("Ivanova E.".to_string());
        assert_eq!(parent.full_name(), "Ivanova E.");

        parent.name.last_name = Some("Ivanova".to_string());
        parent.name.first_name = Some("Elena".to_string());
        assert_eq!(parent.full_name(), "Ivanova Elena");
    }
}

//! Staff domain record.
//!
//! # Responsibility
//! - Define the staff member record with external-system linkage fields.
//! - Provide soft-delete lifecycle and display-name helpers.
//!
//! # Invariants
//! - `person_id` is unique per staff record (one record per external person).
//! - Non-empty phone values are exactly 11 characters.

use crate::model::fields::{ActiveState, ContactInfo, PersonName, Timestamps, ValidationError};
use serde::{Deserialize, Serialize};

/// One staff member as seen by external rosters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    /// Row id; `None` until the record is persisted.
    pub id: Option<i64>,
    /// External person identifier, unique per staff record.
    pub person_id: i64,
    /// Optional account id in the upstream user system.
    pub user_id: Option<i64>,
    /// Messenger account id, unique when present.
    pub max_user_id: Option<String>,
    /// Messenger deep-link path, unique when present.
    pub max_link_path: Option<String>,
    pub name: PersonName,
    pub contact: ContactInfo,
    /// Free-text role label, serialized as `type` to match the schema.
    #[serde(rename = "type")]
    pub staff_type: Option<String>,
    /// Last successful sync from the upstream API, epoch milliseconds.
    pub updated_at_api: Option<i64>,
    pub state: ActiveState,
    pub last_seen_at: Option<i64>,
    pub timestamps: Timestamps,
}

impl Staff {
    /// Creates an unsaved staff record for the given external person.
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

    /// Marks this staff member inactive and stamps the deactivation time.
    pub fn deactivate(&mut self) {
        self.state.deactivate();
    }

    /// Restores this staff member and clears the deactivation time.
    pub fn activate(&mut self) {
        self.state.activate();
    }
}

#[cfg(test)]
mod tests {
    use super::Staff;
    use crate::model::fields::ValidationError;

    #[test]
    fn full_name_falls_back_to_person_id() {
        let staff = Staff::new(4211);
        assert_eq!(staff.full_name(), "ID:4211");
    }

    #[test]
    fn full_name_prefers_composed_over_display_name() {
        let mut staff = Staff::new(1);
        staff.name.display_name = Some("Head of maths".to_string());
        assert_eq!(staff.full_name(), "Head of maths");

        staff.name.last_name = Some("Sidorova".to_string());
        staff.name.first_name = Some("Anna".to_string());
        staff.name.middle_name = Some("Pavlovna".to_string());
        assert_eq!(staff.full_name(), "Sidorova Anna Pavlovna");
    }

    #[test]
    fn set_phone_rejects_wrong_length() {
        let mut staff = Staff::new(1);
        let err = staff.set_phone(Some("123".to_string())).unwrap_err();
        assert_eq!(err, ValidationError::PhoneLength { length: 3 });
        assert_eq!(staff.contact.phone, None);

        staff.set_phone(Some("79001234567".to_string())).unwrap();
        assert!(staff.validate().is_ok());
    }
}

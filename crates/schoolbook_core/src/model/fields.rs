//! Shared field bundles embedded into every person-like record.
//!
//! # Responsibility
//! - Define the personal-name, contact, soft-delete and audit-timestamp
//!   value structs shared by `Staff`, `Student` and `Parent`.
//! - Own phone validation so every entity enforces the same rule.
//!
//! # Invariants
//! - A non-empty phone value is exactly [`PHONE_LENGTH`] characters.
//! - `is_active == false` implies `deactivated_at` is set; reactivation
//!   clears it.
//! - Timestamps are Unix epoch milliseconds, UTC, no timezone attached.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Required length of a non-empty phone value.
pub const PHONE_LENGTH: usize = 11;

/// Validation failure raised at the point of mutation, before any SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Phone value is non-empty but not exactly [`PHONE_LENGTH`] characters.
    PhoneLength { length: usize },
    /// A required name field is empty or whitespace-only.
    EmptyName { field: &'static str },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PhoneLength { length } => {
                write!(f, "phone must be {PHONE_LENGTH} digits, got {length}")
            }
            Self::EmptyName { field } => write!(f, "required name field `{field}` is empty"),
        }
    }
}

impl Error for ValidationError {}

/// Current UTC time as epoch milliseconds.
///
/// Stored without timezone for uniformity across all tables.
pub fn epoch_ms_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

/// Validates one phone value against the shared length rule.
///
/// Absent and empty values are allowed; anything else must be exactly
/// [`PHONE_LENGTH`] characters.
pub fn validate_phone(phone: Option<&str>) -> Result<(), ValidationError> {
    match phone {
        None => Ok(()),
        Some(value) if value.is_empty() => Ok(()),
        Some(value) if value.len() == PHONE_LENGTH => Ok(()),
        Some(value) => Err(ValidationError::PhoneLength {
            length: value.len(),
        }),
    }
}

/// Personal-name fields shared by staff and parent records.
///
/// `display_name` is a stored fallback used when the structured
/// last/first pair is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub display_name: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
}

impl PersonName {
    /// Composes `"{last} {first} {middle}"` (trimmed) when both last and
    /// first names are present; `None` otherwise.
    pub fn composed(&self) -> Option<String> {
        match (self.last_name.as_deref(), self.first_name.as_deref()) {
            (Some(last), Some(first)) => Some(
                format!("{last} {first} {}", self.middle_name.as_deref().unwrap_or(""))
                    .trim()
                    .to_string(),
            ),
            _ => None,
        }
    }
}

/// Contact fields shared by every person-like record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactInfo {
    /// Replaces the phone value after validating the shared length rule.
    ///
    /// Fails fast with [`ValidationError::PhoneLength`] and leaves the
    /// current value untouched on rejection.
    pub fn set_phone(&mut self, phone: Option<String>) -> Result<(), ValidationError> {
        validate_phone(phone.as_deref())?;
        self.phone = phone;
        Ok(())
    }

    /// Re-checks stored contact fields; used by repository write paths.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_phone(self.phone.as_deref())
    }
}

/// Soft-delete state shared by staff, student and parent records.
///
/// Records are never physically removed through this path; deactivation
/// flips the flag and stamps the time instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveState {
    pub is_active: bool,
    /// Epoch milliseconds of the most recent deactivation.
    pub deactivated_at: Option<i64>,
}

impl Default for ActiveState {
    fn default() -> Self {
        Self {
            is_active: true,
            deactivated_at: None,
        }
    }
}

impl ActiveState {
    /// Marks the record inactive and stamps the deactivation time.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.deactivated_at = Some(epoch_ms_now());
    }

    /// Restores the record and clears the deactivation time.
    pub fn activate(&mut self) {
        self.is_active = true;
        self.deactivated_at = None;
    }
}

/// Audit timestamps, populated from storage on read.
///
/// Inserts rely on schema defaults; every repository mutation advances
/// `updated_at` in SQL. `created_at` is immutable post-insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: i64,
    pub updated_at: i64,
}

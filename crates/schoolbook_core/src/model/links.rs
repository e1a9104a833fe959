//! Association link records for many-to-many relationships.
//!
//! # Responsibility
//! - Represent `class_staff` and `parent_student` rows with their
//!   auxiliary metadata.
//!
//! # Invariants
//! - `(class_unit_id, staff_id)` and `(parent_id, student_id)` pairs are
//!   unique; the second insert of a pair fails with a constraint error.
//! - Link metadata can change without touching the linked entities.

use serde::{Deserialize, Serialize};

/// One `class_staff` row: a staff member assigned to a class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStaffLink {
    /// Row id; `None` until the record is persisted.
    pub id: Option<i64>,
    pub class_unit_id: i64,
    pub staff_id: i64,
    /// Leadership flag; the model does not enforce at most one leader
    /// per class.
    pub is_leader: bool,
    /// Taught subject label, free text.
    pub subject: Option<String>,
    pub created_at: i64,
}

/// One `parent_student` row: a parent linked to a student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentStudentLink {
    /// Row id; `None` until the record is persisted.
    pub id: Option<i64>,
    pub parent_id: i64,
    pub student_id: i64,
    /// Kinship label, e.g. `"mother"`; free text.
    pub relationship_type: Option<String>,
    pub created_at: i64,
}

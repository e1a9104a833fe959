//! Domain model for the school roster.
//!
//! # Responsibility
//! - Define entity records (staff, classes, students, parents) and the
//!   association links between them.
//! - Keep cross-cutting field bundles (names, contact, soft-delete state,
//!   audit timestamps) in one place.
//!
//! # Invariants
//! - Person-like records are never hard-deleted; removal is a soft-delete
//!   state change. The only hard-delete path is class-owned cascade.

pub mod class_unit;
pub mod fields;
pub mod links;
pub mod parent;
pub mod staff;
pub mod student;

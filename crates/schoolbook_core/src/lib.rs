//! Core domain logic for the SchoolBook roster.
//! This crate is the single source of truth for roster invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::class_unit::ClassUnit;
pub use model::fields::{
    epoch_ms_now, validate_phone, ActiveState, ContactInfo, PersonName, Timestamps,
    ValidationError, PHONE_LENGTH,
};
pub use model::links::{ClassStaffLink, ParentStudentLink};
pub use model::parent::Parent;
pub use model::staff::Staff;
pub use model::student::Student;
pub use repo::class_repo::{ClassListQuery, ClassRepository, SqliteClassRepository};
pub use repo::parent_repo::{ParentListQuery, ParentRepository, SqliteParentRepository};
pub use repo::staff_repo::{SqliteStaffRepository, StaffListQuery, StaffRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentListQuery, StudentRepository};
pub use repo::{RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

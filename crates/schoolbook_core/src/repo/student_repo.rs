//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and soft-delete APIs over the `students` table.
//! - Manage class enrollment and resolve active parents per student.
//!
//! # Invariants
//! - Write paths must call `Student::validate()` before SQL mutations.
//! - `set_class(None)` clears enrollment without deleting the student;
//!   the student row only disappears when its class is hard-deleted.

use crate::model::fields::{ActiveState, ContactInfo, Timestamps};
use crate::model::parent::Parent;
use crate::model::student::Student;
use crate::repo::parent_repo::parse_parent_row;
use crate::repo::staff_repo::push_pagination;
use crate::repo::{bool_to_int, ensure_connection_ready, int_to_bool, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    person_id,
    user_name,
    max_user_id,
    last_name,
    first_name,
    middle_name,
    email,
    phone,
    is_active,
    deactivated_at,
    class_unit_id,
    created_at,
    updated_at
FROM students";

/// Query options for listing students.
#[derive(Debug, Clone, Default)]
pub struct StudentListQuery {
    /// Optional class membership filter.
    pub class_unit_id: Option<i64>,
    /// When set, only `is_active = 1` rows are returned.
    pub active_only: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for student records.
pub trait StudentRepository {
    /// Inserts one student and returns its generated row id.
    fn create_student(&self, student: &Student) -> RepoResult<i64>;
    /// Updates every mutable field of a persisted student.
    fn update_student(&self, student: &Student) -> RepoResult<()>;
    /// Gets one student by row id with optional inactive visibility.
    fn get_student(&self, id: i64, include_inactive: bool) -> RepoResult<Option<Student>>;
    /// Gets one student by external person id, any active state.
    fn get_student_by_person(&self, person_id: i64) -> RepoResult<Option<Student>>;
    /// Lists students using filter and pagination options.
    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>>;
    /// Soft-deletes one student, stamping the deactivation time.
    fn deactivate_student(&self, id: i64) -> RepoResult<()>;
    /// Restores one student, clearing the deactivation time.
    fn activate_student(&self, id: i64) -> RepoResult<()>;
    /// Moves the student into a class, or clears enrollment with `None`.
    fn set_class(&self, student_id: i64, class_unit_id: Option<i64>) -> RepoResult<()>;
    /// Lists parents linked to a student, optionally active-only.
    fn parents_for_student(&self, student_id: i64, active_only: bool)
        -> RepoResult<Vec<Parent>>;
    /// Counts the student's `is_active = 1` parents.
    fn active_parent_count(&self, student_id: i64) -> RepoResult<i64>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "students")?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<i64> {
        student.validate()?;

        self.conn.execute(
            "INSERT INTO students (
                person_id,
                user_name,
                max_user_id,
                last_name,
                first_name,
                middle_name,
                email,
                phone,
                is_active,
                deactivated_at,
                class_unit_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                student.person_id,
                student.user_name.as_deref(),
                student.max_user_id.as_deref(),
                student.last_name.as_str(),
                student.first_name.as_str(),
                student.middle_name.as_deref(),
                student.contact.email.as_deref(),
                student.contact.phone.as_deref(),
                bool_to_int(student.state.is_active),
                student.state.deactivated_at,
                student.class_unit_id,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_student(&self, student: &Student) -> RepoResult<()> {
        student.validate()?;
        let id = student
            .id
            .ok_or_else(|| RepoError::InvalidData("student record has no row id".to_string()))?;

        let changed = self.conn.execute(
            "UPDATE students
             SET
                person_id = ?1,
                user_name = ?2,
                max_user_id = ?3,
                last_name = ?4,
                first_name = ?5,
                middle_name = ?6,
                email = ?7,
                phone = ?8,
                is_active = ?9,
                deactivated_at = ?10,
                class_unit_id = ?11,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?12;",
            params![
                student.person_id,
                student.user_name.as_deref(),
                student.max_user_id.as_deref(),
                student.last_name.as_str(),
                student.first_name.as_str(),
                student.middle_name.as_deref(),
                student.contact.email.as_deref(),
                student.contact.phone.as_deref(),
                bool_to_int(student.state.is_active),
                student.state.deactivated_at,
                student.class_unit_id,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "student",
                id,
            });
        }

        Ok(())
    }

    fn get_student(&self, id: i64, include_inactive: bool) -> RepoResult<Option<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR is_active = 1);"
        ))?;

        let mut rows = stmt.query(params![id, bool_to_int(include_inactive)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn get_student_by_person(&self, person_id: i64) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE person_id = ?1;"))?;

        let mut rows = stmt.query([person_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if query.active_only {
            sql.push_str(" AND is_active = 1");
        }

        if let Some(class_unit_id) = query.class_unit_id {
            sql.push_str(" AND class_unit_id = ?");
            bind_values.push(Value::Integer(class_unit_id));
        }

        sql.push_str(" ORDER BY last_name ASC, first_name ASC, id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn deactivate_student(&self, id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students
             SET
                is_active = 0,
                deactivated_at = (strftime('%s', 'now') * 1000),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "student",
                id,
            });
        }

        Ok(())
    }

    fn activate_student(&self, id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students
             SET
                is_active = 1,
                deactivated_at = NULL,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "student",
                id,
            });
        }

        Ok(())
    }

    fn set_class(&self, student_id: i64, class_unit_id: Option<i64>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students
             SET
                class_unit_id = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![student_id, class_unit_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "student",
                id: student_id,
            });
        }

        Ok(())
    }

    fn parents_for_student(
        &self,
        student_id: i64,
        active_only: bool,
    ) -> RepoResult<Vec<Parent>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.*
             FROM parents p
             INNER JOIN parent_student ps ON ps.parent_id = p.id
             WHERE ps.student_id = ?1
               AND (?2 = 0 OR p.is_active = 1)
             ORDER BY p.last_name ASC, p.first_name ASC, p.id ASC;",
        )?;

        let mut rows = stmt.query(params![student_id, bool_to_int(active_only)])?;
        let mut parents = Vec::new();
        while let Some(row) = rows.next()? {
            parents.push(parse_parent_row(row)?);
        }

        Ok(parents)
    }

    fn active_parent_count(&self, student_id: i64) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*)
             FROM parents p
             INNER JOIN parent_student ps ON ps.parent_id = p.id
             WHERE ps.student_id = ?1 AND p.is_active = 1;",
            [student_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}

pub(crate) fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    Ok(Student {
        id: Some(row.get("id")?),
        person_id: row.get("person_id")?,
        user_name: row.get("user_name")?,
        max_user_id: row.get("max_user_id")?,
        last_name: row.get("last_name")?,
        first_name: row.get("first_name")?,
        middle_name: row.get("middle_name")?,
        contact: ContactInfo {
            email: row.get("email")?,
            phone: row.get("phone")?,
        },
        state: ActiveState {
            is_active: int_to_bool(row.get("is_active")?, "students.is_active")?,
            deactivated_at: row.get("deactivated_at")?,
        },
        class_unit_id: row.get("class_unit_id")?,
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        },
    })
}

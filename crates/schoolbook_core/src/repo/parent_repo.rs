//! Parent repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and soft-delete APIs over the `parents` table.
//! - Manage the `parent_student` association and resolve active children.
//!
//! # Invariants
//! - Write paths must call `Parent::validate()` before SQL mutations.
//! - `(parent_id, student_id)` pairs are unique; duplicate links fail
//!   with `RepoError::Constraint`.

use crate::model::fields::{ActiveState, ContactInfo, PersonName, Timestamps};
use crate::model::links::ParentStudentLink;
use crate::model::parent::Parent;
use crate::model::student::Student;
use crate::repo::staff_repo::push_pagination;
use crate::repo::student_repo::parse_student_row;
use crate::repo::{bool_to_int, ensure_connection_ready, int_to_bool, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PARENT_SELECT_SQL: &str = "SELECT
    id,
    person_id,
    max_user_id,
    name,
    last_name,
    first_name,
    middle_name,
    email,
    phone,
    is_active,
    deactivated_at,
    created_at,
    updated_at
FROM parents";

/// Query options for listing parents.
#[derive(Debug, Clone, Default)]
pub struct ParentListQuery {
    /// When set, only `is_active = 1` rows are returned.
    pub active_only: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for parent records and student links.
pub trait ParentRepository {
    /// Inserts one parent and returns its generated row id.
    fn create_parent(&self, parent: &Parent) -> RepoResult<i64>;
    /// Updates every mutable field of a persisted parent.
    fn update_parent(&self, parent: &Parent) -> RepoResult<()>;
    /// Gets one parent by row id with optional inactive visibility.
    fn get_parent(&self, id: i64, include_inactive: bool) -> RepoResult<Option<Parent>>;
    /// Gets one parent by external person id, any active state.
    fn get_parent_by_person(&self, person_id: i64) -> RepoResult<Option<Parent>>;
    /// Lists parents using filter and pagination options.
    fn list_parents(&self, query: &ParentListQuery) -> RepoResult<Vec<Parent>>;
    /// Soft-deletes one parent, stamping the deactivation time.
    fn deactivate_parent(&self, id: i64) -> RepoResult<()>;
    /// Restores one parent, clearing the deactivation time.
    fn activate_parent(&self, id: i64) -> RepoResult<()>;
    /// Links one parent to a student with an optional kinship label.
    fn link_student(
        &self,
        parent_id: i64,
        student_id: i64,
        relationship_type: Option<&str>,
    ) -> RepoResult<i64>;
    /// Updates link metadata without touching the linked entities.
    fn update_link(
        &self,
        parent_id: i64,
        student_id: i64,
        relationship_type: Option<&str>,
    ) -> RepoResult<()>;
    /// Removes one parent-student link.
    fn unlink_student(&self, parent_id: i64, student_id: i64) -> RepoResult<()>;
    /// Lists raw link rows for a parent.
    fn links_for_parent(&self, parent_id: i64) -> RepoResult<Vec<ParentStudentLink>>;
    /// Lists students linked to a parent, optionally active-only.
    fn children_for_parent(&self, parent_id: i64, active_only: bool)
        -> RepoResult<Vec<Student>>;
    /// Counts the parent's `is_active = 1` children.
    fn active_child_count(&self, parent_id: i64) -> RepoResult<i64>;
}

/// SQLite-backed parent repository.
pub struct SqliteParentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "parents")?;
        Ok(Self { conn })
    }
}

impl ParentRepository for SqliteParentRepository<'_> {
    fn create_parent(&self, parent: &Parent) -> RepoResult<i64> {
        parent.validate()?;

        self.conn.execute(
            "INSERT INTO parents (
                person_id,
                max_user_id,
                name,
                last_name,
                first_name,
                middle_name,
                email,
                phone,
                is_active,
                deactivated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                parent.person_id,
                parent.max_user_id.as_deref(),
                parent.name.display_name.as_deref(),
                parent.name.last_name.as_deref(),
                parent.name.first_name.as_deref(),
                parent.name.middle_name.as_deref(),
                parent.contact.email.as_deref(),
                parent.contact.phone.as_deref(),
                bool_to_int(parent.state.is_active),
                parent.state.deactivated_at,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_parent(&self, parent: &Parent) -> RepoResult<()> {
        parent.validate()?;
        let id = parent
            .id
            .ok_or_else(|| RepoError::InvalidData("parent record has no row id".to_string()))?;

        let changed = self.conn.execute(
            "UPDATE parents
             SET
                person_id = ?1,
                max_user_id = ?2,
                name = ?3,
                last_name = ?4,
                first_name = ?5,
                middle_name = ?6,
                email = ?7,
                phone = ?8,
                is_active = ?9,
                deactivated_at = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?11;",
            params![
                parent.person_id,
                parent.max_user_id.as_deref(),
                parent.name.display_name.as_deref(),
                parent.name.last_name.as_deref(),
                parent.name.first_name.as_deref(),
                parent.name.middle_name.as_deref(),
                parent.contact.email.as_deref(),
                parent.contact.phone.as_deref(),
                bool_to_int(parent.state.is_active),
                parent.state.deactivated_at,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "parent",
                id,
            });
        }

        Ok(())
    }

    fn get_parent(&self, id: i64, include_inactive: bool) -> RepoResult<Option<Parent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PARENT_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR is_active = 1);"
        ))?;

        let mut rows = stmt.query(params![id, bool_to_int(include_inactive)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_parent_row(row)?));
        }

        Ok(None)
    }

    fn get_parent_by_person(&self, person_id: i64) -> RepoResult<Option<Parent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARENT_SELECT_SQL} WHERE person_id = ?1;"))?;

        let mut rows = stmt.query([person_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_parent_row(row)?));
        }

        Ok(None)
    }

    fn list_parents(&self, query: &ParentListQuery) -> RepoResult<Vec<Parent>> {
        let mut sql = format!("{PARENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if query.active_only {
            sql.push_str(" AND is_active = 1");
        }

        sql.push_str(" ORDER BY last_name ASC, first_name ASC, id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut parents = Vec::new();

        while let Some(row) = rows.next()? {
            parents.push(parse_parent_row(row)?);
        }

        Ok(parents)
    }

    fn deactivate_parent(&self, id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parents
             SET
                is_active = 0,
                deactivated_at = (strftime('%s', 'now') * 1000),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "parent",
                id,
            });
        }

        Ok(())
    }

    fn activate_parent(&self, id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parents
             SET
                is_active = 1,
                deactivated_at = NULL,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "parent",
                id,
            });
        }

        Ok(())
    }

    fn link_student(
        &self,
        parent_id: i64,
        student_id: i64,
        relationship_type: Option<&str>,
    ) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO parent_student (parent_id, student_id, relationship_type)
             VALUES (?1, ?2, ?3);",
            params![parent_id, student_id, relationship_type],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_link(
        &self,
        parent_id: i64,
        student_id: i64,
        relationship_type: Option<&str>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parent_student
             SET relationship_type = ?3
             WHERE parent_id = ?1 AND student_id = ?2;",
            params![parent_id, student_id, relationship_type],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "parent_student",
                id: parent_id,
            });
        }

        Ok(())
    }

    fn unlink_student(&self, parent_id: i64, student_id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM parent_student WHERE parent_id = ?1 AND student_id = ?2;",
            params![parent_id, student_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "parent_student",
                id: parent_id,
            });
        }

        Ok(())
    }

    fn links_for_parent(&self, parent_id: i64) -> RepoResult<Vec<ParentStudentLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, parent_id, student_id, relationship_type, created_at
             FROM parent_student
             WHERE parent_id = ?1
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query([parent_id])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(parse_parent_student_row(row)?);
        }

        Ok(links)
    }

    fn children_for_parent(
        &self,
        parent_id: i64,
        active_only: bool,
    ) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT st.*
             FROM students st
             INNER JOIN parent_student ps ON ps.student_id = st.id
             WHERE ps.parent_id = ?1
               AND (?2 = 0 OR st.is_active = 1)
             ORDER BY st.last_name ASC, st.first_name ASC, st.id ASC;",
        )?;

        let mut rows = stmt.query(params![parent_id, bool_to_int(active_only)])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn active_child_count(&self, parent_id: i64) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*)
             FROM students st
             INNER JOIN parent_student ps ON ps.student_id = st.id
             WHERE ps.parent_id = ?1 AND st.is_active = 1;",
            [parent_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}

pub(crate) fn parse_parent_row(row: &Row<'_>) -> RepoResult<Parent> {
    Ok(Parent {
        id: Some(row.get("id")?),
        person_id: row.get("person_id")?,
        max_user_id: row.get("max_user_id")?,
        name: PersonName {
            display_name: row.get("name")?,
            last_name: row.get("last_name")?,
            first_name: row.get("first_name")?,
            middle_name: row.get("middle_name")?,
        },
        contact: ContactInfo {
            email: row.get("email")?,
            phone: row.get("phone")?,
        },
        state: ActiveState {
            is_active: int_to_bool(row.get("is_active")?, "parents.is_active")?,
            deactivated_at: row.get("deactivated_at")?,
        },
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        },
    })
}

fn parse_parent_student_row(row: &Row<'_>) -> RepoResult<ParentStudentLink> {
    Ok(ParentStudentLink {
        id: Some(row.get("id")?),
        parent_id: row.get("parent_id")?,
        student_id: row.get("student_id")?,
        relationship_type: row.get("relationship_type")?,
        created_at: row.get("created_at")?,
    })
}

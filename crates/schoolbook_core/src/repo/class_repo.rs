//! Class repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `class_units` and the `class_staff` association.
//! - Resolve derived roster facts (active student count, class teacher)
//!   as explicit queries.
//!
//! # Invariants
//! - `(class_unit_id, staff_id)` pairs are unique; duplicate assignment
//!   fails with `RepoError::Constraint`.
//! - `delete_class` is the only hard-delete path in the crate; it
//!   cascades to the class's students and `class_staff` rows.

use crate::model::class_unit::ClassUnit;
use crate::model::fields::Timestamps;
use crate::model::links::ClassStaffLink;
use crate::model::staff::Staff;
use crate::repo::staff_repo::{parse_staff_row, push_pagination};
use crate::repo::{bool_to_int, ensure_connection_ready, int_to_bool, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const CLASS_SELECT_SQL: &str = "SELECT
    id,
    school_id,
    class_level_id,
    name,
    parallel,
    literal,
    max_user_id,
    max_link,
    created_at,
    updated_at
FROM class_units";

/// Query options for listing classes.
#[derive(Debug, Clone, Default)]
pub struct ClassListQuery {
    /// Optional exact match on the grade parallel.
    pub parallel: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for class units and staff assignments.
pub trait ClassRepository {
    /// Inserts one class and returns its generated row id.
    fn create_class(&self, class: &ClassUnit) -> RepoResult<i64>;
    /// Updates every mutable field of a persisted class.
    fn update_class(&self, class: &ClassUnit) -> RepoResult<()>;
    /// Gets one class by row id.
    fn get_class(&self, id: i64) -> RepoResult<Option<ClassUnit>>;
    /// Lists classes using filter and pagination options.
    fn list_classes(&self, query: &ClassListQuery) -> RepoResult<Vec<ClassUnit>>;
    /// Hard-deletes one class; its students and assignments go with it.
    fn delete_class(&self, id: i64) -> RepoResult<()>;
    /// Links one staff member to a class with assignment metadata.
    fn assign_staff(
        &self,
        class_id: i64,
        staff_id: i64,
        is_leader: bool,
        subject: Option<&str>,
    ) -> RepoResult<i64>;
    /// Updates assignment metadata without touching the linked entities.
    fn update_assignment(
        &self,
        class_id: i64,
        staff_id: i64,
        is_leader: bool,
        subject: Option<&str>,
    ) -> RepoResult<()>;
    /// Removes one staff assignment from a class.
    fn remove_staff(&self, class_id: i64, staff_id: i64) -> RepoResult<()>;
    /// Lists raw assignment rows for a class, leaders first.
    fn assignments_for_class(&self, class_id: i64) -> RepoResult<Vec<ClassStaffLink>>;
    /// Lists staff assigned to a class, optionally active-only.
    fn staff_for_class(&self, class_id: i64, active_only: bool) -> RepoResult<Vec<Staff>>;
    /// Resolves the class teacher: the staff member whose assignment has
    /// the leadership flag set.
    ///
    /// Returns `Ok(None)` when no leader link exists; more than one
    /// leader link is reported as invalid data (the model does not
    /// enforce a single leader, callers must not assume one).
    fn find_class_teacher(&self, class_id: i64) -> RepoResult<Option<Staff>>;
    /// Counts the class's `is_active = 1` students.
    fn active_student_count(&self, class_id: i64) -> RepoResult<i64>;
}

/// SQLite-backed class repository.
pub struct SqliteClassRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClassRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "class_units")?;
        Ok(Self { conn })
    }
}

impl ClassRepository for SqliteClassRepository<'_> {
    fn create_class(&self, class: &ClassUnit) -> RepoResult<i64> {
        class.validate()?;

        self.conn.execute(
            "INSERT INTO class_units (
                school_id,
                class_level_id,
                name,
                parallel,
                literal,
                max_user_id,
                max_link
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                class.school_id,
                class.class_level_id,
                class.name.as_str(),
                class.parallel.as_deref(),
                class.literal.as_deref(),
                class.max_user_id.as_deref(),
                class.max_link.as_deref(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_class(&self, class: &ClassUnit) -> RepoResult<()> {
        class.validate()?;
        let id = class
            .id
            .ok_or_else(|| RepoError::InvalidData("class record has no row id".to_string()))?;

        let changed = self.conn.execute(
            "UPDATE class_units
             SET
                school_id = ?1,
                class_level_id = ?2,
                name = ?3,
                parallel = ?4,
                literal = ?5,
                max_user_id = ?6,
                max_link = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?8;",
            params![
                class.school_id,
                class.class_level_id,
                class.name.as_str(),
                class.parallel.as_deref(),
                class.literal.as_deref(),
                class.max_user_id.as_deref(),
                class.max_link.as_deref(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "class_unit",
                id,
            });
        }

        Ok(())
    }

    fn get_class(&self, id: i64) -> RepoResult<Option<ClassUnit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLASS_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_class_unit_row(row)?));
        }

        Ok(None)
    }

    fn list_classes(&self, query: &ClassListQuery) -> RepoResult<Vec<ClassUnit>> {
        let mut sql = format!("{CLASS_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(parallel) = query.parallel.as_ref() {
            sql.push_str(" AND parallel = ?");
            bind_values.push(Value::Text(parallel.clone()));
        }

        sql.push_str(" ORDER BY name ASC, id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut classes = Vec::new();

        while let Some(row) = rows.next()? {
            classes.push(parse_class_unit_row(row)?);
        }

        Ok(classes)
    }

    fn delete_class(&self, id: i64) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM class_units WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "class_unit",
                id,
            });
        }

        Ok(())
    }

    fn assign_staff(
        &self,
        class_id: i64,
        staff_id: i64,
        is_leader: bool,
        subject: Option<&str>,
    ) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO class_staff (class_unit_id, staff_id, is_leader, subject)
             VALUES (?1, ?2, ?3, ?4);",
            params![class_id, staff_id, bool_to_int(is_leader), subject],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_assignment(
        &self,
        class_id: i64,
        staff_id: i64,
        is_leader: bool,
        subject: Option<&str>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE class_staff
             SET is_leader = ?3, subject = ?4
             WHERE class_unit_id = ?1 AND staff_id = ?2;",
            params![class_id, staff_id, bool_to_int(is_leader), subject],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "class_staff",
                id: class_id,
            });
        }

        Ok(())
    }

    fn remove_staff(&self, class_id: i64, staff_id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM class_staff WHERE class_unit_id = ?1 AND staff_id = ?2;",
            params![class_id, staff_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "class_staff",
                id: class_id,
            });
        }

        Ok(())
    }

    fn assignments_for_class(&self, class_id: i64) -> RepoResult<Vec<ClassStaffLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, class_unit_id, staff_id, is_leader, subject, created_at
             FROM class_staff
             WHERE class_unit_id = ?1
             ORDER BY is_leader DESC, id ASC;",
        )?;

        let mut rows = stmt.query([class_id])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(parse_class_staff_row(row)?);
        }

        Ok(links)
    }

    fn staff_for_class(&self, class_id: i64, active_only: bool) -> RepoResult<Vec<Staff>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.*
             FROM staff s
             INNER JOIN class_staff cs ON cs.staff_id = s.id
             WHERE cs.class_unit_id = ?1
               AND (?2 = 0 OR s.is_active = 1)
             ORDER BY s.last_name ASC, s.first_name ASC, s.id ASC;",
        )?;

        let mut rows = stmt.query(params![class_id, bool_to_int(active_only)])?;
        let mut staff = Vec::new();
        while let Some(row) = rows.next()? {
            staff.push(parse_staff_row(row)?);
        }

        Ok(staff)
    }

    fn find_class_teacher(&self, class_id: i64) -> RepoResult<Option<Staff>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.*
             FROM staff s
             INNER JOIN class_staff cs ON cs.staff_id = s.id
             WHERE cs.class_unit_id = ?1
               AND cs.is_leader = 1
             ORDER BY cs.id ASC
             LIMIT 2;",
        )?;

        let mut rows = stmt.query([class_id])?;
        let first = match rows.next()? {
            Some(row) => parse_staff_row(row)?,
            None => return Ok(None),
        };

        if rows.next()?.is_some() {
            return Err(RepoError::InvalidData(format!(
                "class {class_id} has more than one leadership-flagged assignment"
            )));
        }

        Ok(Some(first))
    }

    fn active_student_count(&self, class_id: i64) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*)
             FROM students
             WHERE class_unit_id = ?1 AND is_active = 1;",
            [class_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}

pub(crate) fn parse_class_unit_row(row: &Row<'_>) -> RepoResult<ClassUnit> {
    Ok(ClassUnit {
        id: Some(row.get("id")?),
        school_id: row.get("school_id")?,
        class_level_id: row.get("class_level_id")?,
        name: row.get("name")?,
        parallel: row.get("parallel")?,
        literal: row.get("literal")?,
        max_user_id: row.get("max_user_id")?,
        max_link: row.get("max_link")?,
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        },
    })
}

fn parse_class_staff_row(row: &Row<'_>) -> RepoResult<ClassStaffLink> {
    Ok(ClassStaffLink {
        id: Some(row.get("id")?),
        class_unit_id: row.get("class_unit_id")?,
        staff_id: row.get("staff_id")?,
        is_leader: int_to_bool(row.get("is_leader")?, "class_staff.is_leader")?,
        subject: row.get("subject")?,
        created_at: row.get("created_at")?,
    })
}

//! Staff repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and soft-delete APIs over the `staff` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Staff::validate()` before SQL mutations.
//! - Every mutation advances `updated_at`; `created_at` is never updated.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::class_unit::ClassUnit;
use crate::model::fields::{ActiveState, ContactInfo, PersonName, Timestamps};
use crate::model::staff::Staff;
use crate::repo::class_repo::parse_class_unit_row;
use crate::repo::{bool_to_int, ensure_connection_ready, int_to_bool, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const STAFF_SELECT_SQL: &str = "SELECT
    id,
    person_id,
    user_id,
    max_user_id,
    max_link_path,
    name,
    last_name,
    first_name,
    middle_name,
    email,
    phone,
    type,
    updated_at_api,
    is_active,
    deactivated_at,
    last_seen_at,
    created_at,
    updated_at
FROM staff";

/// Query options for listing staff.
#[derive(Debug, Clone, Default)]
pub struct StaffListQuery {
    /// Optional exact match on the free-text role label.
    pub staff_type: Option<String>,
    /// When set, only `is_active = 1` rows are returned.
    pub active_only: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for staff records.
pub trait StaffRepository {
    /// Inserts one staff record and returns its generated row id.
    fn create_staff(&self, staff: &Staff) -> RepoResult<i64>;
    /// Updates every mutable field of a persisted staff record.
    fn update_staff(&self, staff: &Staff) -> RepoResult<()>;
    /// Gets one staff record by row id with optional inactive visibility.
    fn get_staff(&self, id: i64, include_inactive: bool) -> RepoResult<Option<Staff>>;
    /// Gets one staff record by external person id, any active state.
    fn get_staff_by_person(&self, person_id: i64) -> RepoResult<Option<Staff>>;
    /// Lists staff using filter and pagination options.
    fn list_staff(&self, query: &StaffListQuery) -> RepoResult<Vec<Staff>>;
    /// Soft-deletes one staff record, stamping the deactivation time.
    fn deactivate_staff(&self, id: i64) -> RepoResult<()>;
    /// Restores one staff record, clearing the deactivation time.
    fn activate_staff(&self, id: i64) -> RepoResult<()>;
    /// Lists classes this staff member is assigned to via `class_staff`.
    fn classes_for_staff(&self, staff_id: i64) -> RepoResult<Vec<ClassUnit>>;
}

/// SQLite-backed staff repository.
pub struct SqliteStaffRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStaffRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "staff")?;
        Ok(Self { conn })
    }
}

impl StaffRepository for SqliteStaffRepository<'_> {
    fn create_staff(&self, staff: &Staff) -> RepoResult<i64> {
        staff.validate()?;

        self.conn.execute(
            "INSERT INTO staff (
                person_id,
                user_id,
                max_user_id,
                max_link_path,
                name,
                last_name,
                first_name,
                middle_name,
                email,
                phone,
                type,
                updated_at_api,
                is_active,
                deactivated_at,
                last_seen_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                staff.person_id,
                staff.user_id,
                staff.max_user_id.as_deref(),
                staff.max_link_path.as_deref(),
                staff.name.display_name.as_deref(),
                staff.name.last_name.as_deref(),
                staff.name.first_name.as_deref(),
                staff.name.middle_name.as_deref(),
                staff.contact.email.as_deref(),
                staff.contact.phone.as_deref(),
                staff.staff_type.as_deref(),
                staff.updated_at_api,
                bool_to_int(staff.state.is_active),
                staff.state.deactivated_at,
                staff.last_seen_at,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_staff(&self, staff: &Staff) -> RepoResult<()> {
        staff.validate()?;
        let id = staff
            .id
            .ok_or_else(|| RepoError::InvalidData("staff record has no row id".to_string()))?;

        let changed = self.conn.execute(
            "UPDATE staff
             SET
                person_id = ?1,
                user_id = ?2,
                max_user_id = ?3,
                max_link_path = ?4,
                name = ?5,
                last_name = ?6,
                first_name = ?7,
                middle_name = ?8,
                email = ?9,
                phone = ?10,
                type = ?11,
                updated_at_api = ?12,
                is_active = ?13,
                deactivated_at = ?14,
                last_seen_at = ?15,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?16;",
            params![
                staff.person_id,
                staff.user_id,
                staff.max_user_id.as_deref(),
                staff.max_link_path.as_deref(),
                staff.name.display_name.as_deref(),
                staff.name.last_name.as_deref(),
                staff.name.first_name.as_deref(),
                staff.name.middle_name.as_deref(),
                staff.contact.email.as_deref(),
                staff.contact.phone.as_deref(),
                staff.staff_type.as_deref(),
                staff.updated_at_api,
                bool_to_int(staff.state.is_active),
                staff.state.deactivated_at,
                staff.last_seen_at,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "staff", id });
        }

        Ok(())
    }

    fn get_staff(&self, id: i64, include_inactive: bool) -> RepoResult<Option<Staff>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STAFF_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR is_active = 1);"
        ))?;

        let mut rows = stmt.query(params![id, bool_to_int(include_inactive)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_staff_row(row)?));
        }

        Ok(None)
    }

    fn get_staff_by_person(&self, person_id: i64) -> RepoResult<Option<Staff>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STAFF_SELECT_SQL} WHERE person_id = ?1;"))?;

        let mut rows = stmt.query([person_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_staff_row(row)?));
        }

        Ok(None)
    }

    fn list_staff(&self, query: &StaffListQuery) -> RepoResult<Vec<Staff>> {
        let mut sql = format!("{STAFF_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if query.active_only {
            sql.push_str(" AND is_active = 1");
        }

        if let Some(staff_type) = query.staff_type.as_ref() {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(staff_type.clone()));
        }

        sql.push_str(" ORDER BY last_name ASC, first_name ASC, id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_staff_row(row)?);
        }

        Ok(records)
    }

    fn deactivate_staff(&self, id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE staff
             SET
                is_active = 0,
                deactivated_at = (strftime('%s', 'now') * 1000),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "staff", id });
        }

        Ok(())
    }

    fn activate_staff(&self, id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE staff
             SET
                is_active = 1,
                deactivated_at = NULL,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "staff", id });
        }

        Ok(())
    }

    fn classes_for_staff(&self, staff_id: i64) -> RepoResult<Vec<ClassUnit>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.*
             FROM class_units c
             INNER JOIN class_staff cs ON cs.class_unit_id = c.id
             WHERE cs.staff_id = ?1
             ORDER BY c.name ASC, c.id ASC;",
        )?;

        let mut rows = stmt.query([staff_id])?;
        let mut classes = Vec::new();
        while let Some(row) = rows.next()? {
            classes.push(parse_class_unit_row(row)?);
        }

        Ok(classes)
    }
}

/// Appends `LIMIT`/`OFFSET` clauses shared by every list query.
pub(crate) fn push_pagination(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    limit: Option<u32>,
    offset: u32,
) {
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(offset)));
        }
    } else if offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(i64::from(offset)));
    }
}

pub(crate) fn parse_staff_row(row: &Row<'_>) -> RepoResult<Staff> {
    Ok(Staff {
        id: Some(row.get("id")?),
        person_id: row.get("person_id")?,
        user_id: row.get("user_id")?,
        max_user_id: row.get("max_user_id")?,
        max_link_path: row.get("max_link_path")?,
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
        staff_type: row.get("type")?,
        updated_at_api: row.get("updated_at_api")?,
        state: ActiveState {
            is_active: int_to_bool(row.get("is_active")?, "staff.is_active")?,
            deactivated_at: row.get("deactivated_at")?,
        },
        last_seen_at: row.get("last_seen_at")?,
        timestamps: Timestamps {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        },
    })
}

use rusqlite::Connection;
use schoolbook_core::db::open_db_in_memory;
use schoolbook_core::{
    RepoError, SqliteStaffRepository, Staff, StaffListQuery, StaffRepository,
};

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let mut staff = Staff::new(1001);
    staff.name.last_name = Some("Sidorova".to_string());
    staff.name.first_name = Some("Anna".to_string());
    staff.contact.email = Some("sidorova@school.test".to_string());
    staff.set_phone(Some("79001234567".to_string())).unwrap();
    staff.staff_type = Some("teacher".to_string());

    let id = repo.create_staff(&staff).unwrap();
    let loaded = repo.get_staff(id, false).unwrap().unwrap();

    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.person_id, 1001);
    assert_eq!(loaded.full_name(), "Sidorova Anna");
    assert_eq!(loaded.contact.phone.as_deref(), Some("79001234567"));
    assert_eq!(loaded.staff_type.as_deref(), Some("teacher"));
    assert!(loaded.state.is_active);
    assert!(loaded.timestamps.created_at > 0);
}

#[test]
fn update_advances_updated_at_and_keeps_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let id = repo.create_staff(&Staff::new(1)).unwrap();
    // Backdate the audit timestamps so the mutation visibly advances them.
    conn.execute("UPDATE staff SET created_at = 1000, updated_at = 1000;", [])
        .unwrap();

    let mut staff = repo.get_staff(id, false).unwrap().unwrap();
    staff.staff_type = Some("principal".to_string());
    repo.update_staff(&staff).unwrap();

    let loaded = repo.get_staff(id, false).unwrap().unwrap();
    assert_eq!(loaded.timestamps.created_at, 1000);
    assert!(loaded.timestamps.updated_at > 1000);
    assert_eq!(loaded.staff_type.as_deref(), Some("principal"));
}

#[test]
fn update_without_row_id_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let err = repo.update_staff(&Staff::new(5)).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let mut staff = Staff::new(5);
    staff.id = Some(404);
    let err = repo.update_staff(&staff).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "staff",
            id: 404
        }
    ));
}

#[test]
fn duplicate_person_id_fails_with_constraint() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    repo.create_staff(&Staff::new(42)).unwrap();
    let err = repo.create_staff(&Staff::new(42)).unwrap_err();
    assert!(matches!(err, RepoError::Constraint(_)));
}

#[test]
fn duplicate_max_user_id_fails_with_constraint() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let mut first = Staff::new(1);
    first.max_user_id = Some("max-abc".to_string());
    repo.create_staff(&first).unwrap();

    let mut second = Staff::new(2);
    second.max_user_id = Some("max-abc".to_string());
    let err = repo.create_staff(&second).unwrap_err();
    assert!(matches!(err, RepoError::Constraint(_)));
}

#[test]
fn invalid_phone_is_rejected_before_sql_and_by_the_schema() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let mut staff = Staff::new(1);
    staff.contact.phone = Some("12345".to_string());
    let err = repo.create_staff(&staff).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    // Schema CHECK backstops callers that bypass model validation.
    let raw = conn.execute(
        "INSERT INTO staff (person_id, phone) VALUES (2, '12345');",
        [],
    );
    assert!(raw.is_err());
}

#[test]
fn empty_phone_is_allowed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let mut staff = Staff::new(1);
    staff.set_phone(Some(String::new())).unwrap();
    let id = repo.create_staff(&staff).unwrap();
    assert!(repo.get_staff(id, false).unwrap().is_some());
}

#[test]
fn deactivate_hides_from_default_get_and_activate_restores() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let id = repo.create_staff(&Staff::new(1)).unwrap();

    repo.deactivate_staff(id).unwrap();
    repo.deactivate_staff(id).unwrap();
    assert!(repo.get_staff(id, false).unwrap().is_none());

    let hidden = repo.get_staff(id, true).unwrap().unwrap();
    assert!(!hidden.state.is_active);
    assert!(hidden.state.deactivated_at.is_some());

    repo.activate_staff(id).unwrap();
    let restored = repo.get_staff(id, false).unwrap().unwrap();
    assert!(restored.state.is_active);
    assert_eq!(restored.state.deactivated_at, None);
}

#[test]
fn list_filters_by_type_and_active_state() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let mut teacher = Staff::new(1);
    teacher.staff_type = Some("teacher".to_string());
    let teacher_id = repo.create_staff(&teacher).unwrap();

    let mut retired = Staff::new(2);
    retired.staff_type = Some("teacher".to_string());
    let retired_id = repo.create_staff(&retired).unwrap();
    repo.deactivate_staff(retired_id).unwrap();

    let mut admin = Staff::new(3);
    admin.staff_type = Some("admin".to_string());
    repo.create_staff(&admin).unwrap();

    let everyone = repo.list_staff(&StaffListQuery::default()).unwrap();
    assert_eq!(everyone.len(), 3);

    let active_teachers = repo
        .list_staff(&StaffListQuery {
            staff_type: Some("teacher".to_string()),
            active_only: true,
            ..StaffListQuery::default()
        })
        .unwrap();
    assert_eq!(active_teachers.len(), 1);
    assert_eq!(active_teachers[0].id, Some(teacher_id));
}

#[test]
fn list_pagination_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    for (person_id, last_name) in [(1, "Alferova"), (2, "Borisov"), (3, "Volkova")] {
        let mut staff = Staff::new(person_id);
        staff.name.last_name = Some(last_name.to_string());
        staff.name.first_name = Some("X".to_string());
        repo.create_staff(&staff).unwrap();
    }

    let page = repo
        .list_staff(&StaffListQuery {
            limit: Some(2),
            offset: 1,
            ..StaffListQuery::default()
        })
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].name.last_name.as_deref(), Some("Borisov"));
    assert_eq!(page[1].name.last_name.as_deref(), Some("Volkova"));
}

#[test]
fn get_by_person_finds_inactive_records_too() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let id = repo.create_staff(&Staff::new(77)).unwrap();
    repo.deactivate_staff(id).unwrap();

    let found = repo.get_staff_by_person(77).unwrap().unwrap();
    assert_eq!(found.id, Some(id));
    assert!(!found.state.is_active);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteStaffRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

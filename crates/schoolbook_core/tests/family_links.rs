use schoolbook_core::db::open_db_in_memory;
use schoolbook_core::{
    Parent, ParentListQuery, ParentRepository, RepoError, SqliteParentRepository,
    SqliteStudentRepository, Student, StudentRepository,
};

#[test]
fn link_students_and_list_children() {
    let conn = open_db_in_memory().unwrap();
    let parents = SqliteParentRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let parent_id = parents.create_parent(&Parent::new(100)).unwrap();
    let first = students
        .create_student(&Student::new(1, "Ivanov", "Petr"))
        .unwrap();
    let second = students
        .create_student(&Student::new(2, "Ivanova", "Olga"))
        .unwrap();

    parents.link_student(parent_id, first, Some("father")).unwrap();
    parents.link_student(parent_id, second, Some("father")).unwrap();

    let children = parents.children_for_parent(parent_id, false).unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(parents.active_child_count(parent_id).unwrap(), 2);

    let links = parents.links_for_parent(parent_id).unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].relationship_type.as_deref(), Some("father"));
    assert!(links[0].created_at > 0);
}

#[test]
fn duplicate_parent_student_pair_fails_with_constraint() {
    let conn = open_db_in_memory().unwrap();
    let parents = SqliteParentRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let parent_id = parents.create_parent(&Parent::new(100)).unwrap();
    let student_id = students
        .create_student(&Student::new(1, "Ivanov", "Petr"))
        .unwrap();

    parents.link_student(parent_id, student_id, Some("mother")).unwrap();
    let err = parents
        .link_student(parent_id, student_id, Some("guardian"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Constraint(_)));
}

#[test]
fn relationship_label_can_change_without_touching_entities() {
    let conn = open_db_in_memory().unwrap();
    let parents = SqliteParentRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let parent_id = parents.create_parent(&Parent::new(100)).unwrap();
    let student_id = students
        .create_student(&Student::new(1, "Ivanov", "Petr"))
        .unwrap();
    parents.link_student(parent_id, student_id, None).unwrap();

    parents
        .update_link(parent_id, student_id, Some("guardian"))
        .unwrap();

    let links = parents.links_for_parent(parent_id).unwrap();
    assert_eq!(links[0].relationship_type.as_deref(), Some("guardian"));

    let student = students.get_student(student_id, false).unwrap().unwrap();
    assert_eq!(student.full_name(), "Ivanov Petr");
}

#[test]
fn active_only_filters_deactivated_children_and_parents() {
    let conn = open_db_in_memory().unwrap();
    let parents = SqliteParentRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let parent_id = parents.create_parent(&Parent::new(100)).unwrap();
    let other_parent = parents.create_parent(&Parent::new(101)).unwrap();
    let student_id = students
        .create_student(&Student::new(1, "Ivanov", "Petr"))
        .unwrap();
    let left_id = students
        .create_student(&Student::new(2, "Ivanova", "Olga"))
        .unwrap();

    parents.link_student(parent_id, student_id, Some("mother")).unwrap();
    parents.link_student(parent_id, left_id, Some("mother")).unwrap();
    parents.link_student(other_parent, student_id, Some("father")).unwrap();

    students.deactivate_student(left_id).unwrap();
    parents.deactivate_parent(other_parent).unwrap();

    let active_children = parents.children_for_parent(parent_id, true).unwrap();
    assert_eq!(active_children.len(), 1);
    assert_eq!(active_children[0].id, Some(student_id));
    assert_eq!(parents.active_child_count(parent_id).unwrap(), 1);

    let active_parents = students.parents_for_student(student_id, true).unwrap();
    assert_eq!(active_parents.len(), 1);
    assert_eq!(active_parents[0].id, Some(parent_id));
    assert_eq!(students.active_parent_count(student_id).unwrap(), 1);

    // Without the flag both sides of each link are still visible.
    assert_eq!(parents.children_for_parent(parent_id, false).unwrap().len(), 2);
    assert_eq!(
        students.parents_for_student(student_id, false).unwrap().len(),
        2
    );
}

#[test]
fn unlink_removes_only_the_association_row() {
    let conn = open_db_in_memory().unwrap();
    let parents = SqliteParentRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let parent_id = parents.create_parent(&Parent::new(100)).unwrap();
    let student_id = students
        .create_student(&Student::new(1, "Ivanov", "Petr"))
        .unwrap();
    parents.link_student(parent_id, student_id, None).unwrap();

    parents.unlink_student(parent_id, student_id).unwrap();
    assert!(parents.links_for_parent(parent_id).unwrap().is_empty());
    assert!(parents.get_parent(parent_id, false).unwrap().is_some());
    assert!(students.get_student(student_id, false).unwrap().is_some());

    let err = parents.unlink_student(parent_id, student_id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn parent_soft_delete_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let parents = SqliteParentRepository::try_new(&conn).unwrap();

    let id = parents.create_parent(&Parent::new(100)).unwrap();
    parents.deactivate_parent(id).unwrap();
    assert!(parents.get_parent(id, false).unwrap().is_none());

    parents.activate_parent(id).unwrap();
    let restored = parents.get_parent(id, false).unwrap().unwrap();
    assert!(restored.state.is_active);
    assert_eq!(restored.state.deactivated_at, None);
}

#[test]
fn list_parents_with_active_only_flag() {
    let conn = open_db_in_memory().unwrap();
    let parents = SqliteParentRepository::try_new(&conn).unwrap();

    let kept = parents.create_parent(&Parent::new(1)).unwrap();
    let removed = parents.create_parent(&Parent::new(2)).unwrap();
    parents.deactivate_parent(removed).unwrap();

    assert_eq!(parents.list_parents(&ParentListQuery::default()).unwrap().len(), 2);

    let active = parents
        .list_parents(&ParentListQuery {
            active_only: true,
            ..ParentListQuery::default()
        })
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, Some(kept));
}

#[test]
fn student_class_link_can_be_cleared_independently() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    conn.execute("INSERT INTO class_units (name) VALUES ('5A');", [])
        .unwrap();
    let class_id = conn.last_insert_rowid();

    let mut student = Student::new(1, "Ivanov", "Petr");
    student.class_unit_id = Some(class_id);
    let student_id = students.create_student(&student).unwrap();

    students.set_class(student_id, None).unwrap();
    let loaded = students.get_student(student_id, false).unwrap().unwrap();
    assert_eq!(loaded.class_unit_id, None);

    students.set_class(student_id, Some(class_id)).unwrap();
    let loaded = students.get_student(student_id, false).unwrap().unwrap();
    assert_eq!(loaded.class_unit_id, Some(class_id));
}

#[test]
fn student_records_serialize_for_external_consumers() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = students
        .create_student(&Student::new(1, "Ivanov", "Petr"))
        .unwrap();
    let student = students.get_student(id, false).unwrap().unwrap();

    let json = serde_json::to_value(&student).unwrap();
    assert_eq!(json["last_name"], "Ivanov");
    assert_eq!(json["state"]["is_active"], true);
}

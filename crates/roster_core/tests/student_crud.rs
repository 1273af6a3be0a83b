use chrono::NaiveDate;
use roster_core::db::migrations::latest_version;
use roster_core::db::open_db_in_memory;
use roster_core::{
    NewStudent, RepoError, SqliteStudentRepository, Student, StudentListQuery, StudentRepository,
    StudentService,
};
use rusqlite::Connection;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn draft(last_name: &str, first_name: &str, birth: NaiveDate) -> NewStudent {
    NewStudent::new(last_name, first_name, birth)
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = repo
        .create_student(&draft("Diallo", "Aminata", date(2001, 5, 14)))
        .unwrap();
    assert!(id >= 1);

    let loaded = repo.get_student(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.last_name, "Diallo");
    assert_eq!(loaded.first_name, "Aminata");
    assert_eq!(loaded.birth_date, date(2001, 5, 14));
}

#[test]
fn ids_are_assigned_sequentially_and_uniquely() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let first = repo
        .create_student(&draft("Haddad", "Karim", date(1998, 12, 31)))
        .unwrap();
    let second = repo
        .create_student(&draft("Lefevre", "Chloe", date(2003, 2, 1)))
        .unwrap();

    assert_ne!(first, second);
    assert!(second > first);
}

#[test]
fn get_missing_student_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    assert!(repo.get_student(12345).unwrap().is_none());
}

#[test]
fn update_existing_student() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = repo
        .create_student(&draft("Diallo", "Aminata", date(2001, 5, 14)))
        .unwrap();

    let updated = Student::with_id(id, "Diallo-Keita", "Aminata", date(2001, 5, 15)).unwrap();
    repo.update_student(&updated).unwrap();

    let loaded = repo.get_student(id).unwrap().unwrap();
    assert_eq!(loaded.last_name, "Diallo-Keita");
    assert_eq!(loaded.birth_date, date(2001, 5, 15));
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let ghost = Student::with_id(999, "Nobody", "Here", date(2000, 1, 1)).unwrap();
    let err = repo.update_student(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(999)));
}

#[test]
fn delete_removes_row_and_second_delete_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = repo
        .create_student(&draft("Haddad", "Karim", date(1998, 12, 31)))
        .unwrap();

    repo.delete_student(id).unwrap();
    assert!(repo.get_student(id).unwrap().is_none());

    let err = repo.delete_student(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = repo
        .create_student(&draft("  ", "Aminata", date(2001, 5, 14)))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.count_students().unwrap(), 0);

    let id = repo
        .create_student(&draft("Diallo", "Aminata", date(2001, 5, 14)))
        .unwrap();
    let mut loaded = repo.get_student(id).unwrap().unwrap();
    loaded.first_name = String::new();
    let err = repo.update_student(&loaded).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn list_orders_by_name_and_filters_by_substring() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    repo.create_student(&draft("Lefevre", "Chloe", date(2003, 2, 1)))
        .unwrap();
    repo.create_student(&draft("Diallo", "Aminata", date(2001, 5, 14)))
        .unwrap();
    repo.create_student(&draft("Haddad", "Karim", date(1998, 12, 31)))
        .unwrap();

    let all = repo.list_students(&StudentListQuery::default()).unwrap();
    let names: Vec<_> = all.iter().map(|s| s.last_name.as_str()).collect();
    assert_eq!(names, vec!["Diallo", "Haddad", "Lefevre"]);

    let query = StudentListQuery {
        name_contains: Some("had".to_string()),
        ..StudentListQuery::default()
    };
    let matched = repo.list_students(&query).unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].last_name, "Haddad");
}

#[test]
fn list_filters_by_birth_year() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    repo.create_student(&draft("Diallo", "Aminata", date(2001, 5, 14)))
        .unwrap();
    repo.create_student(&draft("Moreau", "Lucas", date(2001, 11, 3)))
        .unwrap();
    repo.create_student(&draft("Haddad", "Karim", date(1998, 12, 31)))
        .unwrap();

    let query = StudentListQuery {
        birth_year: Some(2001),
        ..StudentListQuery::default()
    };
    let born_2001 = repo.list_students(&query).unwrap();
    assert_eq!(born_2001.len(), 2);
    assert!(born_2001.iter().all(|s| s.birth_year() == 2001));
}

#[test]
fn list_pagination_with_limit_and_offset_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    repo.create_student(&draft("Costa", "Ana", date(2000, 1, 1)))
        .unwrap();
    repo.create_student(&draft("Abel", "Noa", date(2000, 1, 1)))
        .unwrap();
    repo.create_student(&draft("Baran", "Emre", date(2000, 1, 1)))
        .unwrap();

    let query = StudentListQuery {
        limit: Some(2),
        offset: 1,
        ..StudentListQuery::default()
    };
    let page = repo.list_students(&query).unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].last_name, "Baran");
    assert_eq!(page[1].last_name, "Costa");
}

#[test]
fn list_pagination_with_offset_only_path_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    repo.create_student(&draft("Abel", "Noa", date(2000, 1, 1)))
        .unwrap();
    repo.create_student(&draft("Baran", "Emre", date(2000, 1, 1)))
        .unwrap();
    repo.create_student(&draft("Costa", "Ana", date(2000, 1, 1)))
        .unwrap();

    let query = StudentListQuery {
        offset: 1,
        ..StudentListQuery::default()
    };
    let page = repo.list_students(&query).unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].last_name, "Baran");
    assert_eq!(page[1].last_name, "Costa");
}

#[test]
fn service_wraps_repository_calls_and_normalizes_names() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let service = StudentService::new(repo);

    let id = service
        .register_student("  El  Amrani ", " Yasmine", date(2002, 7, 9))
        .unwrap();

    let fetched = service.get_student(id).unwrap().unwrap();
    assert_eq!(fetched.last_name, "El Amrani");
    assert_eq!(fetched.first_name, "Yasmine");

    assert_eq!(service.count_students().unwrap(), 1);

    service.remove_student(id).unwrap();
    assert!(service.get_student(id).unwrap().is_none());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_students_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("students"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_students_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE students (
            id INTEGER PRIMARY KEY,
            last_name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "students",
            column: "birth_date"
        })
    ));
}

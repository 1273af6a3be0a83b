//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable lookup/aggregate/CRUD APIs over the `students` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must validate records before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - The repository only accepts fully migrated connections (`try_new`).

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::student::{NewStudent, Student, StudentId, StudentValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    last_name,
    first_name,
    birth_date
FROM students";

const STUDENTS_TABLE: &str = "students";

const REQUIRED_STUDENT_COLUMNS: &[&str] =
    &["id", "last_name", "first_name", "birth_date", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for student persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(StudentValidationError),
    Db(DbError),
    NotFound(StudentId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing students.
#[derive(Debug, Clone, Default)]
pub struct StudentListQuery {
    /// Case-insensitive substring match against last or first name.
    pub name_contains: Option<String>,
    /// Restrict to students born in this year.
    pub birth_year: Option<i32>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// One row of the year-grouped aggregate: how many students were born
/// in `year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BirthYearCount {
    pub year: i32,
    pub count: u64,
}

/// Repository interface for student persistence and queries.
pub trait StudentRepository {
    fn create_student(&self, draft: &NewStudent) -> RepoResult<StudentId>;
    fn update_student(&self, student: &Student) -> RepoResult<()>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>>;
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
    fn count_students(&self) -> RepoResult<u64>;
    fn count_by_birth_year(&self) -> RepoResult<Vec<BirthYearCount>>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Wraps a connection after verifying its schema is usable.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` does not match
    ///   the latest migration.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the `students`
    ///   schema is incomplete.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_students_schema(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, draft: &NewStudent) -> RepoResult<StudentId> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO students (last_name, first_name, birth_date)
             VALUES (?1, ?2, ?3);",
            params![
                draft.last_name.as_str(),
                draft.first_name.as_str(),
                draft.birth_date,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_student(&self, student: &Student) -> RepoResult<()> {
        student.validate()?;

        let changed = self.conn.execute(
            "UPDATE students
             SET
                last_name = ?1,
                first_name = ?2,
                birth_date = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                student.last_name.as_str(),
                student.first_name.as_str(),
                student.birth_date,
                student.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(student.id));
        }

        Ok(())
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(fragment) = query.name_contains.as_deref() {
            // SQLite LIKE is case-insensitive for ASCII, matching the
            // upstream frontend's search behavior.
            let pattern = format!("%{fragment}%");
            sql.push_str(" AND (last_name LIKE ? OR first_name LIKE ?)");
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        if let Some(year) = query.birth_year {
            sql.push_str(" AND CAST(strftime('%Y', birth_date) AS INTEGER) = ?");
            bind_values.push(Value::Integer(i64::from(year)));
        }

        sql.push_str(" ORDER BY last_name ASC, first_name ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_students(&self) -> RepoResult<u64> {
        let total: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        to_count(total)
    }

    fn count_by_birth_year(&self) -> RepoResult<Vec<BirthYearCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                CAST(strftime('%Y', birth_date) AS INTEGER) AS birth_year,
                COUNT(*) AS total
             FROM students
             GROUP BY birth_year
             ORDER BY birth_year ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();

        while let Some(row) = rows.next()? {
            let year: i32 = row.get("birth_year")?;
            let total: i64 = row.get("total")?;
            counts.push(BirthYearCount {
                year,
                count: to_count(total)?,
            });
        }

        Ok(counts)
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let student = Student {
        id: row.get("id")?,
        last_name: row.get("last_name")?,
        first_name: row.get("first_name")?,
        birth_date: row.get("birth_date")?,
    };
    student.validate()?;
    Ok(student)
}

fn to_count(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{value}`")))
}

fn ensure_students_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 =
        conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [STUDENTS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(STUDENTS_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([STUDENTS_TABLE])?;
    let mut present = Vec::new();
    while let Some(row) = rows.next()? {
        present.push(row.get::<_, String>(0)?);
    }

    for &column in REQUIRED_STUDENT_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: STUDENTS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

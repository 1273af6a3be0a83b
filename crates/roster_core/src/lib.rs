//! Core persistence logic for the student roster.
//! This crate is the single source of truth for roster invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::student::{NewStudent, Student, StudentId, StudentValidationError};
pub use repo::student_repo::{
    BirthYearCount, RepoError, RepoResult, SqliteStudentRepository, StudentListQuery,
    StudentRepository,
};
pub use service::student_service::StudentService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Student use-case service.
//!
//! # Responsibility
//! - Provide stable roster entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::student::{NewStudent, Student, StudentId};
use crate::repo::student_repo::{
    BirthYearCount, RepoResult, StudentListQuery, StudentRepository,
};
use chrono::NaiveDate;

/// Use-case service wrapper for roster operations.
pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new student from raw form input.
    ///
    /// # Contract
    /// - Names are whitespace-normalized before persistence.
    /// - Returns the database-assigned student ID.
    pub fn register_student(
        &self,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> RepoResult<StudentId> {
        let draft = NewStudent::new(
            normalize_person_name(&last_name.into()),
            normalize_person_name(&first_name.into()),
            birth_date,
        );
        self.repo.create_student(&draft)
    }

    /// Creates a student from an already-shaped draft record.
    pub fn create_student(&self, draft: &NewStudent) -> RepoResult<StudentId> {
        self.repo.create_student(draft)
    }

    /// Updates an existing student by stable ID.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_student(&self, student: &Student) -> RepoResult<()> {
        self.repo.update_student(student)
    }

    /// Gets one student by ID; `None` when no such row exists.
    pub fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        self.repo.get_student(id)
    }

    /// Lists students using filter and pagination options.
    pub fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        self.repo.list_students(query)
    }

    /// Removes a student row by ID.
    pub fn remove_student(&self, id: StudentId) -> RepoResult<()> {
        self.repo.delete_student(id)
    }

    /// Total number of student rows.
    pub fn count_students(&self) -> RepoResult<u64> {
        self.repo.count_students()
    }

    /// Number of students per distinct birth year, ascending by year.
    pub fn students_per_birth_year(&self) -> RepoResult<Vec<BirthYearCount>> {
        self.repo.count_by_birth_year()
    }
}

/// Collapses internal whitespace runs and trims the ends of a name.
pub fn normalize_person_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

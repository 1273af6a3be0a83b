//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical student record persisted by the roster.
//! - Validate name and identifier invariants before persistence.
//!
//! # Invariants
//! - `id` uniquely identifies a student row and is assigned by the database.
//! - `last_name` and `first_name` are non-empty after trimming.
//! - `birth_date` is always present; the year aggregate depends on it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Database-assigned identifier for a student row.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type StudentId = i64;

/// Validation error for student records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentValidationError {
    /// `last_name` is empty or whitespace-only.
    EmptyLastName,
    /// `first_name` is empty or whitespace-only.
    EmptyFirstName,
    /// A persisted student carried a non-positive identifier.
    NonPositiveId(StudentId),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLastName => write!(f, "last_name must not be empty"),
            Self::EmptyFirstName => write!(f, "first_name must not be empty"),
            Self::NonPositiveId(id) => write!(f, "student id must be >= 1, got {id}"),
        }
    }
}

impl Error for StudentValidationError {}

/// A student row as stored in the roster.
///
/// Wire field names follow the external schema of the upstream system
/// (`nom` / `prenom` / `dateNaissance`), so serialized records stay
/// compatible with its consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Stable row identifier, assigned on insert.
    pub id: StudentId,
    /// Serialized as `nom` to match external schema naming.
    #[serde(rename = "nom")]
    pub last_name: String,
    /// Serialized as `prenom` to match external schema naming.
    #[serde(rename = "prenom")]
    pub first_name: String,
    /// Date of birth; serialized as ISO-8601 `YYYY-MM-DD`.
    #[serde(rename = "dateNaissance")]
    pub birth_date: NaiveDate,
}

/// An unsaved student record, before the database assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "dateNaissance")]
    pub birth_date: NaiveDate,
}

impl Student {
    /// Builds a student with a known identifier, validating invariants.
    ///
    /// Used by read paths and by callers preparing an update.
    pub fn with_id(
        id: StudentId,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Result<Self, StudentValidationError> {
        let student = Self {
            id,
            last_name: last_name.into(),
            first_name: first_name.into(),
            birth_date,
        };
        student.validate()?;
        Ok(student)
    }

    /// Checks all invariants of a persisted student record.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.id < 1 {
            return Err(StudentValidationError::NonPositiveId(self.id));
        }
        validate_names(&self.last_name, &self.first_name)
    }

    /// Year component of the birth date, as stored by the year aggregate.
    pub fn birth_year(&self) -> i32 {
        use chrono::Datelike;
        self.birth_date.year()
    }
}

impl NewStudent {
    /// Creates an unsaved draft record.
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            birth_date,
        }
    }

    /// Checks name invariants shared with `Student::validate`.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        validate_names(&self.last_name, &self.first_name)
    }
}

fn validate_names(last_name: &str, first_name: &str) -> Result<(), StudentValidationError> {
    if last_name.trim().is_empty() {
        return Err(StudentValidationError::EmptyLastName);
    }
    if first_name.trim().is_empty() {
        return Err(StudentValidationError::EmptyFirstName);
    }
    Ok(())
}

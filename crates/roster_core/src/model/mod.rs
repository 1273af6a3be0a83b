//! Domain model for the student roster.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every persisted record is identified by a database-assigned `StudentId`.
//! - Name invariants are validated before any write reaches SQL.

pub mod student;

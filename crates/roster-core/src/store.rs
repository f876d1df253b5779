//! The `StudentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`roster-store-sqlite` for a
//! local or ephemeral database, `roster-remote` for the hosted table).
//! [`StudentDirectory`](crate::StudentDirectory) depends on this abstraction,
//! not on any concrete backend; which one runs is decided once, at startup.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::student::{EmailAddress, NewStudentRow, StudentRecord, StudentStatus};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Predicate for [`StudentStore::count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountFilter {
  All,
  Status(StudentStatus),
  /// Records whose `added_at` is at or after the given instant.
  AddedSince(DateTime<Utc>),
}

/// Result of [`StudentStore::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
  Created(StudentRecord),
  /// The storage layer's uniqueness constraint rejected the email.
  EmailTaken,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a student record backend.
///
/// Emails handed to and returned from the store are already normalised, so
/// backends compare them byte-for-byte. Every backend must reject a second
/// record with the same email, whatever its status.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait StudentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a new record with `status = active`. The store assigns `id`,
  /// `added_at`, `created_at` and `updated_at`.
  fn insert(
    &self,
    row: NewStudentRow,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Hard-delete a record. Deleting an unknown id is not an error.
  fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Overwrite a record's status and bump `updated_at`. Unknown ids are
  /// ignored.
  fn set_status(
    &self,
    id: Uuid,
    status: StudentStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Every record, most recently added first.
  fn list(&self) -> impl Future<Output = Result<Vec<StudentRecord>, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StudentRecord>, Self::Error>> + Send + '_;

  /// Exact email lookup, optionally restricted to one status. Returns `None`
  /// if no record matches.
  fn find_by_email<'a>(
    &'a self,
    email: &'a EmailAddress,
    status: Option<StudentStatus>,
  ) -> impl Future<Output = Result<Option<StudentRecord>, Self::Error>> + Send + 'a;

  /// Case-insensitive substring match on name or email, most recently added
  /// first.
  fn search<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Vec<StudentRecord>, Self::Error>> + Send + 'a;

  /// Number of records matching `filter`.
  fn count(
    &self,
    filter: CountFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

//! Error types for `roster-core`.

use thiserror::Error;

use crate::student::EmailAddress;

/// Errors surfaced by the write paths of
/// [`StudentDirectory`](crate::StudentDirectory).
///
/// Read paths never return these; they log and degrade to an empty or default
/// value instead.
#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid student: {0}")]
  InvalidStudent(String),

  #[error("a student with email {0} already exists")]
  DuplicateEmail(EmailAddress),

  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn persistence<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Student records, the single entity managed by the directory.
//!
//! A record is created by an administrator, mutated only through its status,
//! and removed by an explicit delete.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Email ───────────────────────────────────────────────────────────────────

/// A normalised (trimmed, lowercase) email address.
///
/// All comparisons between student emails go through this type, so two
/// addresses that differ only in case are always equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
  /// Normalise and minimally validate a raw address.
  pub fn parse(raw: &str) -> Result<Self> {
    let normalised = raw.trim().to_lowercase();

    if normalised.is_empty() {
      return Err(Error::InvalidStudent("email is required".into()));
    }
    if normalised.chars().any(char::is_whitespace) {
      return Err(Error::InvalidStudent(format!(
        "email {normalised:?} contains whitespace"
      )));
    }
    match normalised.split_once('@') {
      Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
      _ => {
        return Err(Error::InvalidStudent(format!(
          "email {normalised:?} is not an address"
        )));
      }
    }

    Ok(Self(normalised))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for EmailAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for EmailAddress {
  fn as_ref(&self) -> &str { &self.0 }
}

impl TryFrom<String> for EmailAddress {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<EmailAddress> for String {
  fn from(value: EmailAddress) -> Self { value.0 }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Whether a student currently counts as enrolled.
///
/// There are no transition rules; either value may overwrite the other.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
  #[default]
  Active,
  Inactive,
}

impl StudentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
    }
  }
}

impl fmt::Display for StudentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for StudentStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "active" => Ok(Self::Active),
      "inactive" => Ok(Self::Inactive),
      other => Err(Error::InvalidStudent(format!("unknown status: {other:?}"))),
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A manually-added student, as persisted by a
/// [`StudentStore`](crate::store::StudentStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
  pub id:         Uuid,
  pub name:       String,
  pub email:      EmailAddress,
  pub notes:      Option<String>,
  /// Identifier of the administrator who created the record.
  pub added_by:   String,
  pub added_at:   DateTime<Utc>,
  pub status:     StudentStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Raw, unvalidated input to
/// [`StudentDirectory::add_student`](crate::StudentDirectory::add_student).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
  pub name:     String,
  pub email:    String,
  #[serde(default)]
  pub notes:    Option<String>,
  pub added_by: String,
}

impl NewStudent {
  pub fn new(
    name: impl Into<String>,
    email: impl Into<String>,
    added_by: impl Into<String>,
  ) -> Self {
    Self {
      name:     name.into(),
      email:    email.into(),
      notes:    None,
      added_by: added_by.into(),
    }
  }

  pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
    self.notes = Some(notes.into());
    self
  }

  /// Validate and normalise into the row handed to the store.
  pub fn validate(self) -> Result<NewStudentRow> {
    let name = self.name.trim();
    if name.is_empty() {
      return Err(Error::InvalidStudent("name is required".into()));
    }
    let added_by = self.added_by.trim();
    if added_by.is_empty() {
      return Err(Error::InvalidStudent("added_by is required".into()));
    }
    let email = EmailAddress::parse(&self.email)?;
    let notes = self
      .notes
      .map(|n| n.trim().to_owned())
      .filter(|n| !n.is_empty());

    Ok(NewStudentRow {
      name: name.to_owned(),
      email,
      notes,
      added_by: added_by.to_owned(),
    })
  }
}

/// Validated input for [`StudentStore::insert`](crate::store::StudentStore::insert).
///
/// The store assigns `id`, `status` and all timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudentRow {
  pub name:     String,
  pub email:    EmailAddress,
  pub notes:    Option<String>,
  pub added_by: String,
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Aggregate counts over the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentStats {
  pub total:            u64,
  pub active:           u64,
  pub inactive:         u64,
  pub added_this_month: u64,
}

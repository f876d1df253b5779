//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision and a `Z` suffix, so lexical comparison in SQL matches
//! chronological order. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use roster_core::student::{EmailAddress, StudentRecord, StudentStatus};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Search patterns ─────────────────────────────────────────────────────────

/// Lowercased copy of a name, stored alongside it for search. SQLite's own
/// `lower()` and `LIKE` only fold ASCII letters.
pub fn fold_name(name: &str) -> String { name.to_lowercase() }

/// Build a `LIKE ... ESCAPE '\'` pattern matching `text` anywhere, with the
/// caller's own `%` and `_` treated literally.
pub fn contains_pattern(text: &str) -> String {
  let mut pattern = String::with_capacity(text.len() + 2);
  pattern.push('%');
  for c in text.to_lowercase().chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every query that yields a [`RawStudent`].
pub const STUDENT_COLUMNS: &str =
  "id, name, email, notes, added_by, added_at, status, created_at, updated_at";

/// Raw strings read directly from a `manual_students` row.
pub struct RawStudent {
  pub id:         String,
  pub name:       String,
  pub email:      String,
  pub notes:      Option<String>,
  pub added_by:   String,
  pub added_at:   String,
  pub status:     String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawStudent {
  /// Map a row selected with [`STUDENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      notes:      row.get(3)?,
      added_by:   row.get(4)?,
      added_at:   row.get(5)?,
      status:     row.get(6)?,
      created_at: row.get(7)?,
      updated_at: row.get(8)?,
    })
  }

  pub fn into_student(self) -> Result<StudentRecord> {
    Ok(StudentRecord {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      email:      EmailAddress::parse(&self.email)?,
      notes:      self.notes,
      added_by:   self.added_by,
      added_at:   decode_dt(&self.added_at)?,
      status:     self.status.parse::<StudentStatus>()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

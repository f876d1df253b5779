//! [`SqliteStore`] — the SQLite implementation of [`StudentStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use roster_core::{
  store::{CountFilter, InsertOutcome, StudentStore},
  student::{EmailAddress, NewStudentRow, StudentRecord, StudentStatus},
};

use crate::{
  Result,
  encode::{RawStudent, STUDENT_COLUMNS, contains_pattern, encode_dt, encode_uuid, fold_name},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A student store backed by a single SQLite database.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store. Contents vanish with the last clone.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT` over [`STUDENT_COLUMNS`] and decode every row.
  async fn select_students(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<StudentRecord>> {
    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawStudent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── StudentStore impl ───────────────────────────────────────────────────────

impl StudentStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert(&self, row: NewStudentRow) -> Result<InsertOutcome> {
    // Truncate to the stored precision so the returned record matches a re-read.
    let now = Utc::now().trunc_subsecs(6);
    let student = StudentRecord {
      id:         Uuid::new_v4(),
      name:       row.name,
      email:      row.email,
      notes:      row.notes,
      added_by:   row.added_by,
      added_at:   now,
      status:     StudentStatus::Active,
      created_at: now,
      updated_at: now,
    };

    let id_str     = encode_uuid(student.id);
    let name       = student.name.clone();
    let folded     = fold_name(&student.name);
    let email      = student.email.as_str().to_owned();
    let notes      = student.notes.clone();
    let added_by   = student.added_by.clone();
    let at_str     = encode_dt(now);
    let status_str = student.status.as_str();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO manual_students (
             id, name, name_folded, email, notes, added_by,
             added_at, status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?7, ?7)",
          rusqlite::params![id_str, name, folded, email, notes, added_by, at_str, status_str],
        );
        match result {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(if inserted {
      InsertOutcome::Created(student)
    } else {
      InsertOutcome::EmailTaken
    })
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM manual_students WHERE id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn set_status(&self, id: Uuid, status: StudentStatus) -> Result<()> {
    let id_str     = encode_uuid(id);
    let status_str = status.as_str();
    let at_str     = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE manual_students SET status = ?2, updated_at = ?3 WHERE id = ?1",
          rusqlite::params![id_str, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list(&self) -> Result<Vec<StudentRecord>> {
    self
      .select_students(
        format!(
          "SELECT {STUDENT_COLUMNS} FROM manual_students
           ORDER BY added_at DESC, rowid DESC"
        ),
        vec![],
      )
      .await
  }

  async fn get(&self, id: Uuid) -> Result<Option<StudentRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STUDENT_COLUMNS} FROM manual_students WHERE id = ?1"),
              rusqlite::params![id_str],
              RawStudent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn find_by_email(
    &self,
    email:  &EmailAddress,
    status: Option<StudentStatus>,
  ) -> Result<Option<StudentRecord>> {
    let mut params = vec![email.as_str().to_owned()];
    let sql = match status {
      Some(s) => {
        params.push(s.as_str().to_owned());
        format!("SELECT {STUDENT_COLUMNS} FROM manual_students WHERE email = ?1 AND status = ?2")
      }
      None => format!("SELECT {STUDENT_COLUMNS} FROM manual_students WHERE email = ?1"),
    };

    Ok(self.select_students(sql, params).await?.into_iter().next())
  }

  async fn search(&self, text: &str) -> Result<Vec<StudentRecord>> {
    self
      .select_students(
        format!(
          "SELECT {STUDENT_COLUMNS} FROM manual_students
           WHERE name_folded LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\'
           ORDER BY added_at DESC, rowid DESC"
        ),
        vec![contains_pattern(text)],
      )
      .await
  }

  async fn count(&self, filter: CountFilter) -> Result<u64> {
    let (sql, param): (&'static str, Option<String>) = match filter {
      CountFilter::All => ("SELECT COUNT(*) FROM manual_students", None),
      CountFilter::Status(s) => (
        "SELECT COUNT(*) FROM manual_students WHERE status = ?1",
        Some(s.as_str().to_owned()),
      ),
      CountFilter::AddedSince(since) => (
        "SELECT COUNT(*) FROM manual_students WHERE added_at >= ?1",
        Some(encode_dt(since)),
      ),
    };

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(sql, rusqlite::params_from_iter(param), |r| r.get(0))?)
      })
      .await?;

    Ok(u64::try_from(n).unwrap_or_default())
  }
}

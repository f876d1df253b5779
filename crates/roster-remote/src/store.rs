//! [`RemoteStore`] — [`StudentStore`] over the hosted table API.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | insert | `POST /rest/v1/{table}` with `Prefer: return=representation` |
//! | list | `GET ?select=*&order=added_at.desc` |
//! | get / find_by_email | `GET ?id=eq.…` / `?email=eq.…[&status=eq.…]` |
//! | search | `GET ?or=(name.ilike."*q*",email.ilike."*q*")` |
//! | delete | `DELETE ?id=eq.…` |
//! | set_status | `PATCH ?id=eq.…` |
//! | count | `HEAD` with `Prefer: count=exact`, read from `Content-Range` |
//!
//! The table is expected to assign `id`, `added_at`, `created_at` and
//! `updated_at`, and to carry a unique constraint on `email`.

use chrono::{SecondsFormat, Utc};
use reqwest::{StatusCode, header};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use roster_core::{
  store::{CountFilter, InsertOutcome, StudentStore},
  student::{EmailAddress, NewStudentRow, StudentRecord, StudentStatus},
};

use crate::{
  Error, Result,
  client::{RemoteClient, check},
};

/// Table used when none is configured.
pub const DEFAULT_TABLE: &str = "manual_students";

const ORDER_NEWEST: (&str, &str) = ("order", "added_at.desc");
const SELECT_ALL: (&str, &str) = ("select", "*");

#[derive(Serialize)]
struct InsertBody<'a> {
  name:     &'a str,
  email:    &'a str,
  notes:    Option<&'a str>,
  added_by: &'a str,
  status:   StudentStatus,
}

#[derive(Serialize)]
struct StatusPatch {
  status:     StudentStatus,
  updated_at: String,
}

/// A student store backed by a hosted database table.
///
/// Cheap to clone.
#[derive(Debug, Clone)]
pub struct RemoteStore {
  client: RemoteClient,
  table:  String,
}

impl RemoteStore {
  pub fn new(client: RemoteClient, table: impl Into<String>) -> Self {
    Self { client, table: table.into() }
  }

  fn url(&self) -> String { self.client.rest_url(&self.table) }

  async fn select(&self, filters: &[(&str, String)]) -> Result<Vec<StudentRecord>> {
    let resp = self
      .client
      .auth(self.client.http().get(self.url()))
      .query(&[SELECT_ALL, ORDER_NEWEST])
      .query(filters)
      .send()
      .await?;
    Ok(check(resp).await?.json().await?)
  }
}

fn eq(value: impl std::fmt::Display) -> String { format!("eq.{value}") }

/// PostgREST `or` filter matching `text` inside name or email, case-insensitively.
///
/// `%` and `_` are escaped for `ILIKE`. PostgREST rewrites every `*` to `%`
/// with no way to escape it, so a literal `*` becomes the one-character
/// wildcard `_`.
fn ilike_either(text: &str) -> String {
  let mut pattern = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '%' | '_' | '\\' => {
        pattern.push('\\');
        pattern.push(c);
      }
      '*' => pattern.push('_'),
      c => pattern.push(c),
    }
  }
  let quoted = pattern.replace('\\', "\\\\").replace('"', "\\\"");
  format!("(name.ilike.\"*{quoted}*\",email.ilike.\"*{quoted}*\")")
}

/// Total from a `Content-Range` value such as `0-24/57` or `*/0`.
fn parse_content_range(value: &str) -> Result<u64> {
  value
    .rsplit_once('/')
    .and_then(|(_, total)| total.parse().ok())
    .ok_or_else(|| Error::ContentRange(value.to_owned()))
}

impl StudentStore for RemoteStore {
  type Error = Error;

  async fn insert(&self, row: NewStudentRow) -> Result<InsertOutcome> {
    let body = InsertBody {
      name:     &row.name,
      email:    row.email.as_str(),
      notes:    row.notes.as_deref(),
      added_by: &row.added_by,
      status:   StudentStatus::Active,
    };

    let resp = self
      .client
      .auth(self.client.http().post(self.url()))
      .header("Prefer", "return=representation")
      .json(&body)
      .send()
      .await?;

    if resp.status() == StatusCode::CONFLICT {
      debug!(email = %row.email, "remote table rejected duplicate email");
      return Ok(InsertOutcome::EmailTaken);
    }

    let mut created: Vec<StudentRecord> = check(resp).await?.json().await?;
    if created.is_empty() {
      return Err(Error::NotReturned);
    }
    Ok(InsertOutcome::Created(created.swap_remove(0)))
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let resp = self
      .client
      .auth(self.client.http().delete(self.url()))
      .query(&[("id", eq(id))])
      .send()
      .await?;
    check(resp).await?;
    Ok(())
  }

  async fn set_status(&self, id: Uuid, status: StudentStatus) -> Result<()> {
    let patch = StatusPatch {
      status,
      updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    };

    let resp = self
      .client
      .auth(self.client.http().patch(self.url()))
      .query(&[("id", eq(id))])
      .json(&patch)
      .send()
      .await?;
    check(resp).await?;
    Ok(())
  }

  async fn list(&self) -> Result<Vec<StudentRecord>> { self.select(&[]).await }

  async fn get(&self, id: Uuid) -> Result<Option<StudentRecord>> {
    let rows = self.select(&[("id", eq(id))]).await?;
    Ok(rows.into_iter().next())
  }

  async fn find_by_email(
    &self,
    email:  &EmailAddress,
    status: Option<StudentStatus>,
  ) -> Result<Option<StudentRecord>> {
    let mut filters = vec![("email", eq(email)), ("limit", "1".to_owned())];
    if let Some(status) = status {
      filters.push(("status", eq(status)));
    }
    let rows = self.select(&filters).await?;
    Ok(rows.into_iter().next())
  }

  async fn search(&self, text: &str) -> Result<Vec<StudentRecord>> {
    if text.is_empty() {
      return self.list().await;
    }
    self.select(&[("or", ilike_either(text))]).await
  }

  async fn count(&self, filter: CountFilter) -> Result<u64> {
    let filters: Vec<(&str, String)> = match filter {
      CountFilter::All => vec![],
      CountFilter::Status(s) => vec![("status", eq(s))],
      CountFilter::AddedSince(since) => vec![(
        "added_at",
        format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Micros, true)),
      )],
    };

    let resp = self
      .client
      .auth(self.client.http().head(self.url()))
      .header("Prefer", "count=exact")
      .query(&[("select", "id")])
      .query(&filters)
      .send()
      .await?;
    let resp = check(resp).await?;

    let range = resp
      .headers()
      .get(header::CONTENT_RANGE)
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| Error::ContentRange(String::new()))?;
    parse_content_range(range)
  }
}

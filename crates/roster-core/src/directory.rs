//! [`StudentDirectory`], the service layer over a [`StudentStore`].
//!
//! Write operations (add, remove, status update) surface failures to the
//! caller. Read operations (list, search, lookups, stats) log the failure and
//! return an empty or default value, so an outage on a read path looks like an
//! empty directory. Welcome notifications never fail the triggering add.

use chrono::{DateTime, Datelike, Local, NaiveTime, TimeZone, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  collaborator::{PurchaseVerifier, WelcomeNotifier},
  store::{CountFilter, InsertOutcome, StudentStore},
  student::{EmailAddress, NewStudent, StudentRecord, StudentStats, StudentStatus},
};

/// Manages the manually-added students of a course.
///
/// The store, the purchase verifier and the welcome notifier are injected at
/// construction; any credentials they need are their own concern.
pub struct StudentDirectory<S, V, N> {
  store:    S,
  verifier: V,
  notifier: N,
}

impl<S, V, N> StudentDirectory<S, V, N>
where
  S: StudentStore,
  V: PurchaseVerifier,
  N: WelcomeNotifier,
{
  pub fn new(store: S, verifier: V, notifier: N) -> Self {
    Self { store, verifier, notifier }
  }

  // ── Writes ──────────────────────────────────────────────────────────────

  /// Validate, de-duplicate and persist a new student, then send the welcome
  /// email on a best-effort basis.
  ///
  /// Fails with [`Error::DuplicateEmail`] when any record (active or not)
  /// already uses the email, whether detected by the pre-check or by the
  /// store's own uniqueness constraint.
  pub async fn add_student(&self, input: NewStudent) -> Result<StudentRecord> {
    let row = input.validate()?;

    let existing = self
      .store
      .find_by_email(&row.email, None)
      .await
      .map_err(Error::persistence)?;
    if existing.is_some() {
      debug!(email = %row.email, "rejecting duplicate student email");
      return Err(Error::DuplicateEmail(row.email));
    }

    let email = row.email.clone();
    let student = match self.store.insert(row).await.map_err(Error::persistence)? {
      InsertOutcome::Created(student) => student,
      InsertOutcome::EmailTaken => {
        debug!(%email, "store rejected duplicate student email");
        return Err(Error::DuplicateEmail(email));
      }
    };

    info!(
      student_id = %student.id,
      email = %student.email,
      added_by = %student.added_by,
      "added student"
    );

    if let Err(e) = self.notifier.send_welcome(&student).await {
      warn!(student_id = %student.id, error = %e, "welcome notification failed");
    }

    Ok(student)
  }

  /// Hard-delete a student. Unknown ids succeed silently.
  pub async fn remove_student(&self, id: Uuid) -> Result<()> {
    self.store.delete(id).await.map_err(Error::persistence)?;
    info!(student_id = %id, "removed student");
    Ok(())
  }

  /// Overwrite a student's status. No transition is rejected.
  pub async fn update_student_status(&self, id: Uuid, status: StudentStatus) -> Result<()> {
    self
      .store
      .set_status(id, status)
      .await
      .map_err(Error::persistence)?;
    info!(student_id = %id, %status, "updated student status");
    Ok(())
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  /// Every student, most recently added first. Empty on storage failure.
  pub async fn get_students(&self) -> Vec<StudentRecord> {
    match self.store.list().await {
      Ok(students) => students,
      Err(e) => {
        error!(error = %e, "failed to list students");
        Vec::new()
      }
    }
  }

  pub async fn get_student(&self, id: Uuid) -> Option<StudentRecord> {
    match self.store.get(id).await {
      Ok(student) => student,
      Err(e) => {
        error!(student_id = %id, error = %e, "failed to fetch student");
        None
      }
    }
  }

  /// Whether `email` belongs to an active student or, failing that, to a
  /// customer known to the purchase verifier.
  ///
  /// Any failure answers `false`, which lets registration proceed.
  pub async fn check_email_exists(&self, email: &str) -> bool {
    let Ok(email) = EmailAddress::parse(email) else {
      return false;
    };

    match self
      .store
      .find_by_email(&email, Some(StudentStatus::Active))
      .await
    {
      Ok(Some(_)) => return true,
      Ok(None) => {}
      Err(e) => {
        error!(%email, error = %e, "failed to check local students for email");
        return false;
      }
    }

    match self.verifier.verify(&email).await {
      Ok(purchased) => purchased,
      Err(e) => {
        error!(%email, error = %e, "purchase verification failed");
        false
      }
    }
  }

  /// The active student with this email, if any.
  pub async fn get_student_by_email(&self, email: &str) -> Option<StudentRecord> {
    let email = match EmailAddress::parse(email) {
      Ok(email) => email,
      Err(e) => {
        debug!(error = %e, "ignoring lookup of malformed email");
        return None;
      }
    };

    match self
      .store
      .find_by_email(&email, Some(StudentStatus::Active))
      .await
    {
      Ok(Some(student)) => Some(student),
      Ok(None) => None,
      Err(e) => {
        error!(%email, error = %e, "failed to look up student by email");
        None
      }
    }
  }

  /// Case-insensitive substring search over name and email, most recently
  /// added first. Empty on storage failure.
  pub async fn search_students(&self, query: &str) -> Vec<StudentRecord> {
    let query = query.trim();
    match self.store.search(query).await {
      Ok(students) => students,
      Err(e) => {
        error!(query, error = %e, "failed to search students");
        Vec::new()
      }
    }
  }

  /// Aggregate counts, with "this month" measured from local midnight on the
  /// first of the current month.
  pub async fn get_student_stats(&self) -> StudentStats {
    self.get_student_stats_since(start_of_month(&Local::now())).await
  }

  /// Aggregate counts with an explicit start for `added_this_month`.
  ///
  /// The four counts run concurrently and each falls back to zero on its own.
  pub async fn get_student_stats_since(&self, month_start: DateTime<Utc>) -> StudentStats {
    let (total, active, inactive, added_this_month) = tokio::join!(
      self.count_or_zero(CountFilter::All),
      self.count_or_zero(CountFilter::Status(StudentStatus::Active)),
      self.count_or_zero(CountFilter::Status(StudentStatus::Inactive)),
      self.count_or_zero(CountFilter::AddedSince(month_start)),
    );

    StudentStats { total, active, inactive, added_this_month }
  }

  async fn count_or_zero(&self, filter: CountFilter) -> u64 {
    match self.store.count(filter).await {
      Ok(n) => n,
      Err(e) => {
        error!(?filter, error = %e, "failed to count students");
        0
      }
    }
  }
}

/// Midnight on the first day of `now`'s month, in `now`'s timezone.
pub fn start_of_month<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
  let today = now.date_naive();
  let midnight = today
    .with_day(1)
    .unwrap_or(today)
    .and_time(NaiveTime::MIN);

  // A DST gap at midnight has no local instant; fall back to UTC midnight.
  now
    .timezone()
    .from_local_datetime(&midnight)
    .earliest()
    .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
}

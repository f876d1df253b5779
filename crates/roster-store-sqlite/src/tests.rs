//! Integration tests for `SqliteStore` against an in-memory database.

use std::convert::Infallible;

use chrono::{Duration, Utc};
use roster_core::{
  Error as CoreError, StudentDirectory,
  collaborator::{PurchaseVerifier, WelcomeNotifier},
  store::{CountFilter, InsertOutcome, StudentStore},
  student::{EmailAddress, NewStudent, NewStudentRow, StudentRecord, StudentStatus},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn row(name: &str, email: &str) -> NewStudentRow {
  NewStudent::new(name, email, "admin1")
    .validate()
    .expect("valid student")
}

async fn insert(s: &SqliteStore, name: &str, email: &str) -> StudentRecord {
  match s.insert(row(name, email)).await.unwrap() {
    InsertOutcome::Created(student) => student,
    InsertOutcome::EmailTaken => panic!("{email} unexpectedly taken"),
  }
}

fn email(raw: &str) -> EmailAddress { EmailAddress::parse(raw).unwrap() }

// ─── Writes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get() {
  let s = store().await;

  let ana = insert(&s, "Ana Silva", "Ana@Example.com").await;
  assert_eq!(ana.email.as_str(), "ana@example.com");
  assert_eq!(ana.status, StudentStatus::Active);
  assert_eq!(ana.added_at, ana.created_at);

  let fetched = s.get(ana.id).await.unwrap().unwrap();
  assert_eq!(fetched, ana);
}

#[tokio::test]
async fn notes_roundtrip() {
  let s = store().await;
  let input = NewStudent::new("Ana", "ana@example.com", "admin1")
    .with_notes("paid by bank transfer")
    .validate()
    .unwrap();

  let InsertOutcome::Created(ana) = s.insert(input).await.unwrap() else {
    panic!("insert rejected");
  };
  let fetched = s.get(ana.id).await.unwrap().unwrap();
  assert_eq!(fetched.notes.as_deref(), Some("paid by bank transfer"));
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn unique_constraint_rejects_second_email() {
  let s = store().await;
  insert(&s, "Ana Silva", "ana@example.com").await;

  let outcome = s.insert(row("Other Ana", "ANA@example.com")).await.unwrap();
  assert_eq!(outcome, InsertOutcome::EmailTaken);
  assert_eq!(s.count(CountFilter::All).await.unwrap(), 1);
}

#[tokio::test]
async fn delete_is_hard_and_idempotent() {
  let s = store().await;
  let ana = insert(&s, "Ana Silva", "ana@example.com").await;

  s.delete(ana.id).await.unwrap();
  assert!(s.get(ana.id).await.unwrap().is_none());
  s.delete(ana.id).await.unwrap();
  s.delete(Uuid::new_v4()).await.unwrap();

  // The email is free again.
  insert(&s, "Ana Silva", "ana@example.com").await;
}

#[tokio::test]
async fn set_status_overwrites_and_touches_updated_at() {
  let s = store().await;
  let ana = insert(&s, "Ana Silva", "ana@example.com").await;

  s.set_status(ana.id, StudentStatus::Inactive).await.unwrap();
  let fetched = s.get(ana.id).await.unwrap().unwrap();
  assert_eq!(fetched.status, StudentStatus::Inactive);
  assert!(fetched.updated_at >= fetched.created_at);
  assert_eq!(fetched.added_at, ana.added_at);

  s.set_status(ana.id, StudentStatus::Inactive).await.unwrap();
  s.set_status(Uuid::new_v4(), StudentStatus::Active).await.unwrap();
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_newest_first() {
  let s = store().await;
  let a = insert(&s, "Ana", "ana@example.com").await;
  let b = insert(&s, "Bea", "bea@example.com").await;
  let c = insert(&s, "Caio", "caio@example.com").await;

  let ids: Vec<_> = s.list().await.unwrap().into_iter().map(|r| r.id).collect();
  assert_eq!(ids, vec![c.id, b.id, a.id]);
}

#[tokio::test]
async fn find_by_email_respects_status_filter() {
  let s = store().await;
  let ana = insert(&s, "Ana", "ana@example.com").await;
  s.set_status(ana.id, StudentStatus::Inactive).await.unwrap();

  let any = s.find_by_email(&email("ana@example.com"), None).await.unwrap();
  assert_eq!(any.map(|r| r.id), Some(ana.id));

  let active = s
    .find_by_email(&email("ana@example.com"), Some(StudentStatus::Active))
    .await
    .unwrap();
  assert!(active.is_none());

  let inactive = s
    .find_by_email(&email("ana@example.com"), Some(StudentStatus::Inactive))
    .await
    .unwrap();
  assert!(inactive.is_some());
}

#[tokio::test]
async fn search_matches_name_or_email_case_insensitively() {
  let s = store().await;
  let ana = insert(&s, "Ana Silva", "asilva@example.com").await;
  let bob = insert(&s, "Bob", "bob.anastacio@example.com").await;
  insert(&s, "Carla", "carla@example.com").await;

  let ids: Vec<_> = s
    .search("ANA")
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.id)
    .collect();
  assert_eq!(ids, vec![bob.id, ana.id]);

  assert!(s.search("xyz").await.unwrap().is_empty());
  assert_eq!(s.search("").await.unwrap().len(), 3);
}

#[tokio::test]
async fn search_folds_accented_names() {
  let s = store().await;
  let erica = insert(&s, "Érica Gonçalves", "erica@example.com").await;
  insert(&s, "Bob", "bob@example.com").await;

  for query in ["Érica", "érica", "ÉRICA", "gonçalves", "GONÇ"] {
    let ids: Vec<_> = s
      .search(query)
      .await
      .unwrap()
      .into_iter()
      .map(|r| r.id)
      .collect();
    assert_eq!(ids, vec![erica.id], "query: {query}");
  }

  // The stored name keeps its original casing.
  assert_eq!(s.get(erica.id).await.unwrap().unwrap().name, "Érica Gonçalves");
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
  let s = store().await;
  insert(&s, "Ana", "ana@example.com").await;
  insert(&s, "100% Ana", "percent@example.com").await;

  let hits = s.search("100%").await.unwrap();
  assert_eq!(hits.len(), 1);
  assert!(s.search("_na").await.unwrap().is_empty());
}

#[tokio::test]
async fn count_filters() {
  let s = store().await;
  let ana = insert(&s, "Ana", "ana@example.com").await;
  let bea = insert(&s, "Bea", "bea@example.com").await;
  insert(&s, "Caio", "caio@example.com").await;
  s.set_status(ana.id, StudentStatus::Inactive).await.unwrap();

  assert_eq!(s.count(CountFilter::All).await.unwrap(), 3);
  assert_eq!(
    s.count(CountFilter::Status(StudentStatus::Active)).await.unwrap(),
    2
  );
  assert_eq!(
    s.count(CountFilter::Status(StudentStatus::Inactive)).await.unwrap(),
    1
  );
  assert_eq!(
    s.count(CountFilter::AddedSince(bea.added_at)).await.unwrap(),
    2
  );
  assert_eq!(
    s.count(CountFilter::AddedSince(Utc::now() + Duration::days(1)))
      .await
      .unwrap(),
    0
  );
}

// ─── Directory over SQLite ───────────────────────────────────────────────────

struct NoPurchases;

impl PurchaseVerifier for NoPurchases {
  type Error = Infallible;

  async fn verify(&self, _email: &EmailAddress) -> Result<bool, Infallible> { Ok(false) }
}

struct Silent;

impl WelcomeNotifier for Silent {
  type Error = Infallible;

  async fn send_welcome(&self, _student: &StudentRecord) -> Result<(), Infallible> {
    Ok(())
  }
}

#[tokio::test]
async fn directory_scenario() {
  let dir = StudentDirectory::new(store().await, NoPurchases, Silent);

  let ana = dir
    .add_student(NewStudent::new("Ana Silva", "Ana@Example.com", "admin1"))
    .await
    .unwrap();
  assert_eq!(ana.email.as_str(), "ana@example.com");

  let err = dir
    .add_student(NewStudent::new("Ana Silva", "ANA@EXAMPLE.COM", "admin1"))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::DuplicateEmail(_)));
  assert_eq!(dir.get_students().await.len(), 1);

  assert_eq!(dir.search_students("ana").await, vec![ana.clone()]);
  assert!(dir.search_students("xyz").await.is_empty());

  let found = dir.get_student_by_email("ANA@example.COM").await.unwrap();
  assert_eq!(found.id, ana.id);

  let stats = dir.get_student_stats().await;
  assert_eq!(stats.total, 1);
  assert_eq!(stats.active, 1);
  assert_eq!(stats.inactive, 0);
  assert_eq!(stats.added_this_month, 1);

  dir.remove_student(ana.id).await.unwrap();
  assert!(dir.get_student_by_email("ana@example.com").await.is_none());
}

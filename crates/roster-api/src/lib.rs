//! JSON REST API for the Roster student directory.
//!
//! Exposes an axum [`Router`] backed by any [`StudentDirectory`]. Auth, TLS,
//! and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(directory.clone()))
//! ```

pub mod error;
pub mod students;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use roster_core::{
  StudentDirectory,
  collaborator::{PurchaseVerifier, WelcomeNotifier},
  store::StudentStore,
};

pub use error::ApiError;

/// The directory as shared between handlers.
pub type SharedDirectory<S, V, N> = Arc<StudentDirectory<S, V, N>>;

/// Build a fully-materialised API router for `directory`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, V, N>(directory: SharedDirectory<S, V, N>) -> Router<()>
where
  S: StudentStore + 'static,
  V: PurchaseVerifier + 'static,
  N: WelcomeNotifier + 'static,
{
  Router::new()
    .route(
      "/students",
      get(students::list::<S, V, N>).post(students::create::<S, V, N>),
    )
    .route("/students/search", get(students::search::<S, V, N>))
    .route("/students/stats", get(students::stats::<S, V, N>))
    .route("/students/by-email", get(students::by_email::<S, V, N>))
    .route("/students/exists", get(students::exists::<S, V, N>))
    .route(
      "/students/{id}",
      get(students::get_one::<S, V, N>).delete(students::remove::<S, V, N>),
    )
    .route("/students/{id}/status", put(students::set_status::<S, V, N>))
    .with_state(directory)
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use roster_core::student::{EmailAddress, StudentRecord, StudentStats};
  use roster_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  /// Treats a fixed list of addresses as paying customers.
  struct Purchases(Vec<&'static str>);

  impl PurchaseVerifier for Purchases {
    type Error = Infallible;

    async fn verify(&self, email: &EmailAddress) -> Result<bool, Infallible> {
      Ok(self.0.contains(&email.as_str()))
    }
  }

  struct Silent;

  impl WelcomeNotifier for Silent {
    type Error = Infallible;

    async fn send_welcome(&self, _student: &StudentRecord) -> Result<(), Infallible> {
      Ok(())
    }
  }

  type Directory = SharedDirectory<SqliteStore, Purchases, Silent>;

  async fn make_directory() -> Directory {
    let store = SqliteStore::open_in_memory().await.unwrap();
    Arc::new(StudentDirectory::new(
      store,
      Purchases(vec!["buyer@example.com"]),
      Silent,
    ))
  }

  async fn oneshot_json(
    dir:    Directory,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(b) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = api_router(dir).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    // Extractor rejections answer in plain text.
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
  }

  async fn add_ana(dir: Directory) -> Value {
    let (status, body) = oneshot_json(
      dir,
      "POST",
      "/students",
      Some(json!({ "name": "Ana Silva", "email": "Ana@Example.com", "added_by": "admin1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    body
  }

  // ── Create ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_normalised_email() {
    let dir = make_directory().await;
    let body = add_ana(dir.clone()).await;

    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["status"], "active");
    assert_eq!(body["added_by"], "admin1");
  }

  #[tokio::test]
  async fn duplicate_email_returns_409() {
    let dir = make_directory().await;
    add_ana(dir.clone()).await;

    let (status, body) = oneshot_json(
      dir.clone(),
      "POST",
      "/students",
      Some(json!({ "name": "Ana", "email": "ANA@EXAMPLE.COM", "added_by": "admin2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("ana@example.com"));

    let (_, list) = oneshot_json(dir, "GET", "/students", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn invalid_student_returns_422() {
    let dir = make_directory().await;
    let (status, _) = oneshot_json(
      dir,
      "POST",
      "/students",
      Some(json!({ "name": "Ana", "email": "not-an-email", "added_by": "admin1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }

  // ── Reads ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn search_and_lookup() {
    let dir = make_directory().await;
    let ana = add_ana(dir.clone()).await;

    let (status, hits) = oneshot_json(dir.clone(), "GET", "/students/search?q=ana", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["id"], ana["id"]);

    let (_, none) = oneshot_json(dir.clone(), "GET", "/students/search?q=xyz", None).await;
    assert!(none.as_array().unwrap().is_empty());

    let (status, found) = oneshot_json(
      dir.clone(),
      "GET",
      "/students/by-email?email=ANA%40example.com",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], ana["id"]);

    let uri = format!("/students/{}", ana["id"].as_str().unwrap());
    let (status, one) = oneshot_json(dir, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["name"], "Ana Silva");
  }

  #[tokio::test]
  async fn unknown_student_returns_404() {
    let dir = make_directory().await;
    let (status, _) = oneshot_json(
      dir.clone(),
      "GET",
      "/students/by-email?email=nobody%40example.com",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/students/{}", uuid::Uuid::new_v4());
    let (status, _) = oneshot_json(dir, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn exists_consults_local_then_purchases() {
    let dir = make_directory().await;
    add_ana(dir.clone()).await;

    for (email, expected) in [
      ("ana%40example.com", true),
      ("buyer%40example.com", true),
      ("nobody%40example.com", false),
    ] {
      let (status, body) = oneshot_json(
        dir.clone(),
        "GET",
        &format!("/students/exists?email={email}"),
        None,
      )
      .await;
      assert_eq!(status, StatusCode::OK);
      assert_eq!(body, json!({ "exists": expected }), "email: {email}");
    }
  }

  // ── Status / delete ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn deactivate_then_delete() {
    let dir = make_directory().await;
    let ana = add_ana(dir.clone()).await;
    let id = ana["id"].as_str().unwrap().to_owned();

    let (status, _) = oneshot_json(
      dir.clone(),
      "PUT",
      &format!("/students/{id}/status"),
      Some(json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, exists) =
      oneshot_json(dir.clone(), "GET", "/students/exists?email=ana%40example.com", None).await;
    assert_eq!(exists["exists"], false);

    let (_, stats) = oneshot_json(dir.clone(), "GET", "/students/stats", None).await;
    let stats: StudentStats = serde_json::from_value(stats).unwrap();
    assert_eq!(
      stats,
      StudentStats { total: 1, active: 0, inactive: 1, added_this_month: 1 }
    );

    let (status, _) = oneshot_json(dir.clone(), "DELETE", &format!("/students/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = oneshot_json(dir, "GET", "/students", None).await;
    assert!(list.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unknown_status_is_rejected() {
    let dir = make_directory().await;
    let ana = add_ana(dir.clone()).await;
    let uri = format!("/students/{}/status", ana["id"].as_str().unwrap());

    let (status, _) = oneshot_json(dir, "PUT", &uri, Some(json!({ "status": "deleted" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }
}

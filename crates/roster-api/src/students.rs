//! Handlers for `/students` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | Newest first; empty if storage is unavailable |
//! | `POST`   | `/students` | Body: [`NewStudent`]; 201, 409 on duplicate email, 422 on invalid input |
//! | `GET`    | `/students/search` | `?q=`; substring of name or email |
//! | `GET`    | `/students/stats` | Counts by status and this month |
//! | `GET`    | `/students/by-email` | `?email=`; active students only, 404 otherwise |
//! | `GET`    | `/students/exists` | `?email=`; local or purchased |
//! | `GET`    | `/students/{id}` | 404 if not found |
//! | `DELETE` | `/students/{id}` | Hard delete; 204 |
//! | `PUT`    | `/students/{id}/status` | Body: `{"status":"inactive"}`; 204 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  collaborator::{PurchaseVerifier, WelcomeNotifier},
  store::StudentStore,
  student::{NewStudent, StudentRecord, StudentStats, StudentStatus},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{SharedDirectory, error::ApiError};

// ─── Collection ───────────────────────────────────────────────────────────────

/// `GET /students`
pub async fn list<S, V, N>(
  State(dir): State<SharedDirectory<S, V, N>>,
) -> Json<Vec<StudentRecord>>
where
  S: StudentStore,
  V: PurchaseVerifier,
  N: WelcomeNotifier,
{
  Json(dir.get_students().await)
}

/// `POST /students` — returns 201 + the stored record.
pub async fn create<S, V, N>(
  State(dir): State<SharedDirectory<S, V, N>>,
  Json(body): Json<NewStudent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore,
  V: PurchaseVerifier,
  N: WelcomeNotifier,
{
  let student = dir.add_student(body).await?;
  Ok((StatusCode::CREATED, Json(student)))
}

// ─── Queries ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /students/search?q=<text>`
pub async fn search<S, V, N>(
  State(dir): State<SharedDirectory<S, V, N>>,
  Query(params): Query<SearchParams>,
) -> Json<Vec<StudentRecord>>
where
  S: StudentStore,
  V: PurchaseVerifier,
  N: WelcomeNotifier,
{
  Json(dir.search_students(&params.q).await)
}

/// `GET /students/stats`
pub async fn stats<S, V, N>(State(dir): State<SharedDirectory<S, V, N>>) -> Json<StudentStats>
where
  S: StudentStore,
  V: PurchaseVerifier,
  N: WelcomeNotifier,
{
  Json(dir.get_student_stats().await)
}

#[derive(Debug, Deserialize)]
pub struct EmailParams {
  pub email: String,
}

/// `GET /students/by-email?email=<address>`
pub async fn by_email<S, V, N>(
  State(dir): State<SharedDirectory<S, V, N>>,
  Query(params): Query<EmailParams>,
) -> Result<Json<StudentRecord>, ApiError>
where
  S: StudentStore,
  V: PurchaseVerifier,
  N: WelcomeNotifier,
{
  dir
    .get_student_by_email(&params.email)
    .await
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("no active student with email {}", params.email)))
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
  pub exists: bool,
}

/// `GET /students/exists?email=<address>`
pub async fn exists<S, V, N>(
  State(dir): State<SharedDirectory<S, V, N>>,
  Query(params): Query<EmailParams>,
) -> Json<ExistsResponse>
where
  S: StudentStore,
  V: PurchaseVerifier,
  N: WelcomeNotifier,
{
  Json(ExistsResponse { exists: dir.check_email_exists(&params.email).await })
}

// ─── Single student ───────────────────────────────────────────────────────────

/// `GET /students/{id}`
pub async fn get_one<S, V, N>(
  State(dir): State<SharedDirectory<S, V, N>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StudentRecord>, ApiError>
where
  S: StudentStore,
  V: PurchaseVerifier,
  N: WelcomeNotifier,
{
  dir
    .get_student(id)
    .await
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("student {id} not found")))
}

/// `DELETE /students/{id}`
pub async fn remove<S, V, N>(
  State(dir): State<SharedDirectory<S, V, N>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: StudentStore,
  V: PurchaseVerifier,
  N: WelcomeNotifier,
{
  dir.remove_student(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: StudentStatus,
}

/// `PUT /students/{id}/status` — body: `{"status":"active"|"inactive"}`
pub async fn set_status<S, V, N>(
  State(dir): State<SharedDirectory<S, V, N>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<StatusCode, ApiError>
where
  S: StudentStore,
  V: PurchaseVerifier,
  N: WelcomeNotifier,
{
  dir.update_student_status(id, body.status).await?;
  Ok(StatusCode::NO_CONTENT)
}

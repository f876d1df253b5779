//! The store selected at startup.
//!
//! [`StudentStore`] returns `impl Future`, so it cannot be boxed as a trait
//! object; the server dispatches over a closed set of backends instead.

use std::path::{Path, PathBuf};

use roster_core::{
  StudentDirectory,
  store::{CountFilter, InsertOutcome, StudentStore},
  student::{EmailAddress, NewStudentRow, StudentRecord, StudentStatus},
};
use roster_remote::{
  Credentials, FunctionNotifier, HttpPurchaseVerifier, RemoteClient, RemoteConfig, RemoteStore,
};
use roster_store_sqlite::SqliteStore;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::{BackendConfig, RemoteBackendConfig};

/// The directory as served by this binary.
pub type Directory =
  StudentDirectory<Backend, Option<HttpPurchaseVerifier>, Option<FunctionNotifier>>;

pub enum Backend {
  Sqlite(SqliteStore),
  Remote(RemoteStore),
}

#[derive(Debug, Error)]
pub enum BackendError {
  #[error(transparent)]
  Sqlite(#[from] roster_store_sqlite::Error),

  #[error(transparent)]
  Remote(#[from] roster_remote::Error),

  #[error("failed to create store directory: {0}")]
  Io(#[from] std::io::Error),
}

type Result<T, E = BackendError> = std::result::Result<T, E>;

impl StudentStore for Backend {
  type Error = BackendError;

  async fn insert(&self, row: NewStudentRow) -> Result<InsertOutcome> {
    Ok(match self {
      Self::Sqlite(s) => s.insert(row).await?,
      Self::Remote(s) => s.insert(row).await?,
    })
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    match self {
      Self::Sqlite(s) => s.delete(id).await?,
      Self::Remote(s) => s.delete(id).await?,
    }
    Ok(())
  }

  async fn set_status(&self, id: Uuid, status: StudentStatus) -> Result<()> {
    match self {
      Self::Sqlite(s) => s.set_status(id, status).await?,
      Self::Remote(s) => s.set_status(id, status).await?,
    }
    Ok(())
  }

  async fn list(&self) -> Result<Vec<StudentRecord>> {
    Ok(match self {
      Self::Sqlite(s) => s.list().await?,
      Self::Remote(s) => s.list().await?,
    })
  }

  async fn get(&self, id: Uuid) -> Result<Option<StudentRecord>> {
    Ok(match self {
      Self::Sqlite(s) => s.get(id).await?,
      Self::Remote(s) => s.get(id).await?,
    })
  }

  async fn find_by_email(
    &self,
    email:  &EmailAddress,
    status: Option<StudentStatus>,
  ) -> Result<Option<StudentRecord>> {
    Ok(match self {
      Self::Sqlite(s) => s.find_by_email(email, status).await?,
      Self::Remote(s) => s.find_by_email(email, status).await?,
    })
  }

  async fn search(&self, text: &str) -> Result<Vec<StudentRecord>> {
    Ok(match self {
      Self::Sqlite(s) => s.search(text).await?,
      Self::Remote(s) => s.search(text).await?,
    })
  }

  async fn count(&self, filter: CountFilter) -> Result<u64> {
    Ok(match self {
      Self::Sqlite(s) => s.count(filter).await?,
      Self::Remote(s) => s.count(filter).await?,
    })
  }
}

/// Open the configured backend and wire up its collaborators.
///
/// The local backend has no commerce platform or mail function to talk to,
/// so both collaborators are absent there.
pub async fn build_directory(config: &BackendConfig) -> Result<Directory> {
  match config {
    BackendConfig::Local { path: Some(path) } => {
      let path = expand_tilde(path);
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
      }
      info!(path = %path.display(), "opening local student store");
      let store = SqliteStore::open(&path).await?;
      Ok(StudentDirectory::new(Backend::Sqlite(store), None, None))
    }
    BackendConfig::Local { path: None } => {
      info!("opening in-memory student store; records are lost on exit");
      let store = SqliteStore::open_in_memory().await?;
      Ok(StudentDirectory::new(Backend::Sqlite(store), None, None))
    }
    BackendConfig::Remote(remote) => build_remote(remote),
  }
}

fn build_remote(config: &RemoteBackendConfig) -> Result<Directory> {
  let mut credentials = Credentials::new(&config.api_key);
  if let Some(token) = &config.access_token {
    credentials = credentials.with_access_token(token);
  }
  let client = RemoteClient::new(
    RemoteConfig { base_url: config.base_url.clone(), timeout: config.timeout() },
    credentials,
  )?;

  info!(base_url = %config.base_url, table = %config.table, "using remote student store");

  let verifier = config
    .purchase_verify_url
    .as_ref()
    .map(|url| HttpPurchaseVerifier::new(client.clone(), url));
  let notifier = config
    .welcome_function
    .as_ref()
    .map(|function| FunctionNotifier::new(client.clone(), function));

  Ok(StudentDirectory::new(
    Backend::Remote(RemoteStore::new(client, &config.table)),
    verifier,
    notifier,
  ))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

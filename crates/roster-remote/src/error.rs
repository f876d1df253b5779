//! Error type for `roster-remote`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid base url {0:?}")]
  BaseUrl(String),

  #[error("{path} → {status}: {body}")]
  Status {
    path:   String,
    status: StatusCode,
    body:   String,
  },

  /// The insert succeeded but the response carried no row.
  #[error("insert did not return the created record")]
  NotReturned,

  #[error("malformed Content-Range header: {0:?}")]
  ContentRange(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

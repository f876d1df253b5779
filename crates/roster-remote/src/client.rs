//! Shared HTTP client carrying the backend's base URL and credentials.

use std::{fmt, time::Duration};

use reqwest::{Client, RequestBuilder, Response};

use crate::{Error, Result};

/// API credentials for the hosted backend, passed in once at startup.
#[derive(Clone)]
pub struct Credentials {
  /// Project key, sent as the `apikey` header on every request.
  pub api_key:      String,
  /// Signed-in administrator's token. Without one, requests authenticate with
  /// the project key alone.
  pub access_token: Option<String>,
}

impl Credentials {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self { api_key: api_key.into(), access_token: None }
  }

  pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
    self.access_token = Some(token.into());
    self
  }

  fn bearer(&self) -> &str { self.access_token.as_deref().unwrap_or(&self.api_key) }
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("api_key", &"<redacted>")
      .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
  /// Project root, e.g. `https://abc.example.co`.
  pub base_url: String,
  /// Request timeout; `None` keeps the transport default.
  pub timeout:  Option<Duration>,
}

/// Async HTTP client for the hosted backend.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct RemoteClient {
  http:        Client,
  base_url:    String,
  credentials: Credentials,
}

impl RemoteClient {
  pub fn new(config: RemoteConfig, credentials: Credentials) -> Result<Self> {
    let base_url = config.base_url.trim_end_matches('/').to_owned();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
      return Err(Error::BaseUrl(config.base_url));
    }

    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
      builder = builder.timeout(timeout);
    }

    Ok(Self { http: builder.build()?, base_url, credentials })
  }

  /// `{base}/rest/v1/{table}`
  pub(crate) fn rest_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{table}", self.base_url)
  }

  /// `{base}/functions/v1/{name}`
  pub(crate) fn function_url(&self, name: &str) -> String {
    format!("{}/functions/v1/{name}", self.base_url)
  }

  pub(crate) fn http(&self) -> &Client { &self.http }

  /// Attach the `apikey` and bearer headers.
  pub(crate) fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    req
      .header("apikey", &self.credentials.api_key)
      .bearer_auth(self.credentials.bearer())
  }
}

/// Pass successful responses through; turn anything else into
/// [`Error::Status`] with the response body attached.
pub(crate) async fn check(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let path = resp.url().path().to_owned();
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { path, status, body })
}

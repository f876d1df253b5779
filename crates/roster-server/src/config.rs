//! Server configuration, deserialised from `config.toml` and `ROSTER_*`
//! environment variables.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:    String,
  #[serde(default = "default_port")]
  pub port:    u16,
  #[serde(default)]
  pub backend: BackendConfig,
}

/// Which [`StudentStore`](roster_core::store::StudentStore) to run against.
/// Chosen once, at startup.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
  /// SQLite at `path`, or an in-memory database that lives as long as the
  /// process when `path` is absent.
  Local {
    #[serde(default)]
    path: Option<PathBuf>,
  },
  /// The hosted table API, plus its optional collaborators.
  Remote(RemoteBackendConfig),
}

impl Default for BackendConfig {
  fn default() -> Self { Self::Local { path: None } }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RemoteBackendConfig {
  pub base_url:            String,
  pub api_key:             String,
  pub access_token:        Option<String>,
  #[serde(default = "default_table")]
  pub table:               String,
  /// Verification endpoint: an absolute URL or a hosted function name.
  /// Without one, purchase checks always answer "no purchase".
  pub purchase_verify_url: Option<String>,
  /// Hosted function that sends the welcome email. Without one, no email is
  /// sent.
  pub welcome_function:    Option<String>,
  pub timeout_secs:        Option<u64>,
}

impl RemoteBackendConfig {
  pub fn timeout(&self) -> Option<Duration> { self.timeout_secs.map(Duration::from_secs) }
}

impl ServerConfig {
  /// Layer `path` (optional) under `ROSTER_`-prefixed environment variables.
  /// Nested keys use `__`, e.g. `ROSTER_BACKEND__KIND=remote`.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.into()).required(false))
      .add_source(
        config::Environment::with_prefix("ROSTER")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_table() -> String { roster_remote::DEFAULT_TABLE.to_owned() }

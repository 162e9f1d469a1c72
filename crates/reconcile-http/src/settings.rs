//! Server configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `RECONCILE_*` environment variables (e.g. `RECONCILE_PORT=8080`).

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl ServerConfig {
  /// Load configuration, treating a missing `path` as empty.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 3000_i64)?
      .set_default("store_path", "reconcile.db")?
      .add_source(File::from(path).required(false))
      .add_source(Environment::with_prefix("RECONCILE"))
      .build()?
      .try_deserialize()
  }

  /// `host:port`, suitable for binding a listener.
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The store path with a leading `~/` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

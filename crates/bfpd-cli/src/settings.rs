//! Runtime configuration, deserialised from `config.toml` and `BFPD_*`
//! environment variables.

use std::path::PathBuf;

use bfpd_ingest::IngestConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path: PathBuf,
  pub host:       String,
  pub port:       u16,
  /// Path prefix the query API is mounted under, without slashes.
  pub api_root:   String,
  pub ingest:     IngestConfig,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      store_path: PathBuf::from("~/.local/share/bfpd/foods.db"),
      host:       "127.0.0.1".to_string(),
      port:       8000,
      api_root:   "v1".to_string(),
      ingest:     IngestConfig::default(),
    }
  }
}

impl AppConfig {
  /// Layer the optional TOML file under `BFPD_*` variables.
  ///
  /// Nested keys use a double underscore, e.g. `BFPD_INGEST__NAMESPACE`.
  pub fn load(file: PathBuf) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("BFPD")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_gives_defaults() {
    let cfg = AppConfig::load(PathBuf::from("/nonexistent/bfpd.toml")).unwrap();
    assert_eq!(cfg.api_root, "v1");
    assert_eq!(cfg.ingest.namespace, "gnutdata");
    assert_eq!(cfg.ingest.dictionary_limit, 500);
    assert!(!cfg.ingest.has_headers);
  }

  #[test]
  fn toml_overrides_nested_ingest_table() {
    let cfg: AppConfig = config::Config::builder()
      .add_source(config::File::from_str(
        r#"
          port = 9090
          store_path = "/tmp/foods.db"

          [ingest]
          has_headers = true
          max_conflict_retries = 2
        "#,
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();

    assert_eq!(cfg.port, 9090);
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/foods.db"));
    assert!(cfg.ingest.has_headers);
    assert_eq!(cfg.ingest.max_conflict_retries, 2);
    assert_eq!(cfg.ingest.channel_capacity, 1024);
    assert_eq!(cfg.host, "127.0.0.1");
  }
}

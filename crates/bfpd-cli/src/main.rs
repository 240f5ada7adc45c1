//! `bfpd` binary: ingest the Branded Food Products CSVs and serve them.
//!
//! Reads `config.toml` (or the path given with `--config`) and opens the
//! SQLite store named there.
//!
//! ```text
//! bfpd dictionary nutrients nutrient.csv
//! bfpd dictionary derivations food_nutrient_derivation.csv
//! bfpd ingest --root ./FoodData_Central_branded_food_csv
//! bfpd serve
//! ```

mod settings;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use bfpd_ingest::DictionaryKind;
use bfpd_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::AppConfig;

#[derive(Parser)]
#[command(author, version, about = "USDA Branded Food Products ingest and query service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load food.csv, then branded_food.csv and food_nutrient.csv together.
  Ingest {
    /// Directory holding the three CSV files.
    #[arg(long, default_value = ".")]
    root: PathBuf,
  },

  /// Replace a reference dictionary from its CSV file.
  Dictionary {
    kind: DictionaryArg,
    file: PathBuf,
  },

  /// Serve the JSON query API.
  Serve,
}

#[derive(Clone, Copy, ValueEnum)]
enum DictionaryArg {
  Nutrients,
  Derivations,
}

impl From<DictionaryArg> for DictionaryKind {
  fn from(arg: DictionaryArg) -> Self {
    match arg {
      DictionaryArg::Nutrients => DictionaryKind::Nutrients,
      DictionaryArg::Derivations => DictionaryKind::Derivations,
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = AppConfig::load(cli.config).context("failed to read configuration")?;

  let store_path = expand_tilde(&cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  match cli.command {
    Command::Ingest { root } => {
      let report = bfpd_ingest::process_files(&root, store, &cfg.ingest)
        .await
        .with_context(|| format!("primary pass over {root:?} failed"))?;
      let counts = report.into_result().context("ingest finished with errors")?;
      println!("{}", serde_json::to_string_pretty(&counts)?);
    }

    Command::Dictionary { kind, file } => {
      let written =
        bfpd_ingest::dictionaries::import(kind.into(), &file, store.as_ref(), &cfg.ingest)
          .await
          .with_context(|| format!("failed to import {file:?}"))?;
      tracing::info!(written, "dictionary import complete");
    }

    Command::Serve => {
      let app = app(store, &cfg.api_root);
      let address = format!("{}:{}", cfg.host, cfg.port);

      tracing::info!("Listening on http://{address}/{}", cfg.api_root);
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }
  }

  Ok(())
}

/// Mount the query API under `/{api_root}` with request tracing.
fn app(store: Arc<SqliteStore>, api_root: &str) -> Router {
  let api = bfpd_api::api_router(store);
  let root = api_root.trim_matches('/');
  let router = if root.is_empty() {
    Router::new().merge(api)
  } else {
    Router::new().nest(&format!("/{root}"), api)
  };
  router.layer(TraceLayer::new_for_http())
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

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;

  use super::*;

  async fn status(api_root: &str, uri: &str) -> StatusCode {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let req = Request::get(uri).body(Body::empty()).unwrap();
    app(store, api_root).oneshot(req).await.unwrap().status()
  }

  #[tokio::test]
  async fn api_is_nested_under_root() {
    assert_eq!(status("v1", "/v1/count/FOOD").await, StatusCode::OK);
    assert_eq!(status("/v2/", "/v2/count/FOOD").await, StatusCode::OK);
    assert_eq!(status("v1", "/count/FOOD").await, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn empty_root_mounts_at_top_level() {
    assert_eq!(status("", "/count/FOOD").await, StatusCode::OK);
  }

  #[test]
  fn tilde_expands_to_home() {
    let home = std::env::var("HOME").unwrap();
    assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(home).join("x.db"));
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
  }

  #[test]
  fn cli_parses_subcommands() {
    let cli = Cli::try_parse_from(["bfpd", "dictionary", "derivations", "d.csv"]).unwrap();
    assert!(matches!(
      cli.command,
      Command::Dictionary { kind: DictionaryArg::Derivations, .. }
    ));

    let cli = Cli::try_parse_from(["bfpd", "ingest", "--root", "/data", "-c", "x.toml"]).unwrap();
    assert_eq!(cli.config, PathBuf::from("x.toml"));
    assert!(matches!(cli.command, Command::Ingest { root } if root == Path::new("/data")));
  }
}

//! Error type for `bfpd-ingest`.

use std::path::PathBuf;

use thiserror::Error;

use crate::Stage;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot open {path:?}: {source}")]
  Open {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  /// A row too short to hold a positional column.
  #[error("{file}: line {line} has no column {index}")]
  MissingColumn {
    file:  &'static str,
    line:  u64,
    index: usize,
  },

  /// A reference row that cannot be imported.
  #[error("{file}: line {line}: malformed {field}: {value:?}")]
  MalformedField {
    file:  &'static str,
    line:  u64,
    field: &'static str,
    value: String,
  },

  #[error("dictionary error: {0}")]
  Dictionary(#[from] bfpd_core::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// Every compare-and-swap attempt for one group lost to another writer.
  #[error("gave up writing {fdc_id} after {attempts} conflicting attempts")]
  Conflict { fdc_id: String, attempts: u32 },

  #[error("{stage} task failed: {source}")]
  Task {
    stage:  Stage,
    #[source]
    source: tokio::task::JoinError,
  },
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `bfpd-store-sqlite`.

use bfpd_core::DocType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A stored revision did not fit the unsigned revision type.
  #[error("invalid stored revision: {0}")]
  InvalidRevision(i64),

  #[error("revision {0} does not fit a SQLite integer")]
  RevisionOverflow(u64),

  #[error("no {doctype} dictionary in namespace {namespace:?}")]
  UnknownDictionary { namespace: String, doctype: DocType },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

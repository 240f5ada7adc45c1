//! Error types for `bfpd-core`.

use thiserror::Error;

use crate::DocType;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed {doctype} dictionary entry at index {index}: {source}")]
  MalformedDictionaryEntry {
    doctype: DocType,
    index:   usize,
    #[source]
    source:  serde_json::Error,
  },

  #[error("duplicate {doctype} dictionary code: {code}")]
  DuplicateDictionaryCode { doctype: DocType, code: u32 },

  #[error("unknown document type: {0:?}")]
  UnknownDocType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

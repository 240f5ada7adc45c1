//! Streaming CSV input.
//!
//! Parsing runs on tokio's blocking pool and hands records to the loader over
//! a bounded channel, so a slow store throttles the file read. Columns are
//! addressed by position; there is no header matching.
//!
//! Fields are not required to be UTF-8. Invalid bytes are replaced with
//! U+FFFD and logged; only structural CSV errors end a stream.

use std::{borrow::Cow, fs::File, path::Path, str::FromStr};

use csv::{ByteRecord, StringRecord};
use tokio::sync::mpsc;
use tracing::warn;

use crate::{Error, IngestConfig, Result};

// ─── Record stream ───────────────────────────────────────────────────────────

/// Records of one input file, in file order.
pub(crate) struct Records {
  file: &'static str,
  rx:   mpsc::Receiver<csv::Result<StringRecord>>,
}

/// Open `path` and start parsing it in the background.
///
/// The open happens here, synchronously, so a missing file is reported
/// before any row is processed. The first CSV error ends the stream.
pub(crate) fn open(
  path: &Path,
  file: &'static str,
  config: &IngestConfig,
) -> Result<Records> {
  let handle = File::open(path).map_err(|source| Error::Open {
    path: path.to_path_buf(),
    source,
  })?;
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(config.has_headers)
    .from_reader(handle);

  let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
  tokio::task::spawn_blocking(move || {
    for result in reader.byte_records() {
      let fatal = result.is_err();
      let result = result.map(|record| decode(&record, file));
      // A closed channel means the loader has stopped listening.
      if tx.blocking_send(result).is_err() || fatal {
        break;
      }
    }
  });

  Ok(Records { file, rx })
}

/// Convert a raw record to text, replacing invalid UTF-8 per field.
fn decode(record: &ByteRecord, file: &'static str) -> StringRecord {
  let mut decoded = StringRecord::with_capacity(record.as_slice().len(), record.len());
  for (column, raw) in record.iter().enumerate() {
    let field = String::from_utf8_lossy(raw);
    if let Cow::Owned(_) = field {
      let line = record.position().map_or(0, csv::Position::line);
      warn!(
        file,
        line,
        column,
        id = %String::from_utf8_lossy(record.get(0).unwrap_or_default()),
        value = %field,
        "invalid UTF-8 in field, replaced"
      );
    }
    decoded.push_field(&field);
  }
  decoded.set_position(record.position().cloned());
  decoded
}

impl Records {
  pub(crate) fn file(&self) -> &'static str { self.file }

  /// The next record, `None` at end of input.
  pub(crate) async fn next(&mut self) -> Option<Result<StringRecord>> {
    self.rx.recv().await.map(|r| r.map_err(Error::from))
  }
}

// ─── Positional access ───────────────────────────────────────────────────────

/// A record plus the file it came from, for error context.
pub(crate) struct Row<'r> {
  record: &'r StringRecord,
  file:   &'static str,
}

impl<'r> Row<'r> {
  pub(crate) fn new(record: &'r StringRecord, file: &'static str) -> Self {
    Self { record, file }
  }

  pub(crate) fn line(&self) -> u64 {
    self.record.position().map_or(0, csv::Position::line)
  }

  /// The value at `index`; a short row is a structural error.
  pub(crate) fn get(&self, index: usize) -> Result<&'r str> {
    self.record.get(index).ok_or_else(|| Error::MissingColumn {
      file: self.file,
      line: self.line(),
      index,
    })
  }

  /// Parse the value at `index`, failing on malformed input.
  pub(crate) fn parse<T: FromStr>(&self, index: usize, field: &'static str) -> Result<T> {
    let raw = self.get(index)?;
    raw.trim().parse().map_err(|_| Error::MalformedField {
      file: self.file,
      line: self.line(),
      field,
      value: raw.to_owned(),
    })
  }
}

/// Parse a data field, logging and falling back to zero on failure.
///
/// Sparse data-quality issues in the source must not stop a load; the
/// identifier and field name are logged so the row can be found later.
pub(crate) fn parse_or_zero<T>(raw: &str, fdc_id: &str, field: &'static str) -> T
where
  T: FromStr + Default,
{
  let trimmed = raw.trim();
  match trimmed.parse() {
    Ok(v) => v,
    Err(_) if trimmed.is_empty() => {
      tracing::debug!(fdc_id, field, "empty value, using zero");
      T::default()
    }
    Err(_) => {
      tracing::warn!(fdc_id, field, value = raw, "can't parse value, using zero");
      T::default()
    }
  }
}

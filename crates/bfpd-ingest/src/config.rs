//! Ingest tuning knobs, deserialised from the `[ingest]` config table.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
  /// Store namespace holding the reference dictionaries.
  pub namespace:            String,
  /// Page size used when fetching each dictionary.
  pub dictionary_limit:     usize,
  /// Skip the first row of every input file.
  pub has_headers:          bool,
  /// Re-read attempts after a conflicting concurrent write, per group.
  pub max_conflict_retries: u32,
  /// Parsed rows buffered between the CSV thread and the loader.
  pub channel_capacity:     usize,
}

impl Default for IngestConfig {
  fn default() -> Self {
    Self {
      namespace:            "gnutdata".to_owned(),
      dictionary_limit:     500,
      has_headers:          false,
      max_conflict_retries: 8,
      channel_capacity:     1024,
    }
  }
}

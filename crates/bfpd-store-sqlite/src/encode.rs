//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Documents are stored as compact JSON. Revisions are SQLite `INTEGER`s and
//! must be non-negative.

use bfpd_core::{food::Food, store::Versioned};

use crate::{Error, Result};

// ─── Food ─────────────────────────────────────────────────────────────────────

pub fn encode_food(food: &Food) -> Result<String> { Ok(serde_json::to_string(food)?) }

pub fn decode_food(s: &str) -> Result<Food> { Ok(serde_json::from_str(s)?) }

// ─── Revision ────────────────────────────────────────────────────────────────

pub fn encode_revision(revision: u64) -> Result<i64> {
  i64::try_from(revision).map_err(|_| Error::RevisionOverflow(revision))
}

pub fn decode_revision(raw: i64) -> Result<u64> {
  u64::try_from(raw).map_err(|_| Error::InvalidRevision(raw))
}

/// `COUNT(*)` results are never negative.
pub fn decode_count(raw: i64) -> u64 { u64::try_from(raw).unwrap_or_default() }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `documents` row.
pub struct RawDocument {
  pub body:     String,
  pub revision: i64,
}

impl RawDocument {
  pub fn into_versioned(self) -> Result<Versioned<Food>> {
    Ok(Versioned {
      revision: decode_revision(self.revision)?,
      doc:      decode_food(&self.body)?,
    })
  }

  pub fn into_food(self) -> Result<Food> { decode_food(&self.body) }
}

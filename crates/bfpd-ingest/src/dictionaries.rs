//! Reference dictionaries: fetched from the store for the nutrients pass, and
//! imported into the store from their CSV files.

use std::path::Path;

use bfpd_core::{
  DocType,
  dictionary::{DerivationInfo, DerivationMap, NutrientInfo, NutrientMap},
  store::{DictionaryEntry, DocumentStore},
};
use tracing::info;

use crate::{
  Error, IngestConfig, Result,
  reader::{self, Row},
};

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// Read-only snapshot of both dictionaries for one ingest run.
#[derive(Debug, Clone, Default)]
pub struct Dictionaries {
  pub nutrients:   NutrientMap,
  pub derivations: DerivationMap,
}

impl Dictionaries {
  /// Fetch and validate both dictionaries. Fails if either is missing or has
  /// a malformed entry.
  pub async fn load<S: DocumentStore>(store: &S, namespace: &str, limit: usize) -> Result<Self> {
    let raw = store
      .get_dictionary(namespace, DocType::Nutrient, 0, limit)
      .await
      .map_err(Error::store)?;
    let nutrients = NutrientMap::from_documents(raw)?;

    let raw = store
      .get_dictionary(namespace, DocType::Derivation, 0, limit)
      .await
      .map_err(Error::store)?;
    let derivations = DerivationMap::from_documents(raw)?;

    info!(
      nutrients = nutrients.len(),
      derivations = derivations.len(),
      "dictionaries loaded"
    );
    Ok(Self { nutrients, derivations })
  }
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// Which reference file is being imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryKind {
  /// `nutrient.csv`: id, name, unit, nutrient number.
  Nutrients,
  /// `food_nutrient_derivation.csv`: id, code, description.
  Derivations,
}

impl DictionaryKind {
  pub fn doctype(self) -> DocType {
    match self {
      Self::Nutrients => DocType::Nutrient,
      Self::Derivations => DocType::Derivation,
    }
  }

  fn file_label(self) -> &'static str {
    match self {
      Self::Nutrients => "nutrient dictionary",
      Self::Derivations => "derivation dictionary",
    }
  }

  fn entry(self, row: &Row<'_>) -> Result<DictionaryEntry> {
    match self {
      Self::Nutrients => {
        let info = NutrientInfo {
          id:         row.parse(0, "nutrient id")?,
          name:       row.get(1)?.to_owned(),
          unit:       row.get(2)?.to_owned(),
          nutrientno: row.parse(3, "nutrient number")?,
        };
        Ok(DictionaryEntry { code: info.id, body: serde_json::to_value(&info)? })
      }
      Self::Derivations => {
        let info = DerivationInfo {
          id:          row.parse(0, "derivation id")?,
          code:        row.get(1)?.to_owned(),
          description: row.get(2)?.to_owned(),
        };
        Ok(DictionaryEntry { code: info.id, body: serde_json::to_value(&info)? })
      }
    }
  }
}

/// Replace one dictionary in the store with the contents of a CSV file.
///
/// Unlike the data files, a reference row that does not parse fails the
/// whole import. Returns the number of entries written.
pub async fn import<S: DocumentStore>(
  kind: DictionaryKind,
  path: &Path,
  store: &S,
  config: &IngestConfig,
) -> Result<usize> {
  let mut records = reader::open(path, kind.file_label(), config)?;

  let mut entries = Vec::new();
  while let Some(record) = records.next().await {
    let record = record?;
    entries.push(kind.entry(&Row::new(&record, kind.file_label()))?);
  }

  let written = store
    .put_dictionary(&config.namespace, kind.doctype(), entries)
    .await
    .map_err(Error::store)?;
  info!(doctype = %kind.doctype(), written, "dictionary imported");
  Ok(written)
}

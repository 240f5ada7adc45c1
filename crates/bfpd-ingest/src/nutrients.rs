//! Nutrients pass over `food_nutrient.csv`.
//!
//! | Column | Field |
//! |--------|-------|
//! | 1 | FDC id |
//! | 2 | nutrient id |
//! | 3 | amount |
//! | 5 | derivation id |

use std::path::Path;

use bfpd_core::{
  food::{Food, NutrientData},
  store::DocumentStore,
};
use tracing::{info, warn};

use crate::{
  Counts, Dictionaries, IngestConfig, NUTRIENTS_FILE, Result,
  group::{self, GroupRows, Patch},
  reader::{self, Row, parse_or_zero},
};

const PROGRESS_EVERY: u64 = 30_000;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct NutrientsPatch {
  nutrients: Vec<NutrientData>,
}

impl Patch for NutrientsPatch {
  fn apply(&self, food: &mut Food) { food.nutrients.clone_from(&self.nutrients); }
}

struct NutrientRows<'c> {
  counts:       &'c Counts,
  dictionaries: &'c Dictionaries,
}

impl NutrientRows<'_> {
  /// Build one resolved nutrient entry from its raw fields.
  fn resolve(&self, fdc_id: &str, code: u32, value: f32, derivation: u32) -> NutrientData {
    let derivation = self.dictionaries.derivations.resolve(derivation);

    match self.dictionaries.nutrients.get(code) {
      Some(info) => NutrientData {
        nutrient_no: info.nutrientno,
        value,
        nutrient: info.name.clone(),
        unit: info.unit.clone(),
        derivation,
      },
      None => {
        warn!(fdc_id, code, "nutrient code not in dictionary");
        NutrientData {
          nutrient_no: 0,
          value,
          nutrient: String::new(),
          unit: String::new(),
          derivation,
        }
      }
    }
  }
}

impl GroupRows for NutrientRows<'_> {
  type Patch = NutrientsPatch;

  const ID_COLUMN: usize = 1;

  fn begin(&mut self, _fdc_id: &str, _row: &Row<'_>) -> Result<NutrientsPatch> {
    Ok(NutrientsPatch::default())
  }

  fn push(&mut self, patch: &mut NutrientsPatch, fdc_id: &str, row: &Row<'_>) -> Result<()> {
    let value = parse_or_zero(row.get(3)?, fdc_id, "nutrient value");
    let code = parse_or_zero(row.get(2)?, fdc_id, "nutrient code");
    let derivation = parse_or_zero(row.get(5)?, fdc_id, "derivation code");

    patch.nutrients.push(self.resolve(fdc_id, code, value, derivation));

    let n = self.counts.add_nutrient();
    if n % PROGRESS_EVERY == 0 {
      info!(nutrients = n, "nutrients progress");
    }
    Ok(())
  }
}

/// Attach resolved nutrient values to existing foods.
///
/// Both dictionaries are fetched before the file is opened; if either fetch
/// fails no row is processed. Returns the number of rows processed.
pub async fn load<S: DocumentStore>(
  path: &Path,
  store: &S,
  counts: &Counts,
  config: &IngestConfig,
) -> Result<u64> {
  let dictionaries = Dictionaries::load(store, &config.namespace, config.dictionary_limit).await?;
  let mut records = reader::open(path, NUTRIENTS_FILE, config)?;
  let mut rows = NutrientRows { counts, dictionaries: &dictionaries };

  let stats = group::run(&mut records, store, &mut rows, config.max_conflict_retries).await?;
  info!(rows = stats.rows, foods = stats.groups, "nutrients loaded");
  Ok(stats.rows)
}

//! Servings pass over `branded_food.csv`.
//!
//! | Column | Field |
//! |--------|-------|
//! | 0 | FDC id |
//! | 1 | manufacturer |
//! | 2 | UPC |
//! | 3 | ingredients |
//! | 4 | serving amount |
//! | 5 | nutrient basis |
//! | 6 | serving description |
//! | 7 | food group description |
//! | 8 | data source |

use std::path::Path;

use bfpd_core::{
  food::{Food, FoodGroup, Serving},
  store::DocumentStore,
};
use tracing::info;

use crate::{
  Counts, IngestConfig, Result, SERVINGS_FILE,
  group::{self, GroupRows, Patch},
  reader::{self, Row, parse_or_zero},
};

const PROGRESS_EVERY: u64 = 10_000;

/// Everything the servings pass writes on a food.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ServingsPatch {
  pub(crate) manufacturer: String,
  pub(crate) upc:          String,
  pub(crate) ingredients:  String,
  pub(crate) source:       String,
  pub(crate) group:        Option<FoodGroup>,
  pub(crate) servings:     Vec<Serving>,
}

impl Patch for ServingsPatch {
  fn apply(&self, food: &mut Food) {
    food.manufacturer.clone_from(&self.manufacturer);
    food.upc.clone_from(&self.upc);
    food.ingredients.clone_from(&self.ingredients);
    food.source.clone_from(&self.source);
    food.group.clone_from(&self.group);
    food.servings.clone_from(&self.servings);
  }
}

struct ServingRows<'c> {
  counts:        &'c Counts,
  /// Last food group id handed out in this pass.
  last_group_id: i32,
}

impl GroupRows for ServingRows<'_> {
  type Patch = ServingsPatch;

  const ID_COLUMN: usize = 0;

  fn begin(&mut self, _fdc_id: &str, row: &Row<'_>) -> Result<ServingsPatch> {
    let group_description = row.get(7)?;
    let group = if group_description.is_empty() {
      None
    } else {
      self.last_group_id += 1;
      Some(FoodGroup::new(self.last_group_id, group_description))
    };

    Ok(ServingsPatch {
      manufacturer: row.get(1)?.to_owned(),
      upc:          row.get(2)?.to_owned(),
      ingredients:  row.get(3)?.to_owned(),
      source:       row.get(8)?.to_owned(),
      group,
      servings:     Vec::new(),
    })
  }

  fn push(&mut self, patch: &mut ServingsPatch, fdc_id: &str, row: &Row<'_>) -> Result<()> {
    patch.servings.push(Serving {
      nutrient_basis: row.get(5)?.to_owned(),
      description:    row.get(6)?.to_owned(),
      amount:         parse_or_zero(row.get(4)?, fdc_id, "serving amount"),
    });

    let n = self.counts.add_serving();
    if n % PROGRESS_EVERY == 0 {
      info!(servings = n, "servings progress");
    }
    Ok(())
  }
}

/// Attach servings, manufacturer details and food group to existing foods.
///
/// Returns the number of rows processed. Aborts on the first read, store or
/// structural error; malformed amounts are logged and stored as zero.
pub async fn load<S: DocumentStore>(
  path: &Path,
  store: &S,
  counts: &Counts,
  config: &IngestConfig,
) -> Result<u64> {
  let mut records = reader::open(path, SERVINGS_FILE, config)?;
  let mut rows = ServingRows { counts, last_group_id: 0 };

  let stats = group::run(&mut records, store, &mut rows, config.max_conflict_retries).await?;
  info!(rows = stats.rows, foods = stats.groups, groups = rows.last_group_id, "servings loaded");
  Ok(stats.rows)
}

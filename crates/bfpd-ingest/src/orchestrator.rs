//! Runs the three passes in order: foods first, then servings and nutrients
//! side by side.

use std::{path::Path, sync::Arc};

use bfpd_core::{DocType, store::DocumentStore};
use tokio::task::JoinError;
use tracing::{error, info};

use crate::{
  Counts, CountsSnapshot, Error, FOODS_FILE, IngestConfig, NUTRIENTS_FILE,
  Result, SERVINGS_FILE, Stage, foods, nutrients, servings,
};

/// Outcome of a run whose primary pass succeeded.
///
/// Each secondary stage succeeds or fails on its own; a failed stage leaves
/// the other one's data in place.
#[derive(Debug)]
pub struct IngestReport {
  pub counts:    CountsSnapshot,
  pub servings:  Result<u64>,
  pub nutrients: Result<u64>,
}

impl IngestReport {
  pub fn is_complete(&self) -> bool { self.servings.is_ok() && self.nutrients.is_ok() }

  /// Collapse to the counts, or the last stage error seen.
  pub fn into_result(self) -> Result<CountsSnapshot> {
    let mut last = None;
    if let Err(e) = self.servings {
      last = Some(e);
    }
    if let Err(e) = self.nutrients {
      last = Some(e);
    }
    match last {
      Some(e) => Err(e),
      None => Ok(self.counts),
    }
  }
}

/// Ingest `food.csv`, `branded_food.csv` and `food_nutrient.csv` from `root`.
///
/// A failed primary pass is returned as `Err` and nothing else runs. After
/// that, both secondary stages always run to completion and their outcomes
/// are reported in the [`IngestReport`].
pub async fn process_files<S>(
  root: &Path,
  store: Arc<S>,
  config: &IngestConfig,
) -> Result<IngestReport>
where
  S: DocumentStore + 'static,
{
  let counts = Arc::new(Counts::default());

  let foods = foods::load(&root.join(FOODS_FILE), store.as_ref(), DocType::Food, &counts, config)
    .await
    .inspect_err(|e| error!(stage = %Stage::Foods, error = %e, "primary pass failed"))?;
  info!(foods, "primary pass complete, starting servings and nutrients");

  let servings = tokio::spawn({
    let path = root.join(SERVINGS_FILE);
    let store = Arc::clone(&store);
    let counts = Arc::clone(&counts);
    let config = config.clone();
    async move { servings::load(&path, store.as_ref(), &counts, &config).await }
  });

  let nutrients = tokio::spawn({
    let path = root.join(NUTRIENTS_FILE);
    let store = Arc::clone(&store);
    let counts = Arc::clone(&counts);
    let config = config.clone();
    async move { nutrients::load(&path, store.as_ref(), &counts, &config).await }
  });

  let (servings, nutrients) = tokio::join!(servings, nutrients);
  let servings = settle(Stage::Servings, servings);
  let nutrients = settle(Stage::Nutrients, nutrients);

  let counts = counts.snapshot();
  info!(
    foods = counts.foods,
    servings = counts.servings,
    nutrients = counts.nutrients,
    "ingest finished"
  );

  Ok(IngestReport { counts, servings, nutrients })
}

/// Flatten a joined stage result and log how it ended.
fn settle(stage: Stage, joined: Result<Result<u64>, JoinError>) -> Result<u64> {
  let outcome = joined
    .map_err(|source| Error::Task { stage, source })
    .and_then(std::convert::identity);
  match &outcome {
    Ok(rows) => info!(%stage, rows, "stage complete"),
    Err(e) => error!(%stage, error = %e, "stage failed"),
  }
  outcome
}

//! Run-scoped row counters shared by the three loaders.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Rows processed so far in one ingest run.
///
/// Loaders bump these concurrently; only the totals read after both
/// secondary stages finish are meaningful.
#[derive(Debug, Default)]
pub struct Counts {
  foods:     AtomicU64,
  servings:  AtomicU64,
  nutrients: AtomicU64,
}

impl Counts {
  /// Count one primary row; returns the running total.
  pub fn add_food(&self) -> u64 { self.foods.fetch_add(1, Ordering::Relaxed) + 1 }

  pub fn add_serving(&self) -> u64 { self.servings.fetch_add(1, Ordering::Relaxed) + 1 }

  pub fn add_nutrient(&self) -> u64 { self.nutrients.fetch_add(1, Ordering::Relaxed) + 1 }

  pub fn snapshot(&self) -> CountsSnapshot {
    CountsSnapshot {
      foods:     self.foods.load(Ordering::Relaxed),
      servings:  self.servings.load(Ordering::Relaxed),
      nutrients: self.nutrients.load(Ordering::Relaxed),
    }
  }
}

/// Plain copy of [`Counts`] for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountsSnapshot {
  pub foods:     u64,
  pub servings:  u64,
  pub nutrients: u64,
}

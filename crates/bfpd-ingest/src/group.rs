//! Streaming group-join shared by the servings and nutrients loaders.
//!
//! Rows for one identifier must be contiguous in the input. Each run of rows
//! is folded into a [`Patch`] in memory and written once, when the identifier
//! changes or the input ends.
//!
//! Both secondary loaders run at the same time and may touch the same food.
//! A flush is therefore a compare-and-swap against the revision read when the
//! group started; on conflict the food is re-read and the patch re-applied,
//! so neither loader can overwrite the other's fields with stale data.

use bfpd_core::{
  food::Food,
  store::{DocumentStore, Versioned},
};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  reader::{Records, Row},
};

// ─── Patch ───────────────────────────────────────────────────────────────────

/// The fields one loader owns on a food, accumulated for a single group.
pub(crate) trait Patch {
  /// Overwrite this loader's fields on `food`. Must be repeatable.
  fn apply(&self, food: &mut Food);
}

/// How a loader turns rows into a [`Patch`].
pub(crate) trait GroupRows {
  type Patch: Patch + Send + Sync;

  /// Column holding the join identifier.
  const ID_COLUMN: usize;

  /// Start a new group from its first row.
  fn begin(&mut self, fdc_id: &str, row: &Row<'_>) -> Result<Self::Patch>;

  /// Fold one row (including the first) into the group.
  fn push(&mut self, patch: &mut Self::Patch, fdc_id: &str, row: &Row<'_>) -> Result<()>;
}

// ─── Group ───────────────────────────────────────────────────────────────────

/// One run of contiguous rows sharing an identifier.
pub(crate) struct Group<P> {
  pub(crate) fdc_id: String,
  pub(crate) base:   Option<Versioned<Food>>,
  pub(crate) patch:  P,
}

impl<P: Patch> Group<P> {
  /// Fetch the food this group will be merged into.
  pub(crate) async fn start<S: DocumentStore>(
    store: &S,
    fdc_id: &str,
    patch: P,
  ) -> Result<Self> {
    let base = store.get(fdc_id).await.map_err(Error::store)?;
    if base.is_none() {
      warn!(fdc_id, "no primary record for this food, creating it");
    }
    Ok(Self { fdc_id: fdc_id.to_owned(), base, patch })
  }

  /// Write the patched food, retrying on conflicting concurrent writes.
  pub(crate) async fn flush<S: DocumentStore>(self, store: &S, max_retries: u32) -> Result<()> {
    let Self { fdc_id, mut base, patch } = self;

    for attempt in 0..=max_retries {
      let (mut food, expected) = match base {
        Some(v) => (v.doc, Some(v.revision)),
        None => (Food::new(fdc_id.as_str()), None),
      };
      patch.apply(&mut food);

      let written = store
        .compare_and_swap(&fdc_id, &food, expected)
        .await
        .map_err(Error::store)?;
      if written.is_some() {
        return Ok(());
      }

      debug!(fdc_id, attempt, "concurrent write, re-reading food");
      base = store.get(&fdc_id).await.map_err(Error::store)?;
    }

    Err(Error::Conflict { fdc_id, attempts: max_retries + 1 })
  }
}

// ─── Driver ──────────────────────────────────────────────────────────────────

/// Totals for one group-join pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GroupStats {
  pub(crate) rows:   u64,
  pub(crate) groups: u64,
}

/// Drain `records`, flushing one patch per contiguous run of identifiers.
///
/// The final group is flushed after end of input. Any read, store or
/// structural error aborts the pass.
pub(crate) async fn run<S, G>(
  records: &mut Records,
  store: &S,
  rows: &mut G,
  max_retries: u32,
) -> Result<GroupStats>
where
  S: DocumentStore,
  G: GroupRows + Send,
{
  let file = records.file();
  let mut stats = GroupStats::default();
  let mut current: Option<Group<G::Patch>> = None;

  while let Some(record) = records.next().await {
    let record = record?;
    let row = Row::new(&record, file);
    let fdc_id = row.get(G::ID_COLUMN)?;

    let same_group = current.as_ref().is_some_and(|g| g.fdc_id == fdc_id);
    if !same_group {
      if let Some(done) = current.take() {
        done.flush(store, max_retries).await?;
        stats.groups += 1;
      }
      let patch = rows.begin(fdc_id, &row)?;
      current = Some(Group::start(store, fdc_id, patch).await?);
    }

    if let Some(group) = current.as_mut() {
      rows.push(&mut group.patch, fdc_id, &row)?;
    }
    stats.rows += 1;
  }

  if let Some(done) = current.take() {
    done.flush(store, max_retries).await?;
    stats.groups += 1;
  }

  Ok(stats)
}

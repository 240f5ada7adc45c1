//! Primary pass over `food.csv`.
//!
//! | Column | Field |
//! |--------|-------|
//! | 0 | FDC id |
//! | 2 | description |
//! | 4 | publication date, `YYYY-MM-DD` |

use std::path::Path;

use bfpd_core::{DocType, food::Food, store::DocumentStore};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
  Counts, Error, FOODS_FILE, IngestConfig, Result,
  reader::{self, Row},
};

const PROGRESS_EVERY: u64 = 1_000;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a publication date; `None` (logged) when it is malformed.
fn publication_date(raw: &str, fdc_id: &str) -> Option<NaiveDate> {
  match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
    Ok(d) => Some(d),
    Err(e) => {
      warn!(fdc_id, field = "publication date", value = raw, error = %e, "can't parse date");
      None
    }
  }
}

/// Create one base food document per row, overwriting any existing one.
///
/// Returns the number of rows processed. A malformed date never stops the
/// pass; read, store and structural errors do.
pub async fn load<S: DocumentStore>(
  path: &Path,
  store: &S,
  doc_type: DocType,
  counts: &Counts,
  config: &IngestConfig,
) -> Result<u64> {
  let mut records = reader::open(path, FOODS_FILE, config)?;
  let mut rows = 0;

  while let Some(record) = records.next().await {
    let record = record?;
    let row = Row::new(&record, FOODS_FILE);
    let fdc_id = row.get(0)?;

    let food = Food {
      description: row.get(2)?.to_owned(),
      publication_date: publication_date(row.get(4)?, fdc_id),
      doc_type,
      ..Food::new(fdc_id)
    };
    store.update(fdc_id, &food).await.map_err(Error::store)?;

    rows += 1;
    let n = counts.add_food();
    if n % PROGRESS_EVERY == 0 {
      info!(foods = n, "foods progress");
    }
  }

  info!(rows, "foods loaded");
  Ok(rows)
}

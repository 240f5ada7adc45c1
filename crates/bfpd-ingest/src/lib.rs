//! Ingest pipeline for the USDA Branded Food Products CSV release.
//!
//! Three files are joined on the FDC id into one [`Food`](bfpd_core::food::Food)
//! document per product:
//!
//! 1. `food.csv` creates the base document ([`foods`]),
//! 2. `branded_food.csv` adds manufacturer details and servings ([`servings`]),
//! 3. `food_nutrient.csv` adds dictionary-resolved nutrients ([`nutrients`]).
//!
//! Steps 2 and 3 run concurrently once step 1 has finished; see
//! [`process_files`].

mod group;
mod reader;

pub mod config;
pub mod counts;
pub mod dictionaries;
pub mod error;
pub mod foods;
pub mod nutrients;
pub mod orchestrator;
pub mod servings;

pub use config::IngestConfig;
pub use counts::{Counts, CountsSnapshot};
pub use dictionaries::{Dictionaries, DictionaryKind};
pub use error::{Error, Result};
pub use orchestrator::{IngestReport, process_files};

use strum::Display;

pub const FOODS_FILE: &str = "food.csv";
pub const SERVINGS_FILE: &str = "branded_food.csv";
pub const NUTRIENTS_FILE: &str = "food_nutrient.csv";

/// The three ingest passes, for logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
  Foods,
  Servings,
  Nutrients,
}

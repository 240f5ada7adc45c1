//! Document type tags.
//!
//! Every stored document and dictionary entry carries one of these tags. The
//! string forms are part of the stored JSON and of the `/count/{doctype}`
//! route, so they must not change.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
pub enum DocType {
  /// A branded food aggregate.
  #[serde(rename = "FOOD")]
  #[strum(serialize = "FOOD")]
  Food,
  /// Nutrient dictionary entry.
  #[serde(rename = "NUT")]
  #[strum(serialize = "NUT")]
  Nutrient,
  /// Derivation-method dictionary entry.
  #[serde(rename = "DERV")]
  #[strum(serialize = "DERV")]
  Derivation,
  /// Food group (GPC category).
  #[serde(rename = "FGGPC")]
  #[strum(serialize = "FGGPC")]
  FoodGroup,
}

impl DocType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Food => "FOOD",
      Self::Nutrient => "NUT",
      Self::Derivation => "DERV",
      Self::FoodGroup => "FGGPC",
    }
  }

  /// Parse a tag, mapping failure onto the crate error.
  pub fn parse(s: &str) -> crate::Result<Self> {
    s.parse()
      .map_err(|_| crate::Error::UnknownDocType(s.to_owned()))
  }
}

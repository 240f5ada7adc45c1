//! Response shapes and the query-parameter rules shared by the list routes.

use bfpd_core::food::{Food, FoodMeta, NutrientData, Serving};
use serde::Serialize;
use strum::{Display, EnumString};

use crate::error::ApiError;

/// Largest page a caller may ask for.
pub const MAX_LIST_SIZE: usize = 150;
/// Page size when `max` is absent or not a number.
pub const DEFAULT_LIST_MAX: usize = 50;

// ─── Format ──────────────────────────────────────────────────────────────────

/// How much of a food to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
  #[default]
  Full,
  /// Everything except servings and nutrients.
  Meta,
  /// Only the serving list.
  Servings,
  /// Only the nutrient list.
  Nutrients,
}

impl Format {
  /// Parse an optional `format` value, falling back to `default` when absent.
  pub fn parse(raw: Option<&str>, default: Self) -> Result<Self, ApiError> {
    match raw {
      None | Some("") => Ok(default),
      Some(s) => s.parse().map_err(|_| {
        ApiError::BadRequest(format!(
          "unknown format {s:?}; valid formats are full, meta, servings or nutrients"
        ))
      }),
    }
  }

  pub fn render(self, food: Food) -> FoodView {
    match self {
      Self::Full => FoodView::Full(Box::new(food)),
      Self::Meta => FoodView::Meta(Box::new(food.meta())),
      Self::Servings => FoodView::Servings(food.servings),
      Self::Nutrients => FoodView::Nutrients(food.nutrients),
    }
  }
}

/// A food projected through a [`Format`].
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FoodView {
  Full(Box<Food>),
  Meta(Box<FoodMeta>),
  Servings(Vec<Serving>),
  Nutrients(Vec<NutrientData>),
}

// ─── Paging ──────────────────────────────────────────────────────────────────

/// Validated `max`/`page` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
  pub max:  usize,
  pub page: usize,
}

impl Paging {
  /// Non-numeric values fall back to the defaults; a negative page is 0.
  pub fn parse(max: Option<&str>, page: Option<&str>) -> Result<Self, ApiError> {
    let max = max
      .and_then(|m| m.trim().parse::<i64>().ok())
      .unwrap_or(DEFAULT_LIST_MAX as i64);
    let page = page.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(0);
    Self::new(max, page)
  }

  pub fn new(max: i64, page: i64) -> Result<Self, ApiError> {
    if max < 1 || max > MAX_LIST_SIZE as i64 {
      return Err(ApiError::BadRequest(format!(
        "max parameter {max} must be between 1 and {MAX_LIST_SIZE}"
      )));
    }
    Ok(Self { max: max as usize, page: page.max(0) as usize })
  }

  pub fn offset(self) -> usize { self.page * self.max }
}

// ─── List envelope ───────────────────────────────────────────────────────────

/// Envelope returned by `/browse` and `/search`.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
  /// Items on this page for browse; total hits for search.
  pub count: u64,
  /// The requested page number.
  pub start: usize,
  pub max:   usize,
  pub items: Vec<FoodView>,
}

impl ListResult {
  pub fn new(count: u64, paging: Paging, format: Format, foods: Vec<Food>) -> Self {
    Self {
      count,
      start: paging.page,
      max: paging.max,
      items: foods.into_iter().map(|f| format.render(f)).collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn paging_defaults_and_clamps() {
    assert_eq!(Paging::parse(None, None).unwrap(), Paging { max: 50, page: 0 });
    assert_eq!(Paging::parse(Some("abc"), Some("-3")).unwrap(), Paging {
      max:  DEFAULT_LIST_MAX,
      page: 0,
    });
    assert_eq!(Paging::parse(Some("20"), Some("2")).unwrap().offset(), 40);
    assert!(Paging::parse(Some("151"), None).is_err());
    assert!(Paging::parse(Some("0"), None).is_err());
  }

  #[test]
  fn format_parses_lowercase_names() {
    assert_eq!(Format::parse(None, Format::Meta).unwrap(), Format::Meta);
    assert_eq!(Format::parse(Some("servings"), Format::Full).unwrap(), Format::Servings);
    assert!(matches!(Format::parse(Some("xml"), Format::Full), Err(ApiError::BadRequest(_))));
  }

  #[test]
  fn meta_view_omits_lists() {
    let mut food = Food::new("1");
    food.servings.push(Serving {
      nutrient_basis: "g".into(),
      description:    "1 cup".into(),
      amount:         240.0,
    });
    let json = serde_json::to_value(Format::Meta.render(food.clone())).unwrap();
    assert_eq!(json["fdcId"], "1");
    assert!(json.get("servingSizes").is_none());

    let json = serde_json::to_value(Format::Servings.render(food)).unwrap();
    assert_eq!(json[0]["servingAmount"], 240.0);
  }
}

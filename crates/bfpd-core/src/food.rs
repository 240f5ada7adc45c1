//! Food: the aggregate document assembled from the three source files.
//!
//! A food is created by the primary pass with identity metadata only, then
//! enriched by the servings and nutrients passes. Sub-lists are owned by their
//! food and are always written as a whole.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::DocType;

// ─── Aggregate root ──────────────────────────────────────────────────────────

/// One branded food product, keyed by its FDC identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
  #[serde(rename = "fdcId")]
  pub fdc_id:           String,
  #[serde(rename = "foodDescription")]
  pub description:      String,
  /// `None` when the source date was missing or malformed.
  #[serde(rename = "publicationDate")]
  pub publication_date: Option<NaiveDate>,
  #[serde(rename = "type")]
  pub doc_type:         DocType,
  #[serde(rename = "company", default)]
  pub manufacturer:     String,
  #[serde(default)]
  pub upc:              String,
  #[serde(default)]
  pub ingredients:      String,
  #[serde(rename = "dataSource", default)]
  pub source:           String,
  #[serde(rename = "foodGroup", default)]
  pub group:            Option<FoodGroup>,
  #[serde(rename = "servingSizes", default)]
  pub servings:         Vec<Serving>,
  #[serde(default)]
  pub nutrients:        Vec<NutrientData>,
}

impl Food {
  /// An empty food carrying only its identifier.
  pub fn new(fdc_id: impl Into<String>) -> Self {
    Self {
      fdc_id:           fdc_id.into(),
      description:      String::new(),
      publication_date: None,
      doc_type:         DocType::Food,
      manufacturer:     String::new(),
      upc:              String::new(),
      ingredients:      String::new(),
      source:           String::new(),
      group:            None,
      servings:         Vec::new(),
      nutrients:        Vec::new(),
    }
  }

  /// Project onto the metadata-only view.
  pub fn meta(&self) -> FoodMeta {
    FoodMeta {
      fdc_id:           self.fdc_id.clone(),
      description:      self.description.clone(),
      publication_date: self.publication_date,
      doc_type:         self.doc_type,
      manufacturer:     self.manufacturer.clone(),
      upc:              self.upc.clone(),
      ingredients:      self.ingredients.clone(),
      source:           self.source.clone(),
      group:            self.group.clone(),
    }
  }
}

/// A [`Food`] without its serving and nutrient lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodMeta {
  #[serde(rename = "fdcId")]
  pub fdc_id:           String,
  #[serde(rename = "foodDescription")]
  pub description:      String,
  #[serde(rename = "publicationDate")]
  pub publication_date: Option<NaiveDate>,
  #[serde(rename = "type")]
  pub doc_type:         DocType,
  #[serde(rename = "company")]
  pub manufacturer:     String,
  pub upc:              String,
  pub ingredients:      String,
  #[serde(rename = "dataSource")]
  pub source:           String,
  #[serde(rename = "foodGroup")]
  pub group:            Option<FoodGroup>,
}

// ─── Owned sub-records ───────────────────────────────────────────────────────

/// A serving size declared by the manufacturer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Serving {
  #[serde(rename = "nutrientBasis")]
  pub nutrient_basis: String,
  pub description:    String,
  #[serde(rename = "servingAmount")]
  pub amount:         f32,
}

/// One nutrient value, resolved against the nutrient dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientData {
  #[serde(rename = "nutrientNumber")]
  pub nutrient_no: u32,
  pub value:       f32,
  #[serde(rename = "nutrientName")]
  pub nutrient:    String,
  pub unit:        String,
  /// `None` when the derivation code did not resolve.
  #[serde(default)]
  pub derivation:  Option<Derivation>,
}

/// How a nutrient value was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
  pub id:          u32,
  pub code:        String,
  #[serde(rename = "type")]
  pub doc_type:    DocType,
  pub description: String,
}

/// The GPC category a food belongs to.
///
/// Ids are assigned sequentially during one servings pass and are not stable
/// across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodGroup {
  pub id:          i32,
  pub description: String,
  #[serde(rename = "type")]
  pub doc_type:    DocType,
}

impl FoodGroup {
  pub fn new(id: i32, description: impl Into<String>) -> Self {
    Self { id, description: description.into(), doc_type: DocType::FoodGroup }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn json_uses_document_field_names() {
    let mut food = Food::new("1105904");
    food.description = "WESSON Vegetable Oil".into();
    food.publication_date = NaiveDate::from_ymd_opt(2020, 11, 13);
    food.manufacturer = "Richardson Oilseed Products (US) Limited".into();

    let json = serde_json::to_value(&food).unwrap();
    assert_eq!(json["fdcId"], "1105904");
    assert_eq!(json["foodDescription"], "WESSON Vegetable Oil");
    assert_eq!(json["publicationDate"], "2020-11-13");
    assert_eq!(json["type"], "FOOD");
    assert_eq!(json["company"], "Richardson Oilseed Products (US) Limited");
    assert!(json["foodGroup"].is_null());
  }

  #[test]
  fn sparse_document_deserializes_with_defaults() {
    let json = r#"{
      "fdcId": "42",
      "foodDescription": "PLAIN",
      "publicationDate": null,
      "type": "FOOD"
    }"#;
    let food: Food = serde_json::from_str(json).unwrap();
    assert_eq!(food, Food { description: "PLAIN".into(), ..Food::new("42") });
  }

  #[test]
  fn meta_drops_lists() {
    let mut food = Food::new("7");
    food.servings.push(Serving {
      nutrient_basis: "g".into(),
      description:    "1 cup".into(),
      amount:         240.0,
    });
    let meta = serde_json::to_value(food.meta()).unwrap();
    assert!(meta.get("servingSizes").is_none());
    assert!(meta.get("nutrients").is_none());
    assert_eq!(meta["fdcId"], "7");
  }
}

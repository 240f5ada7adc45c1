//! Reference dictionaries used to resolve numeric codes in the nutrients file.
//!
//! Dictionaries are stored as raw JSON rows. They are turned into typed
//! lookup maps here; a row that does not deserialize, or a code that appears
//! twice, fails the whole build.

use std::collections::HashMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
  DocType, Error, Result,
  food::Derivation,
};

// ─── Entry types ─────────────────────────────────────────────────────────────

/// A nutrient definition, keyed by its FDC nutrient id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientInfo {
  pub id:         u32,
  /// The legacy SR nutrient number (e.g. 203 for protein).
  pub nutrientno: u32,
  pub name:       String,
  pub unit:       String,
}

/// A derivation method, keyed by its FDC derivation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationInfo {
  pub id:          u32,
  pub code:        String,
  pub description: String,
}

impl DerivationInfo {
  /// The embeddable reference, or `None` for an entry with an empty code.
  pub fn to_derivation(&self) -> Option<Derivation> {
    if self.code.is_empty() {
      return None;
    }
    Some(Derivation {
      id:          self.id,
      code:        self.code.clone(),
      doc_type:    DocType::Derivation,
      description: self.description.clone(),
    })
  }
}

// ─── Maps ────────────────────────────────────────────────────────────────────

/// Nutrient id → [`NutrientInfo`].
#[derive(Debug, Clone, Default)]
pub struct NutrientMap(HashMap<u32, NutrientInfo>);

impl NutrientMap {
  pub fn from_documents(docs: Vec<serde_json::Value>) -> Result<Self> {
    build(DocType::Nutrient, docs, |n: &NutrientInfo| n.id).map(Self)
  }

  pub fn get(&self, code: u32) -> Option<&NutrientInfo> { self.0.get(&code) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<NutrientInfo> for NutrientMap {
  fn from_iter<I: IntoIterator<Item = NutrientInfo>>(iter: I) -> Self {
    Self(iter.into_iter().map(|n| (n.id, n)).collect())
  }
}

/// Derivation id → [`DerivationInfo`].
#[derive(Debug, Clone, Default)]
pub struct DerivationMap(HashMap<u32, DerivationInfo>);

impl DerivationMap {
  pub fn from_documents(docs: Vec<serde_json::Value>) -> Result<Self> {
    build(DocType::Derivation, docs, |d: &DerivationInfo| d.id).map(Self)
  }

  pub fn get(&self, code: u32) -> Option<&DerivationInfo> { self.0.get(&code) }

  /// Resolve a code to an embeddable [`Derivation`].
  ///
  /// Unknown codes and entries with an empty code both resolve to `None`.
  pub fn resolve(&self, code: u32) -> Option<Derivation> {
    self.get(code).and_then(DerivationInfo::to_derivation)
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<DerivationInfo> for DerivationMap {
  fn from_iter<I: IntoIterator<Item = DerivationInfo>>(iter: I) -> Self {
    Self(iter.into_iter().map(|d| (d.id, d)).collect())
  }
}

fn build<T, K>(
  doctype: DocType,
  docs: Vec<serde_json::Value>,
  key: K,
) -> Result<HashMap<u32, T>>
where
  T: DeserializeOwned,
  K: Fn(&T) -> u32,
{
  let mut map = HashMap::with_capacity(docs.len());
  for (index, doc) in docs.into_iter().enumerate() {
    let entry: T = serde_json::from_value(doc)
      .map_err(|source| Error::MalformedDictionaryEntry { doctype, index, source })?;
    let code = key(&entry);
    if map.insert(code, entry).is_some() {
      return Err(Error::DuplicateDictionaryCode { doctype, code });
    }
  }
  Ok(map)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn nutrient_map_from_documents() {
    let map = NutrientMap::from_documents(vec![
      json!({ "id": 1003, "nutrientno": 203, "name": "Protein", "unit": "G" }),
      json!({ "id": 1008, "nutrientno": 208, "name": "Energy", "unit": "KCAL" }),
    ])
    .unwrap();

    assert_eq!(map.len(), 2);
    let protein = map.get(1003).unwrap();
    assert_eq!(protein.nutrientno, 203);
    assert_eq!(protein.name, "Protein");
    assert_eq!(protein.unit, "G");
    assert!(map.get(9999).is_none());
  }

  #[test]
  fn malformed_entry_fails_fast() {
    let err = NutrientMap::from_documents(vec![
      json!({ "id": 1003, "nutrientno": 203, "name": "Protein", "unit": "G" }),
      json!({ "id": "not-a-number", "name": "Broken" }),
    ])
    .unwrap_err();

    assert!(matches!(
      err,
      Error::MalformedDictionaryEntry { doctype: DocType::Nutrient, index: 1, .. }
    ));
  }

  #[test]
  fn duplicate_code_fails_fast() {
    let err = DerivationMap::from_documents(vec![
      json!({ "id": 71, "code": "LCCS", "description": "Calculated from label" }),
      json!({ "id": 71, "code": "LCCD", "description": "Calculated from daily value" }),
    ])
    .unwrap_err();

    assert!(matches!(
      err,
      Error::DuplicateDictionaryCode { doctype: DocType::Derivation, code: 71 }
    ));
  }

  #[test]
  fn derivation_resolution() {
    let map: DerivationMap = [
      DerivationInfo {
        id:          71,
        code:        "LCCS".into(),
        description: "Calculated from value per serving size measure".into(),
      },
      DerivationInfo { id: 0, code: String::new(), description: String::new() },
    ]
    .into_iter()
    .collect();

    let d = map.resolve(71).unwrap();
    assert_eq!(d.id, 71);
    assert_eq!(d.code, "LCCS");
    assert_eq!(d.doc_type, DocType::Derivation);
    assert_eq!(d.description, "Calculated from value per serving size measure");

    // Empty code and unknown code are both "no derivation".
    assert!(map.resolve(0).is_none());
    assert!(map.resolve(12345).is_none());
  }
}

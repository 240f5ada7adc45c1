//! The `DocumentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `bfpd-store-sqlite`).
//! The ingest pipeline and the query API depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{DocType, food::Food};

// ─── Document envelope ───────────────────────────────────────────────────────

/// A document together with the revision it was read at.
///
/// The revision is bumped by every successful write and is what
/// [`DocumentStore::compare_and_swap`] checks against.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
  pub revision: u64,
  pub doc:      T,
}

/// One raw reference row, keyed by its numeric code.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryEntry {
  pub code: u32,
  pub body: serde_json::Value,
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Sort order for [`DocumentStore::browse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
  #[default]
  #[serde(rename = "fdcId")]
  FdcId,
  #[serde(rename = "foodDescription")]
  Description,
  #[serde(rename = "company")]
  Company,
}

impl SortField {
  /// JSON path of the field inside a stored food document.
  pub fn json_path(self) -> &'static str {
    match self {
      Self::FdcId => "$.fdcId",
      Self::Description => "$.foodDescription",
      Self::Company => "$.company",
    }
  }
}

/// Field restriction for [`DocumentStore::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchField {
  #[serde(rename = "foodDescription")]
  Description,
  #[serde(rename = "upc")]
  Upc,
  #[serde(rename = "company")]
  Company,
  #[serde(rename = "ingredients")]
  Ingredients,
}

impl SearchField {
  pub const ALL: [Self; 4] =
    [Self::Description, Self::Upc, Self::Company, Self::Ingredients];

  pub fn json_path(self) -> &'static str {
    match self {
      Self::Description => "$.foodDescription",
      Self::Upc => "$.upc",
      Self::Company => "$.company",
      Self::Ingredients => "$.ingredients",
    }
  }
}

/// Parameters for [`DocumentStore::browse`].
#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
  pub sort:    SortField,
  /// Restrict to foods whose `dataSource` is one of these. Empty = all.
  pub sources: Vec<String>,
  pub offset:  usize,
  pub limit:   usize,
}

/// Parameters for [`DocumentStore::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  /// Case-insensitive substring to look for.
  pub text:   String,
  /// Search a single field; `None` searches all of [`SearchField::ALL`].
  pub field:  Option<SearchField>,
  pub offset: usize,
  pub limit:  usize,
}

/// One page of search hits plus the total number of matches.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
  pub total: u64,
  pub foods: Vec<Food>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a food document store backend.
///
/// Documents are whole-value: every write replaces the stored food entirely,
/// there are no field-level merges. Concurrent writers coordinate through
/// revisions and [`compare_and_swap`](DocumentStore::compare_and_swap).
///
/// All methods return `Send` futures so the trait can be used from spawned
/// tokio tasks.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Foods ─────────────────────────────────────────────────────────────

  /// Fetch one food. Returns `None` if no document has this id.
  fn get<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Versioned<Food>>, Self::Error>> + Send + 'a;

  /// Create or replace a food unconditionally. Returns the new revision.
  fn update<'a>(
    &'a self,
    id: &'a str,
    food: &'a Food,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Replace a food only if its stored revision equals `expected`.
  ///
  /// `expected = None` means the document must not exist yet. Returns the new
  /// revision on success and `None` if another writer got there first.
  fn compare_and_swap<'a>(
    &'a self,
    id: &'a str,
    food: &'a Food,
    expected: Option<u64>,
  ) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send + 'a;

  // ── Dictionaries ──────────────────────────────────────────────────────

  /// Bulk fetch of raw reference rows, ordered by code.
  ///
  /// Fails if the namespace holds no rows of `doctype`.
  fn get_dictionary<'a>(
    &'a self,
    namespace: &'a str,
    doctype: DocType,
    offset: usize,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<serde_json::Value>, Self::Error>> + Send + 'a;

  /// Replace every reference row of `doctype` in `namespace` with `entries`.
  /// Returns the number of rows written.
  fn put_dictionary<'a>(
    &'a self,
    namespace: &'a str,
    doctype: DocType,
    entries: Vec<DictionaryEntry>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  // ── Query API reads ───────────────────────────────────────────────────

  /// Number of stored documents (foods or dictionary rows) of `doctype`.
  fn counts(
    &self,
    doctype: DocType,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// A page of foods in the requested order.
  fn browse<'a>(
    &'a self,
    query: &'a BrowseQuery,
  ) -> impl Future<Output = Result<Vec<Food>, Self::Error>> + Send + 'a;

  /// Substring search over the text fields of stored foods.
  fn search<'a>(
    &'a self,
    query: &'a SearchQuery,
  ) -> impl Future<Output = Result<SearchPage, Self::Error>> + Send + 'a;
}

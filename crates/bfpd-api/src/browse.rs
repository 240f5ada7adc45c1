//! Handler for `GET /browse`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use bfpd_core::store::{BrowseQuery, DocumentStore, SortField};
use serde::Deserialize;

use crate::{
  error::ApiError,
  view::{Format, ListResult, Paging},
};

/// All values are kept as strings so bad input gets a JSON error body.
#[derive(Debug, Deserialize, Default)]
pub struct BrowseParams {
  /// Defaults to `meta`.
  pub format: Option<String>,
  /// `fdcId` (default), `foodDescription` or `company`.
  pub sort:   Option<String>,
  /// `BFPD`, `SR` or `FNDDS`.
  pub source: Option<String>,
  pub max:    Option<String>,
  pub page:   Option<String>,
}

fn sort_field(raw: Option<&str>) -> Result<SortField, ApiError> {
  match raw {
    None | Some("") | Some("fdcId") => Ok(SortField::FdcId),
    Some("foodDescription") => Ok(SortField::Description),
    Some("company") => Ok(SortField::Company),
    Some(other) => Err(ApiError::BadRequest(format!(
      "unrecognized sort {other:?}; must be fdcId, foodDescription or company"
    ))),
  }
}

/// Map a public source name onto stored `dataSource` values.
///
/// Branded foods are stored under the label-insight (`LI`) and GS1 (`GTSN`)
/// feeds, so `BFPD` covers both.
pub fn source_filter(raw: Option<&str>) -> Result<Vec<String>, ApiError> {
  match raw {
    None | Some("") => Ok(Vec::new()),
    Some("BFPD") => Ok(vec!["LI".to_owned(), "GTSN".to_owned()]),
    Some(s @ ("SR" | "FNDDS")) => Ok(vec![s.to_owned()]),
    Some(other) => Err(ApiError::BadRequest(format!(
      "unrecognized source {other:?}; must be BFPD, SR or FNDDS"
    ))),
  }
}

/// `GET /browse[?format=...][&sort=...][&source=...][&max=...][&page=...]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<BrowseParams>,
) -> Result<Json<ListResult>, ApiError>
where
  S: DocumentStore,
{
  let format = Format::parse(params.format.as_deref(), Format::Meta)?;
  let paging = Paging::parse(params.max.as_deref(), params.page.as_deref())?;
  let query = BrowseQuery {
    sort:    sort_field(params.sort.as_deref())?,
    sources: source_filter(params.source.as_deref())?,
    offset:  paging.offset(),
    limit:   paging.max,
  };

  let foods = store.browse(&query).await.map_err(ApiError::store)?;
  Ok(Json(ListResult::new(foods.len() as u64, paging, format, foods)))
}

//! Handlers for `GET /search` and `POST /search`.
//!
//! Both take the same fields: `q` (required), `f`, `format`, `max`, `page`.
//! The response `count` is the total number of hits, not the page length.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
};
use bfpd_core::store::{DocumentStore, SearchField, SearchQuery};
use serde::Deserialize;

use crate::{
  error::ApiError,
  view::{DEFAULT_LIST_MAX, Format, ListResult, Paging},
};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  pub q:      Option<String>,
  /// One of `foodDescription`, `upc`, `company`, `ingredients`.
  pub f:      Option<String>,
  pub format: Option<String>,
  pub max:    Option<String>,
  pub page:   Option<String>,
}

/// JSON body for `POST /search`.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SearchBody {
  pub q:      String,
  pub f:      Option<String>,
  pub format: Option<String>,
  pub max:    Option<i64>,
  pub page:   Option<i64>,
}

fn search_field(raw: Option<&str>) -> Result<Option<SearchField>, ApiError> {
  match raw {
    None | Some("") => Ok(None),
    Some("foodDescription") => Ok(Some(SearchField::Description)),
    Some("upc") => Ok(Some(SearchField::Upc)),
    Some("company") => Ok(Some(SearchField::Company)),
    Some("ingredients") => Ok(Some(SearchField::Ingredients)),
    Some(other) => Err(ApiError::BadRequest(format!(
      "unrecognized search field {other:?}; must be foodDescription, upc, company or ingredients"
    ))),
  }
}

fn require_query(q: Option<String>) -> Result<String, ApiError> {
  q.filter(|q| !q.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("a search string in the q parameter is required".into()))
}

async fn run<S: DocumentStore>(
  store: &S,
  text: String,
  field: Option<SearchField>,
  format: Format,
  paging: Paging,
) -> Result<Json<ListResult>, ApiError> {
  let query = SearchQuery { text, field, offset: paging.offset(), limit: paging.max };
  let page = store.search(&query).await.map_err(ApiError::store)?;
  Ok(Json(ListResult::new(page.total, paging, format, page.foods)))
}

/// `GET /search?q=...[&f=...][&format=...][&max=...][&page=...]`
pub async fn get_handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<ListResult>, ApiError>
where
  S: DocumentStore,
{
  let text = require_query(params.q)?;
  let field = search_field(params.f.as_deref())?;
  let format = Format::parse(params.format.as_deref(), Format::Meta)?;
  let paging = Paging::parse(params.max.as_deref(), params.page.as_deref())?;
  run(store.as_ref(), text, field, format, paging).await
}

/// `POST /search`, body: `{"q":"...","f":"upc","format":"full","max":10,"page":0}`
pub async fn post_handler<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<ListResult>, ApiError>
where
  S: DocumentStore,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let text = require_query(Some(body.q))?;
  let field = search_field(body.f.as_deref())?;
  let format = Format::parse(body.format.as_deref(), Format::Meta)?;
  let paging = Paging::new(
    body.max.unwrap_or(DEFAULT_LIST_MAX as i64),
    body.page.unwrap_or(0),
  )?;
  run(store.as_ref(), text, field, format, paging).await
}

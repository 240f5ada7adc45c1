//! Handlers for `/food` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/food/:id` | Optional `?format=full\|meta\|servings\|nutrients` |
//! | `GET`  | `/food/:id/:format` | Same formats as a path segment |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use bfpd_core::store::DocumentStore;
use serde::Deserialize;

use crate::{
  error::ApiError,
  view::{Format, FoodView},
};

#[derive(Debug, Deserialize, Default)]
pub struct FoodParams {
  pub format: Option<String>,
}

/// `GET /food/:id[?format=...]`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Query(params): Query<FoodParams>,
) -> Result<Json<FoodView>, ApiError>
where
  S: DocumentStore,
{
  let format = Format::parse(params.format.as_deref(), Format::Full)?;
  fetch(store.as_ref(), &id, format).await
}

/// `GET /food/:id/:format`
pub async fn get_formatted<S>(
  State(store): State<Arc<S>>,
  Path((id, format)): Path<(String, String)>,
) -> Result<Json<FoodView>, ApiError>
where
  S: DocumentStore,
{
  let format = Format::parse(Some(&format), Format::Full)?;
  fetch(store.as_ref(), &id, format).await
}

async fn fetch<S: DocumentStore>(
  store: &S,
  id: &str,
  format: Format,
) -> Result<Json<FoodView>, ApiError> {
  let food = store
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no food found for {id}")))?;
  Ok(Json(format.render(food.doc)))
}

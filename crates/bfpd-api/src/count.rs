//! Handler for `GET /count/:doctype`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use bfpd_core::{DocType, store::DocumentStore};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct CountResult {
  #[serde(rename = "type")]
  pub doc_type: DocType,
  pub count:    u64,
}

/// `GET /count/:doctype` where doctype is `FOOD`, `NUT`, `DERV` or `FGGPC`.
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Path(doctype): Path<String>,
) -> Result<Json<CountResult>, ApiError>
where
  S: DocumentStore,
{
  let doc_type =
    DocType::parse(&doctype).map_err(|e| ApiError::NotFound(e.to_string()))?;
  let count = store.counts(doc_type).await.map_err(ApiError::store)?;
  Ok(Json(CountResult { doc_type, count }))
}

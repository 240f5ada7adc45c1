//! Read-only JSON API over ingested branded foods.
//!
//! Exposes an axum [`Router`] backed by any [`bfpd_core::store::DocumentStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/v1", bfpd_api::api_router(store.clone()))
//! ```

pub mod browse;
pub mod count;
pub mod error;
pub mod food;
pub mod search;
pub mod view;

use std::sync::Arc;

use axum::{Router, routing::get};
use bfpd_core::store::DocumentStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DocumentStore + 'static,
{
  Router::new()
    // Foods
    .route("/food/{id}", get(food::get_one::<S>))
    .route("/food/{id}/{format}", get(food::get_formatted::<S>))
    .route("/browse", get(browse::handler::<S>))
    // Search
    .route("/search", get(search::get_handler::<S>).post(search::post_handler::<S>))
    // Counts
    .route("/count/{doctype}", get(count::handler::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;

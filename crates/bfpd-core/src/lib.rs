//! Core types and trait definitions for the Branded Food Products store.
//!
//! This crate is deliberately free of HTTP, CSV and database dependencies.
//! The ingest pipeline, the query API and the storage backends all depend on
//! it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod dictionary;
pub mod doctype;
pub mod error;
pub mod food;
pub mod store;

pub use doctype::DocType;
pub use error::{Error, Result};

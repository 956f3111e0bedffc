//! Multi-tenant Prometheus rule file store.
//!
//! Each tenant owns exactly one rule document, kept in an object storage
//! bucket under `metrics/rules/<tenant>/rules.yaml`. Writes are validated
//! before they reach the bucket; reads return the stored bytes untouched.
//! A single aggregate endpoint merges every tenant's groups into one
//! document, prefixing group names with the owning tenant.
//!
//! # Listeners
//!
//! - API (`--web.listen`): `/api/v1/rules/{tenant}` (GET, PUT), `/api/v1/rules` (GET)
//! - internal (`--web.internal.listen`): `/health/live`, `/health/ready`, `/metrics`

#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod handler;
pub mod internal;
pub mod prelude;
pub mod routes;

pub use crate::app::{App, AppBuilder, AppState};

// vim: ts=4

//! Core of rules-objstore: a multi-tenant store for Prometheus rule files.
//!
//! - [`rulefmt`] decodes and validates rule files
//! - [`key`] maps tenants to bucket keys and back
//! - [`store::RuleStore`] reads and writes one tenant's rule file
//! - [`aggregate`] merges all tenants' rule files into one document

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod duration;
pub mod key;
pub mod metrics;
pub mod prelude;
pub mod rulefmt;
pub mod store;

pub use aggregate::{aggregate_all, aggregate_all_yaml};
pub use rulefmt::{Rule, RuleDocument, RuleGroup};
pub use store::RuleStore;

// vim: ts=4

//! Shared types, the bucket adapter trait, and the error type for rules-objstore.
//!
//! Kept separate from the core so bucket adapters only depend on this crate.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod bucket_adapter;
pub mod error;
pub mod prelude;
pub mod types;

// vim: ts=4

//! Adapter that gives access to the object-storage bucket holding the rule files
use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

/// Object storage as seen by the rule store.
///
/// Keys are relative, `/`-separated paths. Implementations must make `upload`
/// atomic per key: a concurrent `get` sees either the previous object or the
/// new one, never a partial write.
#[async_trait]
pub trait BucketAdapter: Debug + Send + Sync {
	/// Reads a whole object, `Error::NotFound` if there is none at `key`
	async fn get(&self, key: &str) -> ClResult<Box<[u8]>>;

	/// Creates or fully replaces the object at `key`
	async fn upload(&self, key: &str, data: &[u8]) -> ClResult<()>;

	/// Lists the keys of all objects below `prefix`
	///
	/// Order is implementation defined unless the adapter documents it.
	async fn list(&self, prefix: &str) -> ClResult<Vec<Box<str>>>;
}

// vim: ts=4

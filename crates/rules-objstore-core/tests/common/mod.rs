//! Test buckets and fixtures shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use rules_objstore_core::RuleStore;
use rules_objstore_types::bucket_adapter::BucketAdapter;
use rules_objstore_types::error::{ClResult, Error};
use rules_objstore_types::types::TenantId;

pub const SAMPLE_RULES_A: &str = r#"
groups:
  - name: test-oidc
    interval: 5s
    rules:
      - record: trs
        expr: vector(1)
      - alert: HighRequestLatency
        expr: job:request_latency_seconds:mean5m{job="myjob"} > 0.5
        for: 10m
        labels:
          severity: page
        annotations:
          summary: High request latency"#;

pub const SAMPLE_RULES_B: &str = r#"
groups:
  - name: test-oidc
    interval: 5s
    rules:
      - record: btrs
        expr: vector(1)
        labels:
          dummy: yes
      - alert: HighRequestLatency
        expr: job:request_latency_seconds:mean5m{job="second"} > 0.5
        for: 10m"#;

pub const INVALID_RULES: &str = r"
groups:
  - name: test-oidc
    interval: 5s
    rules:
      - record: trs
        expr: vector(1)
      - invalid: property";

pub const EMPTY_RULES: &str = "
groups: []";

pub fn tenant(id: &str) -> TenantId {
	TenantId::new(id).expect("valid tenant")
}

/// In-memory bucket; `list` returns keys in insertion order, not sorted
#[derive(Debug, Default)]
pub struct MemBucket {
	objects: Mutex<Vec<(Box<str>, Box<[u8]>)>>,
	pub uploads: AtomicUsize,
}

impl MemBucket {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Puts raw bytes into the bucket, bypassing any validation
	pub fn insert(&self, key: &str, data: &[u8]) {
		let mut objects = self.objects.lock();
		match objects.iter_mut().find(|(k, _)| &**k == key) {
			Some((_, v)) => *v = data.into(),
			None => objects.push((key.into(), data.into())),
		}
	}
}

#[async_trait]
impl BucketAdapter for MemBucket {
	async fn get(&self, key: &str) -> ClResult<Box<[u8]>> {
		self.objects
			.lock()
			.iter()
			.find(|(k, _)| &**k == key)
			.map(|(_, v)| v.clone())
			.ok_or(Error::NotFound)
	}

	async fn upload(&self, key: &str, data: &[u8]) -> ClResult<()> {
		self.uploads.fetch_add(1, Ordering::SeqCst);
		self.insert(key, data);
		Ok(())
	}

	async fn list(&self, prefix: &str) -> ClResult<Vec<Box<str>>> {
		Ok(self
			.objects
			.lock()
			.iter()
			.filter(|(k, _)| k.starts_with(prefix))
			.map(|(k, _)| k.clone())
			.collect())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
	None,
	/// `get` of keys containing the given marker fails
	GetFails(&'static str),
	UploadFails,
	ListFails,
	/// every call sleeps longer than any test timeout
	Hang,
}

/// Wraps a [`MemBucket`] and injects failures
#[derive(Debug)]
pub struct FaultyBucket {
	pub inner: Arc<MemBucket>,
	pub fault: Mutex<Fault>,
}

impl FaultyBucket {
	pub fn new(inner: Arc<MemBucket>, fault: Fault) -> Arc<Self> {
		Arc::new(Self { inner, fault: Mutex::new(fault) })
	}

	fn fault(&self) -> Fault {
		*self.fault.lock()
	}

	async fn maybe_hang(&self) {
		if self.fault() == Fault::Hang {
			tokio::time::sleep(Duration::from_secs(3600)).await;
		}
	}
}

#[async_trait]
impl BucketAdapter for FaultyBucket {
	async fn get(&self, key: &str) -> ClResult<Box<[u8]>> {
		self.maybe_hang().await;
		if let Fault::GetFails(marker) = self.fault() {
			if key.contains(marker) {
				return Err(Error::Backend("injected get failure".into()));
			}
		}
		self.inner.get(key).await
	}

	async fn upload(&self, key: &str, data: &[u8]) -> ClResult<()> {
		self.maybe_hang().await;
		if self.fault() == Fault::UploadFails {
			return Err(Error::Backend("injected upload failure".into()));
		}
		self.inner.upload(key, data).await
	}

	async fn list(&self, prefix: &str) -> ClResult<Vec<Box<str>>> {
		self.maybe_hang().await;
		if self.fault() == Fault::ListFails {
			return Err(Error::Backend("injected list failure".into()));
		}
		self.inner.list(prefix).await
	}
}

pub fn mem_store() -> (RuleStore, Arc<MemBucket>) {
	let bucket = MemBucket::new();
	(RuleStore::new(bucket.clone()), bucket)
}

// vim: ts=4

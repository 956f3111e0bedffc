//! Per-tenant rule file storage on top of a [`BucketAdapter`]

use std::{sync::Arc, time::Duration};

use rules_objstore_types::bucket_adapter::BucketAdapter;

use crate::key;
use crate::metrics::{NoopObserver, RulesObserver};
use crate::prelude::*;
use crate::rulefmt;

pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RuleStore {
	bucket: Arc<dyn BucketAdapter>,
	observer: Arc<dyn RulesObserver>,
	op_timeout: Duration,
}

impl RuleStore {
	pub fn new(bucket: Arc<dyn BucketAdapter>) -> Self {
		Self { bucket, observer: Arc::new(NoopObserver), op_timeout: DEFAULT_OP_TIMEOUT }
	}

	pub fn with_observer(mut self, observer: Arc<dyn RulesObserver>) -> Self {
		self.observer = observer;
		self
	}

	/// Upper bound for every single bucket call
	pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
		self.op_timeout = op_timeout;
		self
	}

	pub fn bucket(&self) -> &Arc<dyn BucketAdapter> {
		&self.bucket
	}

	pub(crate) async fn bounded<T>(&self, fut: impl Future<Output = ClResult<T>>) -> ClResult<T> {
		tokio::time::timeout(self.op_timeout, fut).await?
	}

	/// Returns the stored rule file exactly as written.
	///
	/// The content is not validated again: a document accepted once stays
	/// readable even if validation gets stricter later.
	pub async fn read(&self, tenant: &TenantId) -> ClResult<Box<[u8]>> {
		let key = key::key_for(tenant);
		match self.bounded(self.bucket.get(&key)).await {
			Ok(data) => Ok(data),
			Err(Error::NotFound) => {
				debug!(tenant = %tenant, path = %key, "rules file not found");
				Err(Error::NotFound)
			}
			Err(err) => {
				warn!(tenant = %tenant, error = %err, "reading rules file from bucket");
				Err(err)
			}
		}
	}

	/// Validates `data` and, if it is a valid rule file, replaces the tenant's
	/// stored rule file with it. Rejected input never reaches the bucket.
	pub async fn write(&self, tenant: &TenantId, data: &[u8]) -> ClResult<rulefmt::RuleDocument> {
		let doc = match rulefmt::parse(data) {
			Ok(doc) => doc,
			Err(err) => {
				debug!(tenant = %tenant, error = %err, "request body failed rule group validation");
				self.observer.validation_failed(tenant);
				return Err(err);
			}
		};
		self.observer.validation_succeeded(tenant, doc.group_count(), doc.rule_count());

		let key = key::key_for(tenant);
		self.bounded(self.bucket.upload(&key, data)).await.map_err(|err| {
			warn!(tenant = %tenant, error = %err, "uploading rules file to bucket");
			err
		})?;
		info!(
			tenant = %tenant,
			groups = doc.group_count(),
			rules = doc.rule_count(),
			"updated rules file"
		);

		Ok(doc)
	}

	/// Lists every tenant that has a rule file, in bucket enumeration order
	pub async fn tenants(&self) -> ClResult<Vec<TenantId>> {
		let keys = self.bounded(self.bucket.list(key::RULES_BASE_PATH)).await?;
		Ok(keys
			.iter()
			.filter_map(|k| {
				let tenant = key::tenant_from_key(k);
				if tenant.is_none() {
					debug!(key = %k, "skipping object outside the rules file layout");
				}
				tenant
			})
			.collect())
	}
}

// vim: ts=4

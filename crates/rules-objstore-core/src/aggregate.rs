//! Merge of every tenant's rule file into one document
//!
//! Each group is renamed to `<tenant>.<group>`, unconditionally, so names can
//! never collide across tenants and every group stays attributable. A single
//! failing tenant fails the whole aggregation; partial results are never
//! returned.

use futures::{StreamExt, TryStreamExt, stream};

use crate::prelude::*;
use crate::rulefmt::{self, RuleDocument, RuleGroup};
use crate::store::RuleStore;

pub const DEFAULT_CONCURRENCY: usize = 8;

fn tenant_groups(tenant: &TenantId, doc: RuleDocument) -> impl Iterator<Item = RuleGroup> + '_ {
	doc.groups.into_iter().map(move |mut group| {
		group.name = format!("{}.{}", tenant, group.name);
		group
	})
}

async fn read_tenant(store: &RuleStore, tenant: &TenantId) -> ClResult<RuleDocument> {
	let data = store.read(tenant).await?;
	rulefmt::parse(&data).inspect_err(|err| {
		warn!(tenant = %tenant, error = %err, "error parsing rules data");
	})
}

async fn read_entry<'a>(
	store: &RuleStore,
	tenant: &'a TenantId,
) -> ClResult<(&'a TenantId, RuleDocument)> {
	match read_tenant(store, tenant).await {
		Ok(doc) => Ok((tenant, doc)),
		Err(err) => Err(Error::Aggregate {
			tenant: Some(tenant.as_str().into()),
			source: Box::new(err),
		}),
	}
}

/// Reads and merges the rule files of all tenants.
///
/// Up to `concurrency` tenants are fetched at once; the output still follows
/// the bucket's enumeration order. On the first failure the remaining reads
/// are dropped.
pub async fn aggregate_all(store: &RuleStore, concurrency: usize) -> ClResult<RuleDocument> {
	let tenants = store.tenants().await.map_err(|err| {
		warn!(error = %err, "listing rules files");
		Error::Aggregate { tenant: None, source: Box::new(err) }
	})?;
	debug!(tenants = tenants.len(), "aggregating rules files");

	let reads: Vec<_> = tenants.iter().map(|tenant| read_entry(store, tenant)).collect();
	let docs: Vec<(&TenantId, RuleDocument)> = stream::iter(reads)
		.buffered(concurrency.max(1))
		.try_collect()
		.await?;

	let mut all = RuleDocument::default();
	for (tenant, doc) in docs {
		all.groups.extend(tenant_groups(tenant, doc));
	}

	Ok(all)
}

/// [`aggregate_all`] encoded as YAML
pub async fn aggregate_all_yaml(store: &RuleStore, concurrency: usize) -> ClResult<String> {
	aggregate_all(store, concurrency).await?.to_yaml()
}


// vim: ts=4

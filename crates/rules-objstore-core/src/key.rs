//! Storage key scheme: one object per tenant below a shared prefix
//!
//! `metrics/rules/<tenant>/rules.yaml`
//!
//! Tenant IDs that are not a single URL-safe path segment are rejected by
//! [`TenantId::new`], so no tenant can address an object outside its own
//! directory.

use crate::prelude::*;

pub const RULES_BASE_PATH: &str = "metrics/rules/";
pub const RULES_FILE_NAME: &str = "rules.yaml";

pub fn key_for(tenant: &TenantId) -> String {
	format!("{}{}/{}", RULES_BASE_PATH, tenant, RULES_FILE_NAME)
}

/// Inverse of [`key_for`]; `None` for keys outside the layout
pub fn tenant_from_key(key: &str) -> Option<TenantId> {
	let tenant = key
		.strip_prefix(RULES_BASE_PATH)?
		.strip_suffix(RULES_FILE_NAME)?
		.strip_suffix('/')?;
	TenantId::new(tenant).ok()
}


// vim: ts=4

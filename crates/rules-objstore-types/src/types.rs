//! Common types used throughout rules-objstore.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const MAX_TENANT_LEN: usize = 256;

// TenantId //
//**********//
/// Opaque, URL-safe tenant identifier.
///
/// Only `[A-Za-z0-9_~-]` is accepted, so a tenant ID is always exactly one
/// path segment of a storage key. `.` is refused because aggregated group
/// names are `<tenant>.<group>` and must stay unambiguous.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TenantId(Box<str>);

impl TenantId {
	pub fn new(tenant: &str) -> ClResult<TenantId> {
		if tenant.is_empty() {
			return Err(Error::InvalidTenant("tenant must not be empty".into()));
		}
		if tenant.len() > MAX_TENANT_LEN {
			return Err(Error::InvalidTenant(format!(
				"tenant is longer than {} bytes",
				MAX_TENANT_LEN
			)));
		}
		if let Some(c) = tenant.chars().find(|c| !is_tenant_char(*c)) {
			return Err(Error::InvalidTenant(format!(
				"tenant {:?} contains invalid character {:?}",
				tenant, c
			)));
		}
		Ok(TenantId(tenant.into()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

fn is_tenant_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || matches!(c, '_' | '~' | '-')
}

impl std::fmt::Display for TenantId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for TenantId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl<'de> Deserialize<'de> for TenantId {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		TenantId::new(&s).map_err(serde::de::Error::custom)
	}
}


// vim: ts=4

//! Validation outcome hooks and the per-tenant counters behind `/metrics`

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::prelude::*;

/// Called by the store on every validation outcome. Implementations must not
/// fail; the store does not depend on anything they do.
pub trait RulesObserver: std::fmt::Debug + Send + Sync {
	fn validation_succeeded(&self, _tenant: &TenantId, _groups: usize, _rules: usize) {}
	fn validation_failed(&self, _tenant: &TenantId) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl RulesObserver for NoopObserver {}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TenantCounters {
	pub validations: u64,
	pub validation_failures: u64,
	pub rule_groups_configured: usize,
	pub rules_configured: usize,
}

#[derive(Debug, Default)]
pub struct RulesMetrics {
	tenants: Mutex<BTreeMap<TenantId, TenantCounters>>,
}

impl RulesMetrics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, tenant: &TenantId) -> Option<TenantCounters> {
		self.tenants.lock().get(tenant).copied()
	}

	/// Prometheus text exposition format
	pub fn render(&self) -> String {
		let tenants = self.tenants.lock();
		let mut out = String::new();
		let families: [(&str, &str, &str, fn(&TenantCounters) -> u64); 4] = [
			(
				"rules_objstore_validations_total",
				"counter",
				"Total number of all successful validations for rule files.",
				|c| c.validations,
			),
			(
				"rules_objstore_validation_failures_total",
				"counter",
				"Total number of all validations for rule files which failed.",
				|c| c.validation_failures,
			),
			(
				"rules_objstore_rule_groups_configured",
				"gauge",
				"Number of Prometheus rule groups configured.",
				|c| c.rule_groups_configured as u64,
			),
			(
				"rules_objstore_rules_configured",
				"gauge",
				"Number of Prometheus rules configured.",
				|c| c.rules_configured as u64,
			),
		];
		for (name, kind, help, value) in families {
			let _ = writeln!(out, "# HELP {} {}", name, help);
			let _ = writeln!(out, "# TYPE {} {}", name, kind);
			for (tenant, counters) in tenants.iter() {
				let _ = writeln!(out, "{}{{tenant=\"{}\"}} {}", name, tenant, value(counters));
			}
		}
		out
	}
}

impl RulesObserver for RulesMetrics {
	fn validation_succeeded(&self, tenant: &TenantId, groups: usize, rules: usize) {
		let mut tenants = self.tenants.lock();
		let counters = tenants.entry(tenant.clone()).or_default();
		counters.validations += 1;
		counters.rule_groups_configured = groups;
		counters.rules_configured = rules;
	}

	fn validation_failed(&self, tenant: &TenantId) {
		self.tenants.lock().entry(tenant.clone()).or_default().validation_failures += 1;
	}
}


// vim: ts=4

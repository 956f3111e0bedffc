//! Prometheus rule file model and validator
//!
//! Decoding is done by `serde_yaml`. A YAML syntax or type error stops
//! decoding and is reported on its own. Everything else (unknown fields,
//! duplicate group names, bad durations, rule shape, names) is collected by
//! a second pass so that a rejected document lists all of its problems.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::duration::PromDuration;
use crate::prelude::*;

type Extra = BTreeMap<String, serde_yaml::Value>;

/// `key:` with no value decodes like an absent key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Text of a YAML scalar. Numbers and booleans are accepted wherever a
/// string is expected, so `expr: 1` or `priority: 1` decode as text.
fn scalar_text<E: serde::de::Error>(value: serde_yaml::Value) -> Result<String, E> {
	use serde_yaml::Value;
	match value {
		Value::String(s) => Ok(s),
		Value::Number(n) => Ok(n.to_string()),
		Value::Bool(b) => Ok(b.to_string()),
		Value::Null => Ok(String::new()),
		Value::Tagged(tagged) => scalar_text(tagged.value),
		Value::Sequence(_) => Err(E::custom("invalid type: sequence, expected a string")),
		Value::Mapping(_) => Err(E::custom("invalid type: map, expected a string")),
	}
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: serde::Deserializer<'de>,
{
	scalar_text(serde_yaml::Value::deserialize(deserializer)?)
}

fn opt_scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Option::<serde_yaml::Value>::deserialize(deserializer)?
		.filter(|v| !v.is_null())
		.map(scalar_text)
		.transpose()
}

/// Label and annotation maps; `null` is an empty map
fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Option::<serde_yaml::Mapping>::deserialize(deserializer)?
		.unwrap_or_default()
		.into_iter()
		.map(|(k, v)| Ok((scalar_text::<D::Error>(k)?, scalar_text::<D::Error>(v)?)))
		.collect()
}

fn is_blank(text: &str) -> bool {
	text.lines().map(str::trim).all(|line| line.is_empty() || line.starts_with('#'))
}

/// A parsed rule file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
	#[serde(default, deserialize_with = "null_as_default")]
	pub groups: Vec<RuleGroup>,
	#[serde(flatten)]
	pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
	#[serde(default, deserialize_with = "scalar_as_string")]
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub interval: Option<PromDuration>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query_offset: Option<PromDuration>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub limit: Option<u32>,
	#[serde(default, deserialize_with = "scalar_map", skip_serializing_if = "BTreeMap::is_empty")]
	pub labels: BTreeMap<String, String>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub rules: Vec<Rule>,
	#[serde(flatten)]
	pub extra: Extra,
}

/// Recording rule (`record`) or alerting rule (`alert`)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
	#[serde(default, deserialize_with = "opt_scalar_as_string", skip_serializing_if = "Option::is_none")]
	pub record: Option<String>,
	#[serde(default, deserialize_with = "opt_scalar_as_string", skip_serializing_if = "Option::is_none")]
	pub alert: Option<String>,
	#[serde(default, deserialize_with = "scalar_as_string")]
	pub expr: String,
	#[serde(default, rename = "for", skip_serializing_if = "Option::is_none")]
	pub for_: Option<PromDuration>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub keep_firing_for: Option<PromDuration>,
	#[serde(default, deserialize_with = "scalar_map", skip_serializing_if = "BTreeMap::is_empty")]
	pub labels: BTreeMap<String, String>,
	#[serde(default, deserialize_with = "scalar_map", skip_serializing_if = "BTreeMap::is_empty")]
	pub annotations: BTreeMap<String, String>,
	#[serde(flatten)]
	pub extra: Extra,
}

impl RuleDocument {
	pub fn group_count(&self) -> usize {
		self.groups.len()
	}

	pub fn rule_count(&self) -> usize {
		self.groups.iter().map(|g| g.rules.len()).sum()
	}

	/// Canonical YAML encoding
	pub fn to_yaml(&self) -> ClResult<String> {
		serde_yaml::to_string(self)
			.map_err(|e| Error::Internal(format!("encoding rule groups: {}", e)))
	}
}

impl Rule {
	fn record(&self) -> Option<&str> {
		self.record.as_deref().filter(|s| !s.is_empty())
	}

	fn alert(&self) -> Option<&str> {
		self.alert.as_deref().filter(|s| !s.is_empty())
	}

	fn display_name(&self) -> &str {
		self.record().or(self.alert()).unwrap_or_default()
	}
}

// Validation //
//************//

/// Parses and validates a rule file.
///
/// Empty, whitespace-only and comment-only input is a document without groups.
pub fn parse(data: &[u8]) -> ClResult<RuleDocument> {
	let text = std::str::from_utf8(data)
		.map_err(|e| Error::ValidationError(vec![format!("rule file is not valid UTF-8: {}", e)]))?;

	let value: serde_yaml::Value = if is_blank(text) {
		serde_yaml::Value::Null
	} else {
		serde_yaml::from_str(text).map_err(|e| Error::ValidationError(vec![e.to_string()]))?
	};
	if value.is_null() {
		return Ok(RuleDocument::default());
	}

	let doc: RuleDocument =
		serde_yaml::from_value(value).map_err(|e| Error::ValidationError(vec![e.to_string()]))?;

	let errs = validate(&doc);
	if errs.is_empty() { Ok(doc) } else { Err(Error::ValidationError(errs)) }
}

/// Returns every schema violation of an already decoded document
pub fn validate(doc: &RuleDocument) -> Vec<String> {
	let mut errs = Vec::new();
	for key in doc.extra.keys() {
		errs.push(format!("field {:?} not found in rule file", key));
	}

	let mut seen = HashSet::new();
	for (gi, group) in doc.groups.iter().enumerate() {
		if group.name.is_empty() {
			errs.push(format!("group {}: groupname must not be empty", gi + 1));
		} else if !seen.insert(group.name.as_str()) {
			errs.push(format!("groupname: {:?} is repeated in the same file", group.name));
		}
		validate_group(group, &mut errs);
	}

	errs
}

fn validate_group(group: &RuleGroup, errs: &mut Vec<String>) {
	let mut group_err = |msg: String| errs.push(format!("group {:?}: {}", group.name, msg));

	for key in group.extra.keys() {
		group_err(format!("field {:?} not found in rule group", key));
	}
	for (field, value) in [("interval", &group.interval), ("query_offset", &group.query_offset)] {
		if let Some(Err(e)) = value.as_ref().map(PromDuration::to_std) {
			group_err(format!("invalid {}: {}", field, e));
		}
	}
	for name in group.labels.keys().filter(|n| !is_valid_label_name(n)) {
		group_err(format!("invalid label name: {}", name));
	}

	for (ri, rule) in group.rules.iter().enumerate() {
		for msg in validate_rule(rule) {
			errs.push(format!(
				"group {:?}, rule {}, {:?}: {}",
				group.name,
				ri + 1,
				rule.display_name(),
				msg
			));
		}
	}
}

fn validate_rule(rule: &Rule) -> Vec<String> {
	let mut errs = Vec::new();

	for key in rule.extra.keys() {
		errs.push(format!("field {:?} not found in rule", key));
	}

	match (rule.record(), rule.alert()) {
		(Some(_), Some(_)) => errs.push("only one of 'record' and 'alert' must be set".into()),
		(None, None) => errs.push("one of 'record' or 'alert' must be set".into()),
		(Some(record), None) => {
			if !is_valid_metric_name(record) {
				errs.push(format!("invalid recording rule name: {}", record));
			}
			if !rule.annotations.is_empty() {
				errs.push("invalid field 'annotations' in recording rule".into());
			}
			if rule.for_.is_some() {
				errs.push("invalid field 'for' in recording rule".into());
			}
			if rule.keep_firing_for.is_some() {
				errs.push("invalid field 'keep_firing_for' in recording rule".into());
			}
		}
		(None, Some(_)) => {}
	}

	if rule.expr.trim().is_empty() {
		errs.push("field 'expr' must be set in rule".into());
	} else if let Err(e) = check_expr_delimiters(&rule.expr) {
		errs.push(format!("could not parse expression: {}", e));
	}

	for (field, value) in [("for", &rule.for_), ("keep_firing_for", &rule.keep_firing_for)] {
		if let Some(Err(e)) = value.as_ref().map(PromDuration::to_std) {
			errs.push(format!("invalid {}: {}", field, e));
		}
	}
	for name in rule.labels.keys().filter(|n| !is_valid_label_name(n)) {
		errs.push(format!("invalid label name: {}", name));
	}
	for name in rule.annotations.keys().filter(|n| !is_valid_label_name(n)) {
		errs.push(format!("invalid annotation name: {}", name));
	}

	errs
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn is_valid_label_name(name: &str) -> bool {
	let mut chars = name.chars();
	chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
	let mut chars = name.chars();
	chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Sanity check of an expression: brackets balanced outside string literals.
/// The expression language itself is not interpreted here.
fn check_expr_delimiters(expr: &str) -> Result<(), String> {
	let mut stack = Vec::new();
	let mut quote: Option<char> = None;
	let mut escaped = false;

	for (pos, c) in expr.char_indices() {
		if let Some(q) = quote {
			if escaped {
				escaped = false;
			} else if c == '\\' && q != '`' {
				escaped = true;
			} else if c == q {
				quote = None;
			}
			continue;
		}
		match c {
			'"' | '\'' | '`' => quote = Some(c),
			'(' | '[' | '{' => stack.push((c, pos)),
			')' | ']' | '}' => {
				let open = match c {
					')' => '(',
					']' => '[',
					_ => '{',
				};
				match stack.pop() {
					Some((o, _)) if o == open => {}
					_ => return Err(format!("unexpected {:?} at position {}", c, pos)),
				}
			}
			_ => {}
		}
	}

	if let Some(q) = quote {
		return Err(format!("unterminated string literal, missing {:?}", q));
	}
	if let Some((c, pos)) = stack.pop() {
		return Err(format!("unclosed {:?} opened at position {}", c, pos));
	}
	Ok(())
}


// vim: ts=4

//! Prometheus duration strings (`1h30m`, `5s`, `0`)

use serde::{Deserialize, Serialize};
use std::time::Duration;

const UNITS: [(&str, u64); 7] = [
	("y", 365 * 24 * 60 * 60 * 1000),
	("w", 7 * 24 * 60 * 60 * 1000),
	("d", 24 * 60 * 60 * 1000),
	("h", 60 * 60 * 1000),
	("m", 60 * 1000),
	("s", 1000),
	("ms", 1),
];

/// Parses a Prometheus duration.
///
/// Each unit may appear at most once, from the largest to the smallest one.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
	if s == "0" {
		return Ok(Duration::ZERO);
	}
	if s.is_empty() {
		return Err("empty duration string".into());
	}

	let invalid = || format!("not a valid duration string: {:?}", s);
	let mut rest = s;
	let mut next_unit = 0;
	let mut total_ms: u64 = 0;
	while !rest.is_empty() {
		let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
		if digits == 0 {
			return Err(invalid());
		}
		let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
		rest = &rest[digits..];

		// "ms" must be tried before "m"
		let unit_len = if rest.starts_with("ms") {
			2
		} else {
			rest.bytes().take_while(u8::is_ascii_alphabetic).count().min(1)
		};
		let unit = &rest[..unit_len];
		let idx = UNITS[next_unit..]
			.iter()
			.position(|(name, _)| *name == unit)
			.map(|pos| pos + next_unit)
			.ok_or_else(invalid)?;
		rest = &rest[unit_len..];
		next_unit = idx + 1;

		total_ms = value
			.checked_mul(UNITS[idx].1)
			.and_then(|ms| total_ms.checked_add(ms))
			.ok_or_else(|| format!("duration out of range: {:?}", s))?;
	}

	Ok(Duration::from_millis(total_ms))
}

/// Duration as written in a rule file.
///
/// The source text is kept so stored documents are re-emitted unchanged;
/// the validator checks it with [`parse_duration`].
///
/// A bare number (`interval: 0`) is accepted and kept as its text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PromDuration(pub String);

impl<'de> Deserialize<'de> for PromDuration {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct DurationVisitor;

		impl serde::de::Visitor<'_> for DurationVisitor {
			type Value = PromDuration;

			fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str("a duration")
			}

			fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<PromDuration, E> {
				Ok(PromDuration(v.to_string()))
			}

			fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<PromDuration, E> {
				Ok(PromDuration(v.to_string()))
			}

			fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<PromDuration, E> {
				Ok(PromDuration(v.to_string()))
			}

			fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<PromDuration, E> {
				Ok(PromDuration(v.to_string()))
			}
		}

		deserializer.deserialize_any(DurationVisitor)
	}
}

impl PromDuration {
	pub fn to_std(&self) -> Result<Duration, String> {
		parse_duration(&self.0)
	}
}

impl std::fmt::Display for PromDuration {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}


// vim: ts=4

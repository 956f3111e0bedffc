//! Error type shared by the store, the adapters and the HTTP layer

use axum::{
	http::{StatusCode, header},
	response::{IntoResponse, Response},
};

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// No object exists at the requested key
	NotFound,
	/// Rule document rejected, one entry per schema violation
	ValidationError(Vec<String>),
	/// Tenant ID cannot be mapped to a storage key
	InvalidTenant(String),
	/// A bucket call did not finish within the operation timeout
	Timeout,
	/// Cross-tenant aggregation failed; `tenant` is `None` when listing failed
	Aggregate { tenant: Option<Box<str>>, source: Box<Error> },
	/// Bucket failure that is not an I/O error (bad key, listing failure, ...)
	Backend(String),
	ConfigError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// True for failures of the bucket itself, as opposed to bad input
	pub fn is_backend(&self) -> bool {
		matches!(self, Error::Backend(_) | Error::Io(_) | Error::Timeout)
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		if err.kind() == std::io::ErrorKind::NotFound { Self::NotFound } else { Self::Io(err) }
	}
}

impl From<tokio::time::error::Elapsed> for Error {
	fn from(_err: tokio::time::error::Elapsed) -> Self {
		Self::Timeout
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::ValidationError(errs) => {
				write!(f, "rule group validation failed: {}", errs.join("; "))
			}
			Error::InvalidTenant(msg) => write!(f, "invalid tenant: {}", msg),
			Error::Timeout => write!(f, "bucket operation timed out"),
			Error::Aggregate { tenant: Some(tenant), source } => {
				write!(f, "aggregating rules of tenant {}: {}", tenant, source)
			}
			Error::Aggregate { tenant: None, source } => {
				write!(f, "listing rules files: {}", source)
			}
			Error::Backend(msg) => write!(f, "bucket error: {}", msg),
			Error::ConfigError(msg) => write!(f, "config error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			Error::Aggregate { source, .. } => Some(source.as_ref()),
			_ => None,
		}
	}
}

fn text_response(status: StatusCode, body: String) -> Response {
	(status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		match self {
			Error::NotFound => text_response(StatusCode::NOT_FOUND, "rules file not found\n".into()),
			Error::ValidationError(errs) => {
				let mut body = String::from("request body failed rule group validation\n");
				for err in &errs {
					body.push_str(err);
					body.push('\n');
				}
				text_response(StatusCode::BAD_REQUEST, body)
			}
			Error::InvalidTenant(msg) => {
				text_response(StatusCode::BAD_REQUEST, format!("invalid tenant: {}\n", msg))
			}
			Error::Timeout => {
				text_response(StatusCode::GATEWAY_TIMEOUT, "bucket operation timed out\n".into())
			}
			Error::Aggregate { .. } => text_response(
				StatusCode::INTERNAL_SERVER_ERROR,
				"failed retrieving all rules\n".into(),
			),
			Error::Backend(_) | Error::Io(_) => text_response(
				StatusCode::INTERNAL_SERVER_ERROR,
				"rules file bucket operation failed\n".into(),
			),
			Error::ConfigError(_) | Error::Internal(_) => {
				StatusCode::INTERNAL_SERVER_ERROR.into_response()
			}
		}
	}
}


// vim: ts=4

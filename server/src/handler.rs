//! Rule file API handlers

use axum::{
	body::Bytes,
	extract::{Path, State},
	http::{StatusCode, header},
	response::IntoResponse,
};

use rules_objstore_core::aggregate_all_yaml;

use crate::prelude::*;

const YAML_CONTENT_TYPE: &str = "application/yaml";

fn parse_tenant(tenant: &str) -> ClResult<TenantId> {
	TenantId::new(tenant).inspect_err(|err| debug!("rejected tenant ID: {}", err))
}

/// GET /api/v1/rules/{tenant}
pub async fn list_rules(
	State(app): State<App>,
	Path(tenant): Path<Box<str>>,
) -> ClResult<impl IntoResponse> {
	let tenant = parse_tenant(&tenant)?;
	let data = app.store.read(&tenant).await?;

	Ok((StatusCode::OK, [(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], Vec::from(data)))
}

/// PUT /api/v1/rules/{tenant}
///
/// The body is stored verbatim once it passes validation.
pub async fn set_rules(
	State(app): State<App>,
	Path(tenant): Path<Box<str>>,
	body: Bytes,
) -> ClResult<impl IntoResponse> {
	let tenant = parse_tenant(&tenant)?;
	app.store.write(&tenant, &body).await?;

	Ok((StatusCode::OK, "successfully updated rules file\n"))
}

/// GET /api/v1/rules
pub async fn list_all_rules(State(app): State<App>) -> ClResult<impl IntoResponse> {
	let yaml = aggregate_all_yaml(&app.store, app.opts.aggregate_concurrency)
		.await
		.inspect_err(|err| error!("failed retrieving all rules: {}", err))?;

	Ok((StatusCode::OK, [(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], yaml))
}

// vim: ts=4

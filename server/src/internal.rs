//! Health and metrics endpoints served on the internal listener

use axum::{
	extract::State,
	http::{StatusCode, header},
	response::IntoResponse,
};

use rules_objstore_core::key::RULES_BASE_PATH;

use crate::prelude::*;

pub async fn get_live() -> &'static str {
	"ok\n"
}

/// Ready once the bucket answers a listing under the rules prefix
pub async fn get_ready(State(app): State<App>) -> impl IntoResponse {
	let res = tokio::time::timeout(app.opts.op_timeout, app.store.bucket().list(RULES_BASE_PATH))
		.await
		.map_err(Error::from)
		.and_then(|res| res);

	match res {
		Ok(_) => (StatusCode::OK, "ok\n"),
		Err(err) => {
			warn!("readiness check failed: {}", err);
			(StatusCode::SERVICE_UNAVAILABLE, "bucket unavailable\n")
		}
	}
}

pub async fn get_metrics(State(app): State<App>) -> impl IntoResponse {
	(
		StatusCode::OK,
		[(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
		app.metrics.render(),
	)
}

// vim: ts=4

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::trace::TraceLayer;

use crate::prelude::*;
use crate::{handler, internal};

fn init_api(app: App) -> Router {
	let max_body_size = app.opts.max_body_size;

	Router::new()
		.route("/api/v1/rules", get(handler::list_all_rules))
		.route("/api/v1/rules/{tenant}", get(handler::list_rules).put(handler::set_rules))
		.layer(DefaultBodyLimit::max(max_body_size))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

fn init_internal(app: App) -> Router {
	Router::new()
		.route("/health/live", get(internal::get_live))
		.route("/health/ready", get(internal::get_ready))
		.route("/metrics", get(internal::get_metrics))
		.with_state(app)
}

/// Returns the API router and the internal (health, metrics) router
pub fn init(app: App) -> (Router, Router) {
	(init_api(app.clone()), init_internal(app))
}

// vim: ts=4

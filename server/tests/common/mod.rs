//! Test app builders and request helpers
//!
//! Every app gets its own filesystem bucket in a fresh `TempDir`; the
//! `TempDir` is returned alongside so the bucket lives until the test ends.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
	Router,
	body::{Body, to_bytes},
	http::{Method, Request, StatusCode},
};
use tempfile::TempDir;
use tower::ServiceExt;

use rules_objstore::{App, AppBuilder, routes};
use rules_objstore_bucket_adapter_fs::BucketAdapterFs;

pub const SAMPLE_RULES: &str = r#"
groups:
  - name: test-oidc
    interval: 5s
    rules:
      - record: trs
        expr: vector(1)
      - alert: HighRequestLatency
        expr: job:request_latency_seconds:mean5m{job="myjob"} > 0.5
        for: 10m
        labels:
          severity: page
        annotations:
          summary: High request latency"#;

pub const INVALID_RULES: &str = r"
groups:
  - name: test-oidc
    interval: 5s
    rules:
      - record: trs
        expr: vector(1)
      - invalid: property";

/// Optional tracing output for debugging a single test
pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

pub async fn create_test_app() -> (App, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp dir");
	let bucket = BucketAdapterFs::new(temp_dir.path().into())
		.await
		.expect("Failed to create bucket adapter");

	let mut builder = AppBuilder::new();
	builder.bucket_adapter(Arc::new(bucket));
	let app = builder.build().expect("Failed to build app");
	(app, temp_dir)
}

pub fn api_router(app: &App) -> Router {
	routes::init(app.clone()).0
}

pub fn internal_router(app: &App) -> Router {
	routes::init(app.clone()).1
}

pub struct TestResponse {
	pub status: StatusCode,
	pub content_type: Option<String>,
	pub body: String,
}

pub async fn send(router: Router, method: Method, uri: &str, body: impl Into<Body>) -> TestResponse {
	let req = Request::builder()
		.method(method)
		.uri(uri)
		.body(body.into())
		.expect("Failed to build request");
	let res = router.oneshot(req).await.expect("Request failed");

	let status = res.status();
	let content_type = res
		.headers()
		.get("content-type")
		.and_then(|v| v.to_str().ok())
		.map(ToString::to_string);
	let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("Failed to read body");
	TestResponse { status, content_type, body: String::from_utf8_lossy(&bytes).into_owned() }
}

pub async fn get(router: Router, uri: &str) -> TestResponse {
	send(router, Method::GET, uri, Body::empty()).await
}

pub async fn put(router: Router, uri: &str, body: &str) -> TestResponse {
	send(router, Method::PUT, uri, body.to_string()).await
}

// vim: ts=4

//! Rules API and internal endpoint tests
//!
//! Runs the routers in-process against a filesystem bucket

mod common;

use axum::http::StatusCode;

use common::*;
use rules_objstore_core::rulefmt;

#[tokio::test]
async fn test_put_then_get_returns_same_bytes() {
	let (app, temp_dir) = create_test_app().await;

	let res = put(api_router(&app), "/api/v1/rules/tenant_a", SAMPLE_RULES).await;
	assert_eq!(res.status, StatusCode::OK);
	assert_eq!(res.body, "successfully updated rules file\n");
	assert!(temp_dir.path().join("metrics/rules/tenant_a/rules.yaml").is_file());

	let res = get(api_router(&app), "/api/v1/rules/tenant_a").await;
	assert_eq!(res.status, StatusCode::OK);
	assert_eq!(res.content_type.as_deref(), Some("application/yaml"));
	assert_eq!(res.body, SAMPLE_RULES);
}

#[tokio::test]
async fn test_get_unknown_tenant_is_404() {
	let (app, _temp_dir) = create_test_app().await;

	let res = get(api_router(&app), "/api/v1/rules/nobody").await;
	assert_eq!(res.status, StatusCode::NOT_FOUND);
	assert_eq!(res.body, "rules file not found\n");
}

#[tokio::test]
async fn test_invalid_body_is_rejected_and_previous_kept() {
	let (app, _temp_dir) = create_test_app().await;
	put(api_router(&app), "/api/v1/rules/tenant_a", SAMPLE_RULES).await;

	let res = put(api_router(&app), "/api/v1/rules/tenant_a", INVALID_RULES).await;
	assert_eq!(res.status, StatusCode::BAD_REQUEST);
	assert!(res.body.starts_with("request body failed rule group validation\n"));
	assert!(res.body.contains("invalid"), "{}", res.body);

	let res = get(api_router(&app), "/api/v1/rules/tenant_a").await;
	assert_eq!(res.status, StatusCode::OK);
	assert_eq!(res.body, SAMPLE_RULES);
}

#[tokio::test]
async fn test_rejected_write_creates_nothing() {
	let (app, _temp_dir) = create_test_app().await;

	let res = put(api_router(&app), "/api/v1/rules/tenant_a", "groups: [").await;
	assert_eq!(res.status, StatusCode::BAD_REQUEST);

	let res = get(api_router(&app), "/api/v1/rules/tenant_a").await;
	assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_body_is_accepted() {
	let (app, _temp_dir) = create_test_app().await;

	let res = put(api_router(&app), "/api/v1/rules/tenant_a", "").await;
	assert_eq!(res.status, StatusCode::OK);

	let res = get(api_router(&app), "/api/v1/rules/tenant_a").await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.is_empty());
}

#[tokio::test]
async fn test_invalid_tenant_is_rejected() {
	let (app, temp_dir) = create_test_app().await;

	for uri in [
		"/api/v1/rules/%2E%2E",
		"/api/v1/rules/a%2Fb",
		"/api/v1/rules/a%20b",
		"/api/v1/rules/a.b",
	] {
		let res = put(api_router(&app), uri, SAMPLE_RULES).await;
		assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", uri);
	}
	assert!(!temp_dir.path().join("metrics").exists());
}

#[tokio::test]
async fn test_list_all_rules_prefixes_group_names() {
	let (app, _temp_dir) = create_test_app().await;
	put(api_router(&app), "/api/v1/rules/tenant_b", SAMPLE_RULES).await;
	put(api_router(&app), "/api/v1/rules/tenant_a", SAMPLE_RULES).await;

	let res = get(api_router(&app), "/api/v1/rules").await;
	assert_eq!(res.status, StatusCode::OK);
	assert_eq!(res.content_type.as_deref(), Some("application/yaml"));

	let doc = rulefmt::parse(res.body.as_bytes()).expect("aggregate is a valid rule file");
	let names: Vec<&str> = doc.groups.iter().map(|g| g.name.as_str()).collect();
	assert_eq!(names, ["tenant_a.test-oidc", "tenant_b.test-oidc"]);
	assert_eq!(doc.rule_count(), 4);
}

#[tokio::test]
async fn test_list_all_rules_empty_bucket() {
	let (app, _temp_dir) = create_test_app().await;

	let res = get(api_router(&app), "/api/v1/rules").await;
	assert_eq!(res.status, StatusCode::OK);
	let doc = rulefmt::parse(res.body.as_bytes()).expect("parse");
	assert!(doc.groups.is_empty());
}

#[tokio::test]
async fn test_list_all_rules_fails_on_corrupt_tenant() {
	let (app, temp_dir) = create_test_app().await;
	put(api_router(&app), "/api/v1/rules/tenant_a", SAMPLE_RULES).await;

	let dir = temp_dir.path().join("metrics/rules/broken");
	std::fs::create_dir_all(&dir).expect("mkdir");
	std::fs::write(dir.join("rules.yaml"), INVALID_RULES).expect("write");

	let res = get(api_router(&app), "/api/v1/rules").await;
	assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(res.body, "failed retrieving all rules\n");
}

#[tokio::test]
async fn test_health_endpoints() {
	let (app, _temp_dir) = create_test_app().await;

	let res = get(internal_router(&app), "/health/live").await;
	assert_eq!(res.status, StatusCode::OK);

	let res = get(internal_router(&app), "/health/ready").await;
	assert_eq!(res.status, StatusCode::OK);

	// the API listener does not serve internal routes
	let res = get(api_router(&app), "/metrics").await;
	assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_track_validations() {
	let (app, _temp_dir) = create_test_app().await;
	put(api_router(&app), "/api/v1/rules/tenant_a", SAMPLE_RULES).await;
	put(api_router(&app), "/api/v1/rules/tenant_a", INVALID_RULES).await;

	let res = get(internal_router(&app), "/metrics").await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("rules_objstore_validations_total{tenant=\"tenant_a\"} 1"));
	assert!(res.body.contains("rules_objstore_validation_failures_total{tenant=\"tenant_a\"} 1"));
	assert!(res.body.contains("rules_objstore_rule_groups_configured{tenant=\"tenant_a\"} 1"));
	assert!(res.body.contains("rules_objstore_rules_configured{tenant=\"tenant_a\"} 2"));
}

#[tokio::test]
async fn test_build_requires_bucket_adapter() {
	let res = rules_objstore::AppBuilder::new().build();
	assert!(res.is_err());
}

// vim: ts=4

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use clip_api::{routes, state::AppState};
use clip_testkit::{TEST_TOKEN, TestStore};

fn app(harness: &TestStore) -> Router {
	routes::router(AppState::new(harness.config().clone()))
}

fn get(uri: &str) -> Request<Body> {
	Request::builder()
		.uri(uri)
		.header("authorization", format!("Bearer {TEST_TOKEN}"))
		.body(Body::empty())
		.unwrap()
}

fn get_as(uri: &str, tenant: &str) -> Request<Body> {
	Request::builder()
		.uri(uri)
		.header("authorization", format!("Bearer {TEST_TOKEN}"))
		.header("x-user-id", tenant)
		.body(Body::empty())
		.unwrap()
}

fn post_note(payload: &Value, tenant: &str) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri("/notes")
		.header("authorization", format!("Bearer {TEST_TOKEN}"))
		.header("x-user-id", tenant)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.unwrap()
}

async fn json_of(response: axum::response::Response) -> Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

	serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_needs_no_auth() {
	let harness = TestStore::new().unwrap();
	let response = app(&harness)
		.oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_of(response).await;

	assert_eq!(json["ok"], true);
	assert_eq!(json["provider"], "local");
}

#[tokio::test]
async fn note_routes_require_a_bearer_token() {
	let harness = TestStore::new().unwrap();
	let app = app(&harness);
	let missing = app
		.clone()
		.oneshot(Request::builder().uri("/notes").body(Body::empty()).unwrap())
		.await
		.unwrap();

	assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

	let wrong = app
		.oneshot(
			Request::builder()
				.uri("/notes")
				.header("authorization", "Bearer wrong-token")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

	let json = json_of(wrong).await;

	assert_eq!(json["error_code"], "unauthorized");
}

#[tokio::test]
async fn save_list_search_delete_round_trip() {
	let harness = TestStore::new().unwrap();
	let app = app(&harness);
	let payload = serde_json::json!({
		"content": "Ownership moves values by default.",
		"tags": ["rust"],
	});
	let saved = app.clone().oneshot(post_note(&payload, "alice")).await.unwrap();

	assert_eq!(saved.status(), StatusCode::OK);

	let note = json_of(saved).await;
	let id = note["id"].as_str().unwrap().to_string();

	assert_eq!(note["tenant"], "alice");
	assert_eq!(note["tags"][0], "rust");
	assert!(note["dedup_key"].as_str().unwrap().contains('@'));

	let listed = app.clone().oneshot(get_as("/notes", "alice")).await.unwrap();

	assert_eq!(listed.status(), StatusCode::OK);

	let listed = json_of(listed).await;

	assert_eq!(listed["count"], 1);
	assert_eq!(listed["items"][0]["id"], id.as_str());

	let found =
		app.clone().oneshot(get_as("/notes/search?q=ownership", "alice")).await.unwrap();

	assert_eq!(found.status(), StatusCode::OK);

	let found = json_of(found).await;

	assert_eq!(found["count"], 1);

	let deleted = app
		.clone()
		.oneshot(
			Request::builder()
				.method("DELETE")
				.uri(format!("/notes/{id}"))
				.header("authorization", format!("Bearer {TEST_TOKEN}"))
				.header("x-user-id", "alice")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(deleted.status(), StatusCode::OK);

	let deleted = json_of(deleted).await;

	assert_eq!(deleted["deleted"], true);
	assert_eq!(deleted["id"], id.as_str());

	let again = app
		.oneshot(
			Request::builder()
				.method("DELETE")
				.uri(format!("/notes/{id}"))
				.header("authorization", format!("Bearer {TEST_TOKEN}"))
				.header("x-user-id", "alice")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn save_rejects_invalid_payloads() {
	let harness = TestStore::new().unwrap();
	let app = app(&harness);
	let empty = app
		.clone()
		.oneshot(post_note(&serde_json::json!({ "content": "" }), "alice"))
		.await
		.unwrap();

	assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

	let json = json_of(empty).await;

	assert_eq!(json["error_code"], "invalid_request");

	let tags: Vec<String> = (0..21).map(|i| format!("tag{i}")).collect();
	let too_many = app
		.oneshot(post_note(&serde_json::json!({ "content": "ok", "tags": tags }), "alice"))
		.await
		.unwrap();

	assert_eq!(too_many.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_and_search_limits_are_bounded() {
	let harness = TestStore::new().unwrap();
	let app = app(&harness);

	for uri in
		["/notes?limit=0", "/notes?limit=51", "/notes/search?q=x&limit=0", "/notes/search?q=x&limit=101"]
	{
		let response = app.clone().oneshot(get(uri)).await.unwrap();

		assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
	}

	let long_q = format!("/notes/search?q={}", "x".repeat(201));
	let response = app.clone().oneshot(get(&long_q)).await.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let empty_q = app.oneshot(get("/notes/search?q=")).await.unwrap();

	assert_eq!(empty_q.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tenants_are_isolated_by_header() {
	let harness = TestStore::new().unwrap();
	let app = app(&harness);
	let payload = serde_json::json!({ "content": "alice private note" });

	app.clone().oneshot(post_note(&payload, "alice")).await.unwrap();

	let bob = json_of(app.clone().oneshot(get_as("/notes", "bob")).await.unwrap()).await;

	assert_eq!(bob["count"], 0);

	// No header falls back to the configured default tenant.
	let default = json_of(app.oneshot(get("/notes")).await.unwrap()).await;

	assert_eq!(default["count"], 0);
}

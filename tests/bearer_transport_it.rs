// crates.io
use httpmock::prelude::*;
use oauth2::http::{HeaderValue, Method, Request, header::AUTHORIZATION};
// self
use spotify_mcp::{_preludet::*, http::HttpRequest};

const CLIENT_ID: &str = "bearer-client";
const CLIENT_SECRET: &str = "bearer-secret";

async fn mock_token<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	let body = format!(
		"{{\"access_token\":\"{token}\",\"token_type\":\"Bearer\",\"expires_in\":3600}}"
	);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200).header("content-type", "application/json").body(&body);
		})
		.await
}

fn request(server: &MockServer, path: &str) -> HttpRequest {
	Request::builder()
		.method(Method::GET)
		.uri(server.url(path))
		.header("x-trace", "1")
		.body(Vec::new())
		.expect("Fixture request should build.")
}

#[tokio::test]
async fn outbound_requests_carry_the_bearer_token_and_the_original_is_untouched() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "fresh-token").await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/me")
				.header("authorization", "Bearer fresh-token")
				.header("x-trace", "1");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let manager = build_reqwest_test_manager(&server.url("/api/token"), CLIENT_ID, CLIENT_SECRET);
	let client =
		manager.authenticated_client().await.expect("Authenticated client should be created.");
	let original = request(&server, "/v1/me");
	let response = client.send(&original).await.expect("Decorated request should succeed.");

	assert_eq!(response.status().as_u16(), 200);
	assert_eq!(
		original.headers().get("x-trace").and_then(|value| value.to_str().ok()),
		Some("1")
	);
	assert!(original.headers().get(AUTHORIZATION).is_none());

	token.assert_async().await;
	api.assert_async().await;
}

#[tokio::test]
async fn caller_supplied_authorization_is_replaced() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "fresh-token").await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me").header("authorization", "Bearer fresh-token");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let manager = build_reqwest_test_manager(&server.url("/api/token"), CLIENT_ID, CLIENT_SECRET);
	let client =
		manager.authenticated_client().await.expect("Authenticated client should be created.");
	let mut original = request(&server, "/v1/me");

	original.headers_mut().insert(AUTHORIZATION, HeaderValue::from_static("Bearer stale-token"));

	client.send(&original).await.expect("Decorated request should succeed.");

	assert_eq!(
		original.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()),
		Some("Bearer stale-token")
	);

	token.assert_async().await;
	api.assert_async().await;
}

#[tokio::test]
async fn clients_share_the_cached_token() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "shared-token").await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me").header("authorization", "Bearer shared-token");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let manager = build_reqwest_test_manager(&server.url("/api/token"), CLIENT_ID, CLIENT_SECRET);
	let url = Url::parse(&server.url("/v1/me")).expect("Mock API URL should parse.");

	for _ in 0..3 {
		let client =
			manager.authenticated_client().await.expect("Authenticated client should be created.");

		client.get(&url).await.expect("GET through the authenticated client should succeed.");
	}

	token.assert_calls_async(1).await;
	api.assert_calls_async(3).await;
}

#[tokio::test]
async fn api_transport_failures_map_to_transport_errors() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "fresh-token").await;
	let manager = build_reqwest_test_manager(&server.url("/api/token"), CLIENT_ID, CLIENT_SECRET);
	let client =
		manager.authenticated_client().await.expect("Authenticated client should be created.");
	// Nothing listens on the discard port.
	let url = Url::parse("http://127.0.0.1:9/v1/me").expect("Fixture URL should parse.");
	let err = client.get(&url).await.expect_err("A closed port should surface an error.");

	assert!(matches!(err, Error::Transport(_)));

	token.assert_async().await;
}

//! Credential manager that caches a client-credentials bearer token and refreshes it lazily.
//!
//! The cache moves through three states ([`TokenStatus`]): `Empty` until the first successful
//! refresh, `Valid` until the local expiry instant (provider lifetime minus 60 seconds), and
//! `Expired` afterwards. Expiry is detected on the next call; no timer runs. A failed refresh
//! leaves the cache exactly as it was, and [`CredentialManager::invalidate`] returns it to
//! `Empty`.
//!
//! Concurrent callers that observe an empty or expired cache may each refresh; the last grant to
//! land wins. The lock guarding the cache is never held across an `.await`.

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, ClientCredentials, TokenSecret, TokenStatus},
	error::ConfigError,
	http::{AuthenticatedClient, BearerTransport, HttpTransport},
	oauth::TokenEndpoint,
	obs::{self, CredentialSpan, TokenOutcome},
};
#[cfg(feature = "reqwest")]
use crate::{config::SpotifyConfig, http::ReqwestTransport};

/// Manager specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestCredentialManager = CredentialManager<ReqwestTransport>;

/// Provides valid bearer tokens on demand with as few token endpoint round trips as possible.
pub struct CredentialManager<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	endpoint: TokenEndpoint,
	cached: Mutex<Option<CachedToken>>,
}
impl<T> CredentialManager<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a manager with an empty cache that exchanges `credentials` at `token_url` over
	/// `transport`.
	pub fn with_transport(
		token_url: Url,
		credentials: ClientCredentials,
		transport: impl Into<Arc<T>>,
	) -> Result<Self, ConfigError> {
		let endpoint = TokenEndpoint::new(token_url, &credentials)?;

		Ok(Self { transport: transport.into(), endpoint, cached: Mutex::new(None) })
	}

	/// Returns the shared transport used for token requests and authenticated clients.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	/// Returns a valid bearer token, refreshing it first if the cache is empty or expired.
	pub async fn token(&self) -> Result<TokenSecret> {
		self.token_at(OffsetDateTime::now_utc()).await
	}

	/// Same as [`CredentialManager::token`], evaluated at `now`.
	///
	/// A fresh grant is stamped as issued at `now`.
	pub async fn token_at(&self, now: OffsetDateTime) -> Result<TokenSecret> {
		if let Some(token) = self.cached_token_at(now) {
			obs::observe(TokenOutcome::CacheHit, &"Reusing cached bearer token.");

			return Ok(token);
		}

		CredentialSpan::new("refresh")
			.instrument(async move {
				match self.refresh_at(now).await {
					Ok((token, expires_at)) => {
						obs::observe(
							TokenOutcome::Refresh,
							&format_args!("Bearer token refreshed; valid until {expires_at}."),
						);

						Ok(token)
					},
					Err(e) => {
						obs::observe(
							TokenOutcome::Failure,
							&format_args!("Bearer token refresh failed: {e}"),
						);

						Err(e)
					},
				}
			})
			.await
	}

	/// Returns `true` iff a token is cached and has not reached its expiry instant.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Same as [`CredentialManager::is_valid`], evaluated at `now`.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		self.cached.lock().as_ref().is_some_and(|token| token.is_valid_at(now))
	}

	/// Reports the cache state at `now`.
	pub fn status_at(&self, now: OffsetDateTime) -> TokenStatus {
		TokenStatus::of(self.cached.lock().as_ref(), now)
	}

	/// Clears the cache so the next call refreshes.
	pub fn invalidate(&self) {
		*self.cached.lock() = None;
	}

	/// Returns a client whose requests carry `Authorization: Bearer <token>`.
	///
	/// Errors from [`CredentialManager::token`] are returned unchanged.
	pub async fn authenticated_client(&self) -> Result<AuthenticatedClient<T>> {
		let token = self.token().await?;
		let transport = BearerTransport::new(Arc::clone(&self.transport), &token)?;

		Ok(AuthenticatedClient::new(transport))
	}

	fn cached_token_at(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		self.cached
			.lock()
			.as_ref()
			.filter(|token| token.is_valid_at(now))
			.map(|token| token.access_token.clone())
	}

	async fn refresh_at(&self, now: OffsetDateTime) -> Result<(TokenSecret, OffsetDateTime)> {
		let grant = self.endpoint.exchange(&self.transport).await?;
		let cached = CachedToken::from_grant(grant, now)?;
		let issued = (cached.access_token.clone(), cached.expires_at);

		*self.cached.lock() = Some(cached);

		Ok(issued)
	}
}
#[cfg(feature = "reqwest")]
impl CredentialManager<ReqwestTransport> {
	/// Creates a manager backed by a fresh [`ReqwestTransport`] (30 second timeout).
	pub fn new(token_url: Url, credentials: ClientCredentials) -> Result<Self, ConfigError> {
		Self::with_transport(token_url, credentials, ReqwestTransport::new()?)
	}

	/// Creates a manager for the token endpoint and credential pair in `config`.
	pub fn from_config(config: &SpotifyConfig) -> Result<Self, ConfigError> {
		Self::new(config.token_url.clone(), config.credentials())
	}
}
impl<T> Debug for CredentialManager<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialManager")
			.field("endpoint", &self.endpoint)
			.field("status", &self.status_at(OffsetDateTime::now_utc()))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::VecDeque;
	// crates.io
	use base64::{Engine, engine::general_purpose::STANDARD};
	use oauth2::http::{
		HeaderValue, Method, StatusCode,
		header::{AUTHORIZATION, CONTENT_TYPE},
	};
	use time::macros;
	// self
	use super::*;
	use crate::{
		error::DecodeError,
		http::{HttpRequest, HttpResponse, TransportFuture, copy_request},
	};

	const T0: OffsetDateTime = macros::datetime!(2025-01-01 00:00 UTC);

	#[derive(Default)]
	struct ScriptedTransport {
		responses: Mutex<VecDeque<(u16, &'static str)>>,
		requests: Mutex<Vec<HttpRequest>>,
	}
	impl ScriptedTransport {
		fn with(responses: impl IntoIterator<Item = (u16, &'static str)>) -> Arc<Self> {
			Arc::new(Self {
				responses: Mutex::new(responses.into_iter().collect()),
				requests: Mutex::default(),
			})
		}

		fn calls(&self) -> usize {
			self.requests.lock().len()
		}
	}
	impl HttpTransport for ScriptedTransport {
		type Error = std::io::Error;

		fn execute<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a, Self::Error> {
			self.requests.lock().push(copy_request(request));

			let next = self.responses.lock().pop_front();

			Box::pin(async move {
				let (status, body) =
					next.ok_or_else(|| std::io::Error::other("No scripted response left."))?;
				let mut response = HttpResponse::new(body.as_bytes().to_vec());

				*response.status_mut() =
					StatusCode::from_u16(status).expect("Scripted status should be valid.");
				response
					.headers_mut()
					.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

				Ok(response)
			})
		}
	}

	fn grant_body(expires_in: i64) -> &'static str {
		match expires_in {
			30 => "{\"access_token\":\"short\",\"token_type\":\"Bearer\",\"expires_in\":30}",
			120 => "{\"access_token\":\"two-min\",\"token_type\":\"Bearer\",\"expires_in\":120}",
			_ => "{\"access_token\":\"one-hour\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
		}
	}

	fn manager(transport: &Arc<ScriptedTransport>) -> CredentialManager<ScriptedTransport> {
		CredentialManager::with_transport(
			Url::parse("https://accounts.example.com/api/token")
				.expect("Fixture token URL should parse."),
			ClientCredentials::new("client-id", "client-secret"),
			Arc::clone(transport),
		)
		.expect("Manager should build from fixture values.")
	}

	#[tokio::test]
	async fn token_request_uses_basic_auth_and_form_body() {
		let transport = ScriptedTransport::with([(200, grant_body(3600))]);
		let manager = manager(&transport);
		let token = manager.token_at(T0).await.expect("Scripted grant should succeed.");

		assert_eq!(token.expose(), "one-hour");

		let requests = transport.requests.lock();
		let request = requests.first().expect("One token request should be recorded.");
		let expected = format!("Basic {}", STANDARD.encode("client-id:client-secret"));

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri(), "https://accounts.example.com/api/token");
		assert_eq!(
			request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()),
			Some(expected.as_str())
		);
		assert_eq!(
			request.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
			Some("application/x-www-form-urlencoded")
		);
		assert_eq!(request.body().as_slice(), b"grant_type=client_credentials");
	}

	#[tokio::test]
	async fn valid_cache_is_served_without_io() {
		let transport = ScriptedTransport::with([(200, grant_body(3600))]);
		let manager = manager(&transport);

		manager.token_at(T0).await.expect("First call should refresh.");

		for offset in [0, 60, 3539] {
			let token = manager
				.token_at(T0 + Duration::seconds(offset))
				.await
				.expect("Cached token should be served.");

			assert_eq!(token.expose(), "one-hour");
		}

		assert_eq!(transport.calls(), 1);
	}

	#[tokio::test]
	async fn validity_window_ends_sixty_seconds_early() {
		let transport = ScriptedTransport::with([(200, grant_body(3600)), (200, grant_body(3600))]);
		let manager = manager(&transport);

		assert_eq!(manager.status_at(T0), TokenStatus::Empty);

		manager.token_at(T0).await.expect("First call should refresh.");

		assert!(manager.is_valid_at(T0));
		assert!(manager.is_valid_at(T0 + Duration::seconds(3539)));
		assert!(!manager.is_valid_at(T0 + Duration::seconds(3540)));
		assert_eq!(manager.status_at(T0 + Duration::seconds(3540)), TokenStatus::Expired);

		manager
			.token_at(T0 + Duration::seconds(3540))
			.await
			.expect("Expired cache should refresh.");

		assert_eq!(transport.calls(), 2);
	}

	#[tokio::test]
	async fn invalidate_forces_exactly_one_refresh() {
		let transport = ScriptedTransport::with([(200, grant_body(3600)), (200, grant_body(3600))]);
		let manager = manager(&transport);

		manager.token_at(T0).await.expect("First call should refresh.");
		manager.invalidate();

		assert!(!manager.is_valid_at(T0));
		assert_eq!(manager.status_at(T0), TokenStatus::Empty);

		manager.token_at(T0).await.expect("Call after invalidate should refresh.");
		manager.token_at(T0).await.expect("Follow-up call should hit the cache.");

		assert_eq!(transport.calls(), 2);
	}

	#[tokio::test]
	async fn rejected_credentials_leave_the_cache_empty() {
		let transport = ScriptedTransport::with([(401, "{\"error\":\"invalid_client\"}")]);
		let manager = manager(&transport);
		let err = manager.token_at(T0).await.expect_err("A 401 must surface as an error.");

		match err {
			Error::AuthRejected { status, body } => {
				assert_eq!(status, 401);
				assert_eq!(body, "{\"error\":\"invalid_client\"}");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert_eq!(manager.status_at(T0), TokenStatus::Empty);
	}

	#[tokio::test]
	async fn short_lifetimes_refresh_on_the_next_call() {
		let transport = ScriptedTransport::with([(200, grant_body(30)), (200, grant_body(3600))]);
		let manager = manager(&transport);
		let first = manager.token_at(T0).await.expect("Short grant should still be returned.");

		assert_eq!(first.expose(), "short");
		assert!(!manager.is_valid_at(T0));

		let second = manager.token_at(T0).await.expect("Next call should refresh.");

		assert_eq!(second.expose(), "one-hour");
		assert_eq!(transport.calls(), 2);
	}

	#[tokio::test]
	async fn failed_refresh_keeps_the_stale_token_cached() {
		let transport = ScriptedTransport::with([
			(200, grant_body(120)),
			(503, "upstream unavailable"),
			(200, grant_body(3600)),
		]);
		let manager = manager(&transport);
		let later = T0 + Duration::seconds(61);

		manager.token_at(T0).await.expect("First call should refresh.");

		let err = manager.token_at(later).await.expect_err("A 503 must surface as an error.");

		assert!(matches!(err, Error::AuthRejected { status: 503, .. }));
		assert_eq!(manager.status_at(later), TokenStatus::Expired);
		assert!(!manager.is_valid_at(later));

		let token = manager.token_at(later).await.expect("The next call should retry.");

		assert_eq!(token.expose(), "one-hour");
		assert_eq!(transport.calls(), 3);
	}

	#[tokio::test]
	async fn malformed_success_payload_is_a_decode_error() {
		let transport = ScriptedTransport::with([(200, "{\"token_type\":\"Bearer\"}")]);
		let manager = manager(&transport);
		let err = manager.token_at(T0).await.expect_err("Missing fields must fail decoding.");

		assert!(matches!(err, Error::Decode(DecodeError::TokenResponse { .. })));
		assert_eq!(manager.status_at(T0), TokenStatus::Empty);
	}

	#[tokio::test]
	async fn missing_expires_in_is_a_decode_error() {
		let transport =
			ScriptedTransport::with([(200, "{\"access_token\":\"x\",\"token_type\":\"Bearer\"}")]);
		let manager = manager(&transport);
		let err = manager.token_at(T0).await.expect_err("Missing expires_in must fail decoding.");

		assert!(matches!(err, Error::Decode(DecodeError::MissingExpiresIn)));
	}

	#[tokio::test]
	async fn transport_failures_surface_without_retry() {
		let transport = ScriptedTransport::with([]);
		let manager = manager(&transport);
		let err = manager.token_at(T0).await.expect_err("Transport errors must surface.");

		assert!(matches!(err, Error::Transport(_)));
		assert_eq!(transport.calls(), 1);
	}

	#[tokio::test]
	async fn authenticated_client_propagates_token_errors() {
		let transport = ScriptedTransport::with([(400, "{\"error\":\"invalid_request\"}")]);
		let manager = manager(&transport);
		let err = manager
			.authenticated_client()
			.await
			.expect_err("Token errors must reach the caller unchanged.");

		assert!(matches!(err, Error::AuthRejected { status: 400, .. }));
	}
}

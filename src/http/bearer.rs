//! Bearer-token decorating transport and the authenticated client built on top of it.

// crates.io
use oauth2::http::{
	HeaderValue, Method,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, TransportError},
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture, copy_request},
};

const APPLICATION_JSON: &str = "application/json";

/// Transport decorator that attaches `Authorization: Bearer <token>` to every request.
///
/// The header is set on a copy of each request, replacing any authorization value the caller
/// put there, and the copy is handed to the wrapped transport. The caller's request is never
/// touched.
pub struct BearerTransport<T>
where
	T: ?Sized + HttpTransport,
{
	inner: Arc<T>,
	authorization: HeaderValue,
}
impl<T> BearerTransport<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wraps `inner` so every request carries `token`.
	pub fn new(inner: Arc<T>, token: &TokenSecret) -> Result<Self, ConfigError> {
		let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
			.map_err(oauth2::http::Error::from)?;

		authorization.set_sensitive(true);

		Ok(Self { inner, authorization })
	}

	/// Returns the wrapped transport.
	pub fn inner(&self) -> &Arc<T> {
		&self.inner
	}
}
impl<T> Clone for BearerTransport<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner), authorization: self.authorization.clone() }
	}
}
impl<T> Debug for BearerTransport<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BearerTransport").field("authorization", &"Bearer <redacted>").finish()
	}
}
impl<T> HttpTransport for BearerTransport<T>
where
	T: ?Sized + HttpTransport,
{
	type Error = T::Error;

	fn execute<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a, Self::Error> {
		let mut decorated = copy_request(request);

		decorated.headers_mut().insert(AUTHORIZATION, self.authorization.clone());

		Box::pin(async move { self.inner.execute(&decorated).await })
	}
}

/// HTTP client returned by [`authenticated_client`].
///
/// [`authenticated_client`]: crate::manager::CredentialManager::authenticated_client
///
/// Requests issued through it inherit the bearer token that was current when the client was
/// created. Transport failures surface as [`Error::Transport`].
pub struct AuthenticatedClient<T>
where
	T: ?Sized + HttpTransport,
{
	transport: BearerTransport<T>,
}
impl<T> AuthenticatedClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wraps a decorated transport.
	pub fn new(transport: BearerTransport<T>) -> Self {
		Self { transport }
	}

	/// Returns the decorating transport, for callers that need the raw executor.
	pub fn transport(&self) -> &BearerTransport<T> {
		&self.transport
	}

	/// Sends a caller-built request. The request is left untouched.
	pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
		self.transport.execute(request).await.map_err(|e| TransportError::api(e).into())
	}

	/// Issues a `GET` that accepts JSON.
	pub async fn get(&self, url: &Url) -> Result<HttpResponse> {
		let request = build_request(Method::GET, url, None)?;

		self.send(&request).await
	}

	/// Issues a `POST` with a JSON body.
	pub async fn post_json<B>(&self, url: &Url, body: &B) -> Result<HttpResponse>
	where
		B: ?Sized + Serialize,
	{
		let payload = serde_json::to_vec(body).map_err(|e| Error::InvalidRequest {
			reason: format!("request body could not be serialized: {e}"),
		})?;
		let request = build_request(Method::POST, url, Some(payload))?;

		self.send(&request).await
	}
}
impl<T> Debug for AuthenticatedClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatedClient").field("transport", &self.transport).finish()
	}
}

fn build_request(method: Method, url: &Url, json: Option<Vec<u8>>) -> Result<HttpRequest> {
	let mut builder = oauth2::http::Request::builder()
		.method(method)
		.uri(url.as_str())
		.header(ACCEPT, APPLICATION_JSON);

	if json.is_some() {
		builder = builder.header(CONTENT_TYPE, APPLICATION_JSON);
	}

	builder.body(json.unwrap_or_default()).map_err(|e| ConfigError::from(e).into())
}

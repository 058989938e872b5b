//! Transport primitives shared by the token exchange and the Web API calls.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack: the token facade adapts it
//! into an `oauth2` client, and [`BearerTransport`] decorates it with the cached bearer token.
//! Implementations receive requests by reference, so callers keep ownership of what they built
//! and may reuse or resend it.

mod bearer;

pub use bearer::*;

// self
use crate::_prelude::*;

/// Outbound request type (an `http` request with an owned body).
pub type HttpRequest = oauth2::HttpRequest;
/// Inbound response type (an `http` response with an owned body).
pub type HttpResponse = oauth2::HttpResponse;

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstract request executor.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by the
/// credential manager and every authenticated client it hands out, and the futures they return
/// must be `Send` so tool handlers can hop executors.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type Error: 'static + Send + Sync + StdError;

	/// Sends `request` and buffers the full response body.
	fn execute<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a, Self::Error>;
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code of the response.
	pub status: u16,
	/// Truncated body text, captured for non-success responses.
	pub body_preview: Option<String>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// The token facade creates a fresh slot for each exchange and reads the captured metadata
/// immediately after `oauth2` resolves.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Maximum number of characters kept by [`body_preview`].
pub const BODY_PREVIEW_LIMIT: usize = 512;

/// Renders a response body as lossy UTF-8, truncated to [`BODY_PREVIEW_LIMIT`] characters.
pub fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

/// Copies method, URI, version, headers, and body into a new request.
///
/// Extensions are not carried over.
pub fn copy_request(request: &HttpRequest) -> HttpRequest {
	let mut copy = HttpRequest::new(request.body().clone());

	*copy.method_mut() = request.method().clone();
	*copy.uri_mut() = request.uri().clone();
	*copy.version_mut() = request.version();
	*copy.headers_mut() = request.headers().clone();

	copy
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`ReqwestTransport::new`] bounds every call with a 30 second timeout and disables redirect
/// following; token endpoints answer directly. Configure any custom [`ReqwestClient`] passed to
/// [`ReqwestTransport::with_client`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Request timeout applied by [`ReqwestTransport::new`].
	pub const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

	/// Builds a transport with the default timeout and redirect policy.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(Self::TIMEOUT)
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	type Error = ReqwestError;

	fn execute<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a, Self::Error> {
		Box::pin(async move {
			let outgoing = reqwest::Request::try_from(copy_request(request))?;
			let response = self.0.execute(outgoing).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

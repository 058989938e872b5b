//! Client-credentials exchange against the token endpoint.
//!
//! [`TokenEndpoint`] drives the grant through `oauth2`'s [`BasicClient`] (form-encoded
//! `grant_type=client_credentials`) while routing the request over the caller's
//! [`HttpTransport`]. The adapter sets `Authorization: Basic base64(client_id:client_secret)` from
//! the raw credential pair, without the form-encoding `oauth2` applies first, and records the
//! response status and a body preview so failures can be classified without re-reading the body:
//!
//! - transport failures become [`Error::Transport`];
//! - any status other than 200 becomes [`Error::AuthRejected`];
//! - malformed success payloads become [`Error::Decode`].

pub use oauth2;

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use oauth2::{
	AsyncHttpClient, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
	http::{HeaderValue, StatusCode, header::AUTHORIZATION},
};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenGrant, TokenSecret},
	error::{ConfigError, DecodeError, TransportError},
	http::{
		HttpRequest, HttpResponse, HttpTransport, ResponseMetadata, ResponseMetadataSlot,
		body_preview,
	},
};

/// Spotify's accounts service token endpoint.
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Token endpoint bound to one credential pair.
#[derive(Clone)]
pub struct TokenEndpoint {
	oauth_client: ConfiguredBasicClient,
	token_url: Url,
	authorization: HeaderValue,
}
impl TokenEndpoint {
	/// Builds an endpoint that authenticates with HTTP Basic `client_id:client_secret`.
	pub fn new(token_url: Url, credentials: &ClientCredentials) -> Result<Self, ConfigError> {
		let token_uri = TokenUrl::new(token_url.to_string())
			.map_err(|source| ConfigError::InvalidUrl { name: "token endpoint", source })?;
		let oauth_client = BasicClient::new(ClientId::new(credentials.client_id.clone()))
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_token_uri(token_uri);
		let authorization = basic_authorization(credentials)?;

		Ok(Self { oauth_client, token_url, authorization })
	}

	/// Returns the token endpoint URL.
	pub fn url(&self) -> &Url {
		&self.token_url
	}

	/// Performs one client-credentials exchange over `transport`. Never retries.
	pub async fn exchange<T>(&self, transport: &Arc<T>) -> Result<TokenGrant>
	where
		T: ?Sized + HttpTransport,
	{
		let meta = ResponseMetadataSlot::default();
		let handle = TransportHandle {
			transport: Arc::clone(transport),
			authorization: self.authorization.clone(),
			slot: meta.clone(),
		};
		let response = self
			.oauth_client
			.exchange_client_credentials()
			.request_async(&handle)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		map_token_response(response)
	}
}
impl Debug for TokenEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEndpoint")
			.field("token_url", &self.token_url.as_str())
			.field("client_id", self.oauth_client.client_id())
			.finish()
	}
}

/// [`AsyncHttpClient`] adapter that forwards `oauth2` requests to an [`HttpTransport`].
struct TransportHandle<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	authorization: HeaderValue,
	slot: ResponseMetadataSlot,
}
impl<'c, T> AsyncHttpClient<'c> for TransportHandle<T>
where
	T: ?Sized + HttpTransport,
{
	type Error = HttpClientError<T::Error>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, mut request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();
			request.headers_mut().insert(AUTHORIZATION, self.authorization.clone());

			let response = self
				.transport
				.execute(&request)
				.await
				.map_err(|e| HttpClientError::Reqwest(Box::new(e)))?;
			let status = response.status();
			let preview = (status != StatusCode::OK).then(|| body_preview(response.body()));

			self.slot.store(ResponseMetadata { status: status.as_u16(), body_preview: preview });

			Ok(response)
		})
	}
}

fn basic_authorization(credentials: &ClientCredentials) -> Result<HeaderValue, ConfigError> {
	let encoded = STANDARD
		.encode(format!("{}:{}", credentials.client_id, credentials.client_secret.expose()));
	let mut value =
		HeaderValue::from_str(&format!("Basic {encoded}")).map_err(oauth2::http::Error::from)?;

	value.set_sensitive(true);

	Ok(value)
}

fn map_token_response(response: BasicTokenResponse) -> Result<TokenGrant> {
	let expires_in = response.expires_in().ok_or(DecodeError::MissingExpiresIn)?.as_secs();
	let expires_in = i64::try_from(expires_in).map_err(|_| DecodeError::ExpiresInOutOfRange)?;
	let access_token = response.access_token().secret();

	if access_token.is_empty() {
		return Err(DecodeError::UnexpectedTokenResponse {
			message: "access_token is empty".into(),
		}
		.into());
	}

	Ok(TokenGrant {
		access_token: TokenSecret::new(access_token.as_str()),
		token_type: response.token_type().as_ref().to_owned(),
		expires_in,
	})
}

fn map_request_error<E>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	let err = match err {
		RequestTokenError::Request(error) => return map_transport_error(error),
		other => other,
	};

	match meta {
		Some(ResponseMetadata { status, body_preview }) if status != StatusCode::OK.as_u16() => {
			Error::AuthRejected { status, body: body_preview.unwrap_or_default() }
		},
		_ => map_payload_error(err),
	}
}

fn map_payload_error<E>(err: BasicRequestTokenError<HttpClientError<E>>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		RequestTokenError::Parse(source, _body) => DecodeError::TokenResponse { source }.into(),
		RequestTokenError::Other(message) => {
			DecodeError::UnexpectedTokenResponse { message }.into()
		},
		RequestTokenError::ServerResponse(response) => DecodeError::UnexpectedTokenResponse {
			message: format!(
				"OAuth error `{}` alongside a success status",
				response.error().as_ref()
			),
		}
		.into(),
		RequestTokenError::Request(error) => map_transport_error(error),
	}
}

fn map_transport_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::token_endpoint(inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) =>
			TransportError::token_endpoint(std::io::Error::other(message)).into(),
		_ => TransportError::token_endpoint(std::io::Error::other(
			"HTTP client error occurred while calling the token endpoint",
		))
		.into(),
	}
}

//! Crate-level error types shared by the credential manager, transports, and Spotify tools.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Token endpoint answered with anything other than HTTP 200.
	#[error("Token endpoint rejected the client credentials with status {status}: {body}.")]
	AuthRejected {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Response body preview, kept for diagnosis.
		body: String,
	},
	/// Spotify Web API answered with a non-success status.
	#[error("Spotify API returned status {status}: {body}.")]
	Api {
		/// HTTP status code returned by the Web API.
		status: u16,
		/// Response body preview.
		body: String,
	},
	/// Caller-supplied arguments were rejected before any request was made.
	#[error("Invalid request: {reason}.")]
	InvalidRequest {
		/// Human-readable reason.
		reason: String,
	},
}

/// Configuration and validation failures; fatal at startup.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is unset or blank.
	#[error("{name} is required.")]
	MissingVariable {
		/// Environment variable name.
		name: &'static str,
	},
	/// A configured URL cannot be parsed.
	#[error("{name} is not a valid URL.")]
	InvalidUrl {
		/// Environment variable (or setting) name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Malformed payloads returned by the token endpoint or the Web API.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Token endpoint responded with JSON that does not match the token response shape.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an `expires_in` that does not fit the clock arithmetic.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a payload the OAuth client could not interpret.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	UnexpectedTokenResponse {
		/// Summary of what went wrong.
		message: String,
	},
	/// Web API responded with JSON that does not match the expected shape.
	#[error("Spotify API returned malformed JSON.")]
	ApiResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Which remote the request was addressed to.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific failure raised while talking to the token endpoint.
	pub fn token_endpoint(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target: "the token endpoint", source: Box::new(src) }
	}

	/// Wraps a transport-specific failure raised while talking to the Web API.
	pub fn api(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target: "the Spotify API", source: Box::new(src) }
	}
}

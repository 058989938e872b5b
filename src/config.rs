//! Process configuration read from `SPOTIFY_*` environment variables.
//!
//! With the `server` feature, [`load_env_file`] first merges an optional `.env` file into the
//! process environment; variables that are already set keep their values.

// std
#[cfg(feature = "server")]
use std::path::{Path, PathBuf};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenSecret},
	error::ConfigError,
	oauth::SPOTIFY_TOKEN_URL,
};

/// Spotify Web API root used when `SPOTIFY_API_BASE_URL` is unset.
pub const SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/v1/";

const CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
const CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
const REDIRECT_URI: &str = "SPOTIFY_REDIRECT_URI";
const TOKEN_URL: &str = "SPOTIFY_TOKEN_URL";
const API_BASE_URL: &str = "SPOTIFY_API_BASE_URL";

/// Validated settings for the credential manager and the Web API client.
#[derive(Clone)]
pub struct SpotifyConfig {
	/// Application client identifier.
	pub client_id: String,
	/// Application client secret.
	pub client_secret: TokenSecret,
	/// Registered redirect URI. Validated but not used by the client-credentials grant.
	pub redirect_uri: Url,
	/// Token endpoint.
	pub token_url: Url,
	/// Web API root; always ends with `/` so relative paths join beneath it.
	pub api_base_url: Url,
}
impl SpotifyConfig {
	/// Loads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the configuration through `lookup`, which maps a variable name to its value.
	///
	/// Blank values count as missing. The secret is checked first, then the id, then the
	/// redirect URI.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let client_secret = required(&lookup, CLIENT_SECRET)?;
		let client_id = required(&lookup, CLIENT_ID)?;
		let redirect_uri = parse_url(REDIRECT_URI, &required(&lookup, REDIRECT_URI)?)?;
		let token_url = parse_url(
			TOKEN_URL,
			&optional(&lookup, TOKEN_URL).unwrap_or_else(|| SPOTIFY_TOKEN_URL.into()),
		)?;
		let mut api_base_url = parse_url(
			API_BASE_URL,
			&optional(&lookup, API_BASE_URL).unwrap_or_else(|| SPOTIFY_API_BASE_URL.into()),
		)?;

		if !api_base_url.path().ends_with('/') {
			let path = format!("{}/", api_base_url.path());

			api_base_url.set_path(&path);
		}

		Ok(Self {
			client_id,
			client_secret: TokenSecret::new(client_secret),
			redirect_uri,
			token_url,
			api_base_url,
		})
	}

	/// Returns the credential pair presented to the token endpoint.
	pub fn credentials(&self) -> ClientCredentials {
		ClientCredentials {
			client_id: self.client_id.clone(),
			client_secret: self.client_secret.clone(),
		}
	}
}
impl Debug for SpotifyConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SpotifyConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("redirect_uri", &self.redirect_uri.as_str())
			.field("token_url", &self.token_url.as_str())
			.field("api_base_url", &self.api_base_url.as_str())
			.finish()
	}
}

/// Loads `path`, or the first `.env` found from the working directory upwards, into the process
/// environment.
///
/// A missing or unreadable file is not an error; it is logged at `debug` and `None` is returned.
#[cfg(feature = "server")]
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
	let loaded = match path {
		Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
		None => dotenvy::dotenv(),
	};

	match loaded {
		Ok(path) => {
			tracing::debug!(path = %path.display(), "Loaded environment file.");

			Some(path)
		},
		Err(e) => {
			tracing::debug!("No environment file loaded: {e}.");

			None
		},
	}
}

// Values are kept verbatim; whitespace only matters for the blank check.
fn optional<F>(lookup: &F, name: &'static str) -> Option<String>
where
	F: Fn(&str) -> Option<String>,
{
	lookup(name).filter(|value| !value.trim().is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	optional(lookup, name).ok_or(ConfigError::MissingVariable { name })
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidUrl { name, source })
}

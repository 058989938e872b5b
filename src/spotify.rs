//! Typed Spotify Web API client backed by the credential manager.

pub mod playlist;
pub mod user;

pub use playlist::*;
pub use user::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DecodeError},
	http::{HttpResponse, HttpTransport, body_preview},
	manager::CredentialManager,
};

/// Web API client. Every call asks the manager for a fresh authenticated client, so a refreshed
/// token is picked up as soon as the cache rolls over.
pub struct SpotifyApi<T>
where
	T: ?Sized + HttpTransport,
{
	manager: Arc<CredentialManager<T>>,
	base_url: Url,
}
impl<T> SpotifyApi<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client rooted at `base_url` (for example `https://api.spotify.com/v1/`).
	pub fn new(manager: Arc<CredentialManager<T>>, base_url: Url) -> Result<Self, ConfigError> {
		if base_url.cannot_be_a_base() {
			return Err(ConfigError::InvalidUrl {
				name: "SPOTIFY_API_BASE_URL",
				source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
			});
		}

		Ok(Self { manager, base_url })
	}

	/// Returns the shared credential manager.
	pub fn manager(&self) -> &Arc<CredentialManager<T>> {
		&self.manager
	}

	/// Returns the API root.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Fetches the profile of the user the token acts for (`GET /me`).
	pub async fn current_user(&self) -> Result<UserProfile> {
		let client = self.manager.authenticated_client().await?;
		let response = client.get(&self.endpoint(&["me"])).await?;
		let wire = decode::<WireUser>(&response, &[200])?;

		Ok(wire.into())
	}

	/// Creates a playlist (`POST /users/{user_id}/playlists`).
	///
	/// Arguments are validated before any request is sent. Without an explicit owner the
	/// current user's id is looked up first.
	pub async fn create_playlist(&self, request: CreatePlaylist) -> Result<PlaylistMetadata> {
		request.validate()?;

		let user_id = match request.owner() {
			Some(id) => id.to_owned(),
			None => self.current_user().await?.id,
		};
		let client = self.manager.authenticated_client().await?;
		let url = self.endpoint(&["users", &user_id, "playlists"]);
		let response = client.post_json(&url, &request.body()).await?;
		let wire = decode::<WirePlaylist>(&response, &[200, 201])?;

		Ok(wire.into())
	}

	fn endpoint(&self, segments: &[&str]) -> Url {
		let mut url = self.base_url.clone();

		// `new` rejects cannot-be-a-base URLs.
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}
}
impl<T> Debug for SpotifyApi<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SpotifyApi")
			.field("base_url", &self.base_url.as_str())
			.field("manager", &self.manager)
			.finish()
	}
}

fn decode<D>(response: &HttpResponse, accepted: &[u16]) -> Result<D>
where
	D: DeserializeOwned,
{
	let status = response.status().as_u16();

	if !accepted.contains(&status) {
		return Err(Error::Api { status, body: body_preview(response.body()) });
	}

	let mut deserializer = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| DecodeError::ApiResponse { source }.into())
}

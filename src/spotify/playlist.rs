//! Playlist creation request and the metadata returned for the created playlist.

// self
use crate::{_prelude::*, spotify::user::WireExternalUrls};

/// Arguments for `POST /users/{user_id}/playlists`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlaylist {
	/// Owner of the new playlist; resolved through `GET /me` when absent.
	#[serde(default)]
	pub user_id: Option<String>,
	/// Playlist name; must not be blank.
	pub name: String,
	/// Playlist description.
	#[serde(default)]
	pub description: Option<String>,
	/// Whether the playlist is listed on the user's profile.
	#[serde(default)]
	pub public: Option<bool>,
	/// Whether other users may edit the playlist. Requires a private playlist.
	#[serde(default)]
	pub collaborative: Option<bool>,
}
impl CreatePlaylist {
	/// Creates a request for a playlist named `name` owned by the current user.
	pub fn named(name: impl Into<String>) -> Self {
		Self { name: name.into(), ..Default::default() }
	}

	/// Rejects argument combinations Spotify would refuse.
	pub fn validate(&self) -> Result<()> {
		if self.name.trim().is_empty() {
			return Err(Error::InvalidRequest { reason: "playlist name must not be blank".into() });
		}
		if self.collaborative == Some(true) && self.public == Some(true) {
			return Err(Error::InvalidRequest {
				reason: "collaborative playlists must not be public".into(),
			});
		}

		Ok(())
	}

	/// Returns the explicit owner id, ignoring blank values.
	pub fn owner(&self) -> Option<&str> {
		self.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
	}

	pub(crate) fn body(&self) -> PlaylistBody<'_> {
		PlaylistBody {
			name: &self.name,
			description: self.description.as_deref(),
			public: self.public,
			collaborative: self.collaborative,
		}
	}
}

/// Metadata of a created playlist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistMetadata {
	/// Spotify playlist id.
	pub id: String,
	/// Playlist name.
	pub name: String,
	/// Playlist description, if set.
	pub description: Option<String>,
	/// Public flag; Spotify reports `null` when unknown.
	pub public: Option<bool>,
	/// Collaborative flag.
	pub collaborative: bool,
	/// Spotify URI of the playlist.
	pub uri: String,
	/// Web link (`external_urls.spotify`).
	pub external_url: String,
	/// Owner's user id (`owner.id`).
	pub owner_id: String,
}
impl From<WirePlaylist> for PlaylistMetadata {
	fn from(wire: WirePlaylist) -> Self {
		Self {
			id: wire.id,
			name: wire.name,
			description: wire.description.filter(|description| !description.is_empty()),
			public: wire.public,
			collaborative: wire.collaborative,
			uri: wire.uri,
			external_url: wire.external_urls.spotify.unwrap_or_default(),
			owner_id: wire.owner.id,
		}
	}
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaylistBody<'a> {
	name: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	description: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	public: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	collaborative: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePlaylist {
	id: String,
	name: String,
	#[serde(default)]
	description: Option<String>,
	#[serde(default)]
	public: Option<bool>,
	#[serde(default)]
	collaborative: bool,
	#[serde(default)]
	uri: String,
	#[serde(default)]
	external_urls: WireExternalUrls,
	owner: WireOwner,
}

#[derive(Debug, Deserialize)]
struct WireOwner {
	id: String,
}

//! Current-user profile as returned by `GET /me`, flattened for tool output.

// self
use crate::_prelude::*;

/// Profile of the user the bearer token acts for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Spotify user id.
	pub id: String,
	/// Display name, when the user set one.
	pub display_name: Option<String>,
	/// Account email; only present with the `user-read-email` scope.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// ISO 3166-1 alpha-2 country code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub country: Option<String>,
	/// Subscription level (`premium`, `free`, ...).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub product: Option<String>,
	/// Spotify URI of the user.
	pub uri: String,
	/// Web link to the profile (`external_urls.spotify`).
	pub external_url: String,
	/// Follower count (`followers.total`).
	pub followers: u64,
	/// Profile images, copied as-is.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub images: Vec<UserImage>,
	/// Explicit-content settings, copied as-is.
	pub explicit_content: ExplicitContent,
}
impl From<WireUser> for UserProfile {
	fn from(wire: WireUser) -> Self {
		Self {
			id: wire.id,
			display_name: wire.display_name,
			email: wire.email,
			country: wire.country,
			product: wire.product,
			uri: wire.uri,
			external_url: wire.external_urls.spotify.unwrap_or_default(),
			followers: wire.followers.total.unwrap_or_default(),
			images: wire.images.unwrap_or_default(),
			explicit_content: wire.explicit_content.unwrap_or_default(),
		}
	}
}

/// Profile image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserImage {
	/// Image URL.
	pub url: String,
	/// Height in pixels, when known.
	pub height: Option<u32>,
	/// Width in pixels, when known.
	pub width: Option<u32>,
}

/// Explicit-content flags of the account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitContent {
	/// Explicit content is filtered.
	#[serde(default)]
	pub filter_enabled: bool,
	/// The filter setting cannot be changed by the user.
	#[serde(default)]
	pub filter_locked: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireUser {
	id: String,
	#[serde(default)]
	display_name: Option<String>,
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	country: Option<String>,
	#[serde(default)]
	product: Option<String>,
	#[serde(default)]
	uri: String,
	#[serde(default)]
	external_urls: WireExternalUrls,
	#[serde(default)]
	followers: WireFollowers,
	#[serde(default)]
	images: Option<Vec<UserImage>>,
	#[serde(default)]
	explicit_content: Option<ExplicitContent>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireExternalUrls {
	#[serde(default)]
	pub(crate) spotify: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireFollowers {
	#[serde(default)]
	total: Option<u64>,
}

//! Demonstrates the credential manager against a mock Spotify: one token exchange serves several
//! Web API calls through the bearer-injecting client.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use spotify_mcp::{
	auth::ClientCredentials,
	manager::CredentialManager,
	spotify::{CreatePlaylist, SpotifyApi},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let me_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":\"demo-user\",\"display_name\":\"Demo\",\
				 \"uri\":\"spotify:user:demo-user\",\"followers\":{\"total\":3}}",
			);
		})
		.await;
	let playlist_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/users/demo-user/playlists")
				.header("authorization", "Bearer demo-access");
			then.status(201).header("content-type", "application/json").body(
				"{\"id\":\"demo-playlist\",\"name\":\"Demo Mix\",\"public\":false,\
				 \"collaborative\":false,\"uri\":\"spotify:playlist:demo-playlist\",\
				 \"owner\":{\"id\":\"demo-user\"}}",
			);
		})
		.await;
	let manager = CredentialManager::new(
		Url::parse(&server.url("/api/token"))?,
		ClientCredentials::new("demo-client", "demo-secret"),
	)?;
	let api = SpotifyApi::new(Arc::new(manager), Url::parse(&server.url("/v1/"))?)?;
	let profile = api.current_user().await?;

	println!("Signed in as {} ({} followers).", profile.id, profile.followers);

	let request = CreatePlaylist { public: Some(false), ..CreatePlaylist::named("Demo Mix") };
	let playlist = api.create_playlist(request).await?;

	println!("Created playlist {} owned by {}.", playlist.id, playlist.owner_id);
	println!("Cached token still valid: {}.", api.manager().is_valid());

	token_mock.assert_async().await;
	me_mock.assert_async().await;
	playlist_mock.assert_async().await;

	Ok(())
}

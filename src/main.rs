//! `spotify-mcp` binary: loads configuration (an optional `.env` file, then the process
//! environment), builds the shared credential manager, and serves the Spotify tools over stdio.

// std
use std::{io, process::ExitCode, sync::Arc};
// crates.io
use tracing_subscriber::EnvFilter;
// self
use spotify_mcp::{
	config::{self, SpotifyConfig},
	manager::CredentialManager,
	server::SpotifyServer,
	spotify::SpotifyApi,
};

#[tokio::main]
async fn main() -> ExitCode {
	// Stdout carries the MCP stream; logs go to stderr.
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("spotify_mcp=info")),
		)
		.with_writer(io::stderr)
		.with_ansi(false)
		.init();

	match run().await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			tracing::error!("{e:?}");

			ExitCode::FAILURE
		},
	}
}

async fn run() -> color_eyre::Result<()> {
	color_eyre::install()?;

	config::load_env_file(None);

	let config = SpotifyConfig::from_env()?;

	tracing::info!(config = ?config, "Configuration loaded.");

	let manager = Arc::new(CredentialManager::from_config(&config)?);
	let api = Arc::new(SpotifyApi::new(manager, config.api_base_url.clone())?);

	SpotifyServer::new(api).serve_stdio().await
}

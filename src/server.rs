//! MCP tool server exposing the Spotify Web API client over stdio.

// crates.io
use rmcp::{
	ErrorData, ServerHandler, ServiceExt,
	handler::server::{router::tool::ToolRouter, wrapper::Parameters},
	model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
	tool, tool_handler, tool_router,
	transport::stdio,
};
use schemars::JsonSchema;
// self
use crate::{
	_prelude::*,
	http::ReqwestTransport,
	spotify::{CreatePlaylist, SpotifyApi},
};

/// Name announced to MCP clients during initialization.
pub const SERVER_NAME: &str = "spotify_mcp_server";

/// Arguments accepted by the `create_playlist` tool.
#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct CreatePlaylistArgs {
	/// Owner of the new playlist. Defaults to the current user.
	#[serde(default)]
	pub user_id: Option<String>,
	/// Name of the new playlist.
	pub name: String,
	/// Optional description.
	#[serde(default)]
	pub description: Option<String>,
	/// List the playlist on the owner's profile.
	#[serde(default)]
	pub public: Option<bool>,
	/// Let other users edit the playlist. Only valid for private playlists.
	#[serde(default)]
	pub collaborative: Option<bool>,
}
impl From<CreatePlaylistArgs> for CreatePlaylist {
	fn from(args: CreatePlaylistArgs) -> Self {
		Self {
			user_id: args.user_id,
			name: args.name,
			description: args.description,
			public: args.public,
			collaborative: args.collaborative,
		}
	}
}

/// Stdio MCP server with the `get_user` and `create_playlist` tools.
#[derive(Clone)]
pub struct SpotifyServer {
	api: Arc<SpotifyApi<ReqwestTransport>>,
	tool_router: ToolRouter<Self>,
}
#[tool_router]
impl SpotifyServer {
	/// Creates a server around a shared API client.
	pub fn new(api: Arc<SpotifyApi<ReqwestTransport>>) -> Self {
		Self { api, tool_router: Self::tool_router() }
	}

	/// Serves MCP over stdin/stdout until the client disconnects.
	pub async fn serve_stdio(self) -> color_eyre::Result<()> {
		let service = self.serve(stdio()).await?;

		tracing::info!("MCP server ready on stdio.");

		service.waiting().await?;

		Ok(())
	}

	#[tool(description = "get own user's profile and data")]
	async fn get_user(&self) -> Result<CallToolResult, ErrorData> {
		let profile = self.api.current_user().await.map_err(|e| tool_error("get_user", e))?;

		Ok(CallToolResult::success(vec![Content::json(profile)?]))
	}

	#[tool(description = "create a new playlist")]
	async fn create_playlist(
		&self,
		Parameters(args): Parameters<CreatePlaylistArgs>,
	) -> Result<CallToolResult, ErrorData> {
		let metadata = self
			.api
			.create_playlist(args.into())
			.await
			.map_err(|e| tool_error("create_playlist", e))?;

		Ok(CallToolResult::success(vec![Content::json(metadata)?]))
	}
}
#[tool_handler]
impl ServerHandler for SpotifyServer {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			server_info: Implementation {
				name: SERVER_NAME.into(),
				version: env!("CARGO_PKG_VERSION").into(),
				..Default::default()
			},
			instructions: Some(
				"Spotify tools: `get_user` returns the current user's profile, `create_playlist` \
				 creates a playlist for a user."
					.into(),
			),
			capabilities: ServerCapabilities::builder().enable_tools().build(),
			..Default::default()
		}
	}
}
impl Debug for SpotifyServer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SpotifyServer").field("api", &self.api).finish()
	}
}

fn tool_error(tool: &'static str, err: Error) -> ErrorData {
	tracing::warn!(tool, error = %err, "Tool call failed.");

	match err {
		Error::InvalidRequest { .. } => ErrorData::invalid_params(err.to_string(), None),
		err => ErrorData::internal_error(err.to_string(), None),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use rmcp::model::ErrorCode;
	// self
	use super::*;
	use crate::{auth::ClientCredentials, manager::CredentialManager};

	fn server() -> SpotifyServer {
		let manager = CredentialManager::new(
			Url::parse("http://127.0.0.1:9/api/token").expect("Fixture token URL should parse."),
			ClientCredentials::new("client-id", "client-secret"),
		)
		.expect("Manager should build from fixture values.");
		let api = SpotifyApi::new(
			Arc::new(manager),
			Url::parse("http://127.0.0.1:9/v1/").expect("Fixture base URL should parse."),
		)
		.expect("API client should accept the fixture base URL.");

		SpotifyServer::new(Arc::new(api))
	}

	#[test]
	fn info_advertises_tools() {
		let info = server().get_info();

		assert_eq!(info.server_info.name, SERVER_NAME);
		assert!(info.capabilities.tools.is_some());
	}

	#[test]
	fn both_tools_are_routed() {
		let server = server();
		let mut names = server
			.tool_router
			.list_all()
			.into_iter()
			.map(|tool| tool.name.to_string())
			.collect::<Vec<_>>();

		names.sort();

		assert_eq!(names, ["create_playlist", "get_user"]);
	}

	#[tokio::test]
	async fn invalid_arguments_map_to_invalid_params_without_io() {
		let args = CreatePlaylistArgs {
			user_id: Some("alice".into()),
			name: "Mix".into(),
			description: None,
			public: Some(true),
			collaborative: Some(true),
		};
		let err = server()
			.create_playlist(Parameters(args))
			.await
			.expect_err("Collaborative public playlists must be rejected.");

		assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
	}

	#[tokio::test]
	async fn upstream_failures_map_to_internal_errors() {
		let err = server().get_user().await.expect_err("An unreachable token endpoint must fail.");

		assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
	}
}

//! Spotify tools for the Model Context Protocol, built around a client-credentials token manager
//! that caches bearer tokens and injects them through a decorating transport.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod manager;
pub mod oauth;
pub mod obs;
#[cfg(feature = "server")] pub mod server;
pub mod spotify;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{auth::ClientCredentials, http::ReqwestTransport, manager::CredentialManager};

	/// Manager type alias used by reqwest-backed integration tests.
	pub type ReqwestTestManager = CredentialManager<ReqwestTransport>;

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Constructs a [`CredentialManager`] that talks to `token_url` through the insecure test
	/// transport.
	pub fn build_reqwest_test_manager(
		token_url: &str,
		client_id: &str,
		client_secret: &str,
	) -> Arc<ReqwestTestManager> {
		let token_url = Url::parse(token_url).expect("Failed to parse mock token endpoint URL.");
		let credentials = ClientCredentials::new(client_id, client_secret);
		let manager = CredentialManager::with_transport(
			token_url,
			credentials,
			Arc::new(test_reqwest_transport()),
		)
		.expect("Failed to build credential manager for tests.");

		Arc::new(manager)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
#[cfg(feature = "server")] use {tokio as _, tracing_subscriber as _};

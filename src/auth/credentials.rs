//! Static client identifier/secret pair used for the client-credentials grant.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Immutable credential pair loaded once at startup.
#[derive(Clone)]
pub struct ClientCredentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret; redacted in every formatter.
	pub client_secret: TokenSecret,
}
impl ClientCredentials {
	/// Creates a credential pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: TokenSecret::new(client_secret) }
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}

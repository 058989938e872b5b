//! Cached bearer token state, lifecycle helpers, and expiry arithmetic.

// self
use crate::{_prelude::*, auth::TokenSecret, error::DecodeError};

/// Safety margin subtracted from the provider-reported lifetime.
pub const EXPIRY_MARGIN: Duration = Duration::seconds(60);

/// Lifecycle status of the credential cache at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// No token has been cached (or the cache was invalidated).
	Empty,
	/// A token is cached and has not reached its expiry instant.
	Valid,
	/// A token is cached but its expiry instant has passed.
	Expired,
}
impl TokenStatus {
	/// Derives the status of an optional cache entry at `now`.
	pub fn of(cached: Option<&CachedToken>, now: OffsetDateTime) -> Self {
		match cached {
			None => Self::Empty,
			Some(token) if token.is_expired_at(now) => Self::Expired,
			Some(_) => Self::Valid,
		}
	}
}

/// Parsed token endpoint response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Bearer credential.
	pub access_token: TokenSecret,
	/// Token type reported by the provider (Spotify answers `Bearer`).
	pub token_type: String,
	/// Provider-reported lifetime in whole seconds.
	pub expires_in: i64,
}
impl TokenGrant {
	/// Computes the local expiry instant: `issued_at + expires_in - 60s`.
	///
	/// Lifetimes at or below the margin yield an instant in the past, which simply forces a
	/// refresh on the next call.
	pub fn expires_at(&self, issued_at: OffsetDateTime) -> Result<OffsetDateTime, DecodeError> {
		Duration::seconds(self.expires_in)
			.checked_sub(EXPIRY_MARGIN)
			.and_then(|lifetime| issued_at.checked_add(lifetime))
			.ok_or(DecodeError::ExpiresInOutOfRange)
	}
}

/// Token cached by the credential manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedToken {
	/// Bearer credential; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Instant after which the token must be treated as invalid.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds a cache entry from a grant issued at `issued_at`.
	pub fn from_grant(grant: TokenGrant, issued_at: OffsetDateTime) -> Result<Self, DecodeError> {
		let expires_at = grant.expires_at(issued_at)?;

		Ok(Self { access_token: grant.access_token, expires_at })
	}

	/// Returns `true` once `instant` has reached the expiry instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` while the token may still be presented at `instant`.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		!self.access_token.is_empty() && !self.is_expired_at(instant)
	}
}

//! Optional observability helpers for token acquisition.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `spotify_mcp.credentials` with a `stage` field, plus one
//!   event per outcome (`debug` for cache hits, `info` for refreshes, `warn` for failures).
//! - Enable `metrics` to increment the `spotify_mcp_token_total` counter for every outcome,
//!   labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each token request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenOutcome {
	/// Cached token was still valid; no I/O happened.
	CacheHit,
	/// Token endpoint issued a fresh token.
	Refresh,
	/// Refresh failed and the error was returned to the caller.
	Failure,
}
impl TokenOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenOutcome::CacheHit => "cache_hit",
			TokenOutcome::Refresh => "refresh",
			TokenOutcome::Failure => "failure",
		}
	}
}
impl Display for TokenOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records `outcome` with every enabled backend.
pub fn observe(outcome: TokenOutcome, detail: &dyn Display) {
	record_token_outcome(outcome);
	log_token_outcome(outcome, detail);
}

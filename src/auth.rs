//! Credential pair, redacted secrets, and the cached bearer token model.

pub mod credentials;
pub mod secret;
pub mod token;

pub use credentials::*;
pub use secret::*;
pub use token::*;

//! Authentication module for managing client sessions and credentials.
//!
//! This module provides:
//! - `Session`: bearer token persistence, validated against the token's own
//!   `exp` claim on load
//! - `decode_token_claims`: JWT payload decoding
//! - `CredentialStore`: optional OS-level password storage via keyring

pub mod credentials;
pub mod session;
pub mod token;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData, SessionUser};
pub use token::{decode_token_claims, TokenClaims};

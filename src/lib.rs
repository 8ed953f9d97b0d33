//! Cyberus Key - relying-party client library
//!
//! This library implements the client half of the Cyberus Key OpenID
//! Connect authorization code flow: it exchanges the authorization code
//! returned on the redirect for tokens, verifies the identity token's RS256
//! signature, and cross-checks `state`, `nonce`, `at_hash` and `c_hash`
//! before handing identity data to the caller.
//!
//! # Architecture
//!
//! - `client`: [`AuthClient`] and the authorization sequence
//! - `config`: client credentials, provider URI and signing key
//! - `redirect`: normalized redirect query parameters
//! - `transport`: token endpoint abstraction and its reqwest implementation
//! - `verify`: identity token verification abstraction and its RS256 implementation
//! - `claims`: decoded identity token claims
//! - `hash`: `at_hash` / `c_hash` computation
//! - `binding`: random `state` / `nonce` generation
//! - `logging`: optional tracing subscriber setup
//! - `error`: error types and result alias
//!
//! # Example
//!
//! ```no_run
//! use cyberuskey::{binding, AuthClient, RedirectParams};
//!
//! #[tokio::main]
//! async fn main() -> cyberuskey::Result<()> {
//!     let client = AuthClient::new("client-id", "client-secret", "https://app.example.com/cb")?;
//!
//!     // Before redirecting the user: store these in the session.
//!     let state = binding::generate_state();
//!     let nonce = binding::generate_nonce();
//!
//!     // On the redirect endpoint:
//!     let redirect = RedirectParams::from_query("code=abc&state=...");
//!     let result = client
//!         .authorize(&redirect, Some(&state), Some(&nonce))
//!         .await?;
//!
//!     println!("{} logged in", result.claims().sub);
//!     Ok(())
//! }
//! ```

pub mod binding;
pub mod claims;
pub mod client;
pub mod config;
pub mod error;
pub mod hash;
pub mod logging;
pub mod redirect;
pub mod transport;
pub mod verify;

// Re-export commonly used types
pub use claims::IdTokenClaims;
pub use client::{AuthClient, AuthorizationResult};
pub use config::ClientConfig;
pub use error::{CyberusKeyError, Result};
pub use redirect::RedirectParams;

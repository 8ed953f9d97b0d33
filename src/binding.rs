//! Random `state` and `nonce` values
//!
//! A host application generates both values before redirecting the user to
//! Cyberus Key, keeps them in its session, and later passes them to
//! [`crate::AuthClient::authorize`] as the expected values. `state` guards
//! the redirect against cross-site request forgery; `nonce` ties the
//! identity token to this login attempt.

use base64::Engine as _;
use rand::RngCore as _;

const RANDOM_BYTES: usize = 16;

fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Generates a random `state` value: 16 bytes, base64url without padding.
///
/// # Examples
///
/// ```
/// use cyberuskey::binding::generate_state;
///
/// let state = generate_state();
/// assert_eq!(state.len(), 22);
/// ```
pub fn generate_state() -> String {
    random_token()
}

/// Generates a random `nonce` value: 16 bytes, base64url without padding.
pub fn generate_nonce() -> String {
    random_token()
}

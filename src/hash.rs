//! Claim hashes binding co-issued artifacts to the identity token
//!
//! Cyberus Key embeds `at_hash` (over the access token) and `c_hash` (over
//! the authorization code) in the signed identity token. Recomputing the
//! hash on the client proves the access token and code were issued together
//! with that identity token.
//!
//! # Algorithm
//!
//! 1. SHA-256 over the UTF-8 bytes of the value.
//! 2. Keep the left-most 128 bits (16 bytes) of the digest.
//! 3. Encode those bytes as URL-safe base64 **with** padding, which is the
//!    form the provider emits (24 characters ending in `==`).

use base64::Engine as _;
use sha2::{Digest, Sha256};

/// Number of digest bytes kept in a claim hash.
const CLAIM_HASH_BYTES: usize = 16;

/// Computes the claim hash of `value`.
///
/// # Examples
///
/// ```
/// use cyberuskey::hash::compute_claim_hash;
///
/// let hash = compute_claim_hash("tok");
/// assert_eq!(hash.len(), 24);
/// assert!(hash.ends_with("=="));
/// assert_eq!(hash, compute_claim_hash("tok"));
/// ```
pub fn compute_claim_hash(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    base64::engine::general_purpose::URL_SAFE.encode(&digest[..CLAIM_HASH_BYTES])
}

/// Returns `true` when `expected` is exactly the claim hash of `value`.
pub fn verify_claim_hash(expected: &str, value: &str) -> bool {
    compute_claim_hash(value) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_hash_is_deterministic() {
        assert_eq!(compute_claim_hash("access-token"), compute_claim_hash("access-token"));
    }

    #[test]
    fn test_claim_hash_changes_with_single_byte() {
        assert_ne!(compute_claim_hash("access-token"), compute_claim_hash("access-tokem"));
        assert_ne!(compute_claim_hash("abc"), compute_claim_hash("abd"));
    }

    #[test]
    fn test_claim_hash_known_vector() {
        // sha256("abc") = ba7816bf 8f01cfea 414140de 5dae2223 ...
        let expected = base64::engine::general_purpose::URL_SAFE.encode([
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
            0x22, 0x23,
        ]);
        assert_eq!(compute_claim_hash("abc"), expected);
        assert_eq!(compute_claim_hash("abc"), "ungWv48Bz-pBQUDeXa4iIw==");
    }

    #[test]
    fn test_claim_hash_is_url_safe() {
        for value in ["", "tok", "a much longer access token value with spaces", "zażółć"] {
            let hash = compute_claim_hash(value);
            assert_eq!(hash.len(), 24);
            assert!(!hash.contains('+'));
            assert!(!hash.contains('/'));
        }
    }

    #[test]
    fn test_verify_claim_hash() {
        let hash = compute_claim_hash("code-123");
        assert!(verify_claim_hash(&hash, "code-123"));
        assert!(!verify_claim_hash(&hash, "code-124"));
        assert!(!verify_claim_hash(hash.trim_end_matches('='), "code-123"));
    }
}

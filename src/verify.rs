//! Identity token signature verification
//!
//! The [`IdTokenVerifier`] trait is the seam between the authorization flow
//! and the JWT primitive. [`Rs256Verifier`] is the production
//! implementation backed by `jsonwebtoken`; tests and host applications may
//! supply their own.

use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::IdTokenClaims;

/// Reasons an identity token is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// Signature does not match the provider key
    #[error("invalid token signature")]
    InvalidSignature,

    /// `exp` is in the past (beyond the allowed leeway)
    #[error("token has expired")]
    Expired,

    /// `nbf` is in the future
    #[error("token is not valid yet")]
    Immature,

    /// `aud` does not name this client
    #[error("token audience does not match the client id")]
    InvalidAudience,

    /// Token header names an algorithm other than RS256
    #[error("unsupported algorithm: only RS256 is accepted")]
    InvalidAlgorithm,

    /// The configured public key could not be used
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// A claim required for validation is absent
    #[error("missing required claim: {0}")]
    MissingClaim(String),

    /// Token is not a well-formed compact JWS or its payload is not valid
    #[error("malformed token: {0}")]
    Malformed(String),
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::Immature,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => Self::InvalidAlgorithm,
            ErrorKind::InvalidRsaKey(reason) => Self::InvalidKey(reason.clone()),
            ErrorKind::InvalidKeyFormat => Self::InvalidKey("unrecognized key format".to_string()),
            ErrorKind::MissingRequiredClaim(claim) => Self::MissingClaim(claim.clone()),
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Verifies a compact identity token and decodes its claims.
pub trait IdTokenVerifier: Send + Sync + fmt::Debug {
    /// Verifies `id_token` against `public_key_pem`, requiring `audience`
    /// in the `aud` claim and an unexpired `exp` (with `leeway_seconds` of
    /// clock skew).
    ///
    /// # Errors
    ///
    /// Returns the [`VerificationError`] describing the first failed check.
    fn verify(
        &self,
        id_token: &str,
        public_key_pem: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<IdTokenClaims, VerificationError>;
}

/// RS256 verifier backed by `jsonwebtoken`.
///
/// # Examples
///
/// ```
/// use cyberuskey::verify::{IdTokenVerifier, Rs256Verifier};
///
/// let verifier = Rs256Verifier;
/// assert!(verifier.verify("not.a.jwt", "not a key", "client", 60).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Rs256Verifier;

impl IdTokenVerifier for Rs256Verifier {
    fn verify(
        &self,
        id_token: &str,
        public_key_pem: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<IdTokenClaims, VerificationError> {
        let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = vec![Algorithm::RS256];
        validation.leeway = leeway_seconds;
        validation.validate_exp = true;
        validation.set_audience(&[audience]);

        let data = decode::<IdTokenClaims>(id_token, &key, &validation)?;
        Ok(data.claims)
    }
}

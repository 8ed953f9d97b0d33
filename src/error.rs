//! Error types for the Cyberus Key client
//!
//! Every failure that can surface from [`crate::AuthClient`] is a variant of
//! [`CyberusKeyError`]. Callers branch on the variant, or on the stable
//! string returned by [`CyberusKeyError::code`].

use thiserror::Error;

use crate::verify::VerificationError;

/// Error code reported when the redirect `state` does not match.
pub const INVALID_STATE: &str = "invalid_state";

/// Error code reported when the identity token `nonce` does not match.
pub const INVALID_NONCE: &str = "invalid_nonce";

/// Error code reported when `at_hash` does not bind the access token.
pub const INVALID_AT_HASH: &str = "invalid_at_hash";

/// Error code reported when `c_hash` does not bind the authorization code.
pub const INVALID_C_HASH: &str = "invalid_c_hash";

/// Error code reported when the redirect carries no authorization code.
pub const AUTH_CODE_MISSING: &str = "auth_code_missing";

/// Main error type for Cyberus Key operations
#[derive(Error, Debug)]
pub enum CyberusKeyError {
    /// A configuration setter received a malformed value
    #[error("Provided {0} is invalid")]
    InvalidConfigValue(String),

    /// Configuration file or field validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A session credential was read before any successful authorization
    #[error("{0} isn't initialized. You need to authenticate.")]
    UninitializedCredential(&'static str),

    /// The redirect carried no usable authorization code
    #[error("Missing authorization code value")]
    MissingAuthorizationCode,

    /// Provider-reported error or a failed integrity check
    #[error("Authentication failed: {error}: {description}")]
    Authenticate {
        /// Machine-readable error tag (e.g. `access_denied`, `invalid_state`)
        error: String,
        /// Human-readable description
        description: String,
    },

    /// Transport failure or unusable response from the token endpoint
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Identity token failed signature, audience or expiry checks
    #[error("ID token verification failed: {0}")]
    SignatureVerification(#[from] VerificationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CyberusKeyError {
    /// Builds a [`CyberusKeyError::Authenticate`] error.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyberuskey::error::{CyberusKeyError, INVALID_STATE};
    ///
    /// let err = CyberusKeyError::authenticate(INVALID_STATE, "Invalid state value");
    /// assert_eq!(err.code(), "invalid_state");
    /// ```
    pub fn authenticate(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Authenticate {
            error: error.into(),
            description: description.into(),
        }
    }

    /// Returns a stable, machine-readable tag for this error.
    ///
    /// For [`CyberusKeyError::Authenticate`] this is the `error` value
    /// itself, so provider-reported tags pass through unchanged.
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidConfigValue(_) => "invalid_config_value",
            Self::Config(_) => "config",
            Self::UninitializedCredential(_) => "uninitialized_credential",
            Self::MissingAuthorizationCode => AUTH_CODE_MISSING,
            Self::Authenticate { error, .. } => error,
            Self::TokenExchange(_) => "token_exchange_failed",
            Self::SignatureVerification(_) => "signature_verification_failed",
            Self::Io(_) => "io",
            Self::Yaml(_) => "yaml",
        }
    }

    /// Returns `true` when the failure came from a redirect, provider or
    /// integrity check rather than from configuration or transport.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::Authenticate { .. }
                | Self::MissingAuthorizationCode
                | Self::SignatureVerification(_)
        )
    }
}

/// Result type alias for Cyberus Key operations
pub type Result<T> = std::result::Result<T, CyberusKeyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_value_display() {
        let error = CyberusKeyError::InvalidConfigValue("not-a-uri".to_string());
        assert_eq!(error.to_string(), "Provided not-a-uri is invalid");
    }

    #[test]
    fn test_uninitialized_credential_display() {
        let error = CyberusKeyError::UninitializedCredential("access token");
        assert_eq!(
            error.to_string(),
            "access token isn't initialized. You need to authenticate."
        );
    }

    #[test]
    fn test_authenticate_error_keeps_fields_verbatim() {
        let error = CyberusKeyError::authenticate("access_denied", "User said no");
        match &error {
            CyberusKeyError::Authenticate { error, description } => {
                assert_eq!(error, "access_denied");
                assert_eq!(description, "User said no");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(error.code(), "access_denied");
    }

    #[test]
    fn test_missing_code_error_code() {
        let error = CyberusKeyError::MissingAuthorizationCode;
        assert_eq!(error.code(), AUTH_CODE_MISSING);
        assert_eq!(error.to_string(), "Missing authorization code value");
    }

    #[test]
    fn test_verification_error_conversion() {
        let error: CyberusKeyError = VerificationError::Expired.into();
        assert!(matches!(
            error,
            CyberusKeyError::SignatureVerification(VerificationError::Expired)
        ));
        assert!(error.is_authentication_failure());
    }

    #[test]
    fn test_token_exchange_is_not_authentication_failure() {
        let error = CyberusKeyError::TokenExchange("timeout".to_string());
        assert!(!error.is_authentication_failure());
        assert_eq!(error.code(), "token_exchange_failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CyberusKeyError = io_error.into();
        assert!(matches!(error, CyberusKeyError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: CyberusKeyError = yaml_error.into();
        assert!(matches!(error, CyberusKeyError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CyberusKeyError>();
    }
}

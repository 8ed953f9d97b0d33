//! Cyberus Key authorization client
//!
//! [`AuthClient`] drives one authorization code exchange and refuses to
//! release identity data until every integrity check has passed.
//!
//! # Flow overview
//!
//! 1. Fail fast on a provider-reported `error` in the redirect.
//! 2. Resolve the authorization `code`.
//! 3. Compare the redirect `state` with the expected state.
//! 4. Exchange the code at `{api_uri}/api/v2/tokens`.
//! 5. Verify the identity token (RS256, audience = `client_id`, expiry).
//! 6. Compare the `nonce` claim with the expected nonce.
//! 7. Check `at_hash` against the access token.
//! 8. Check `c_hash` against the authorization code.
//! 9. Cache both tokens on the client and return the result.
//!
//! # State and nonce policy
//!
//! A value on either side must be matched by the other. If the caller
//! expects a `state` the redirect must carry the same value, and a redirect
//! `state` the caller did not expect is rejected too. `nonce` follows the
//! same rule against the identity token claim. When neither side has a
//! value the check is skipped.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::claims::IdTokenClaims;
use crate::config::ClientConfig;
use crate::error::{
    CyberusKeyError, Result, INVALID_AT_HASH, INVALID_C_HASH, INVALID_NONCE, INVALID_STATE,
};
use crate::hash::verify_claim_hash;
use crate::redirect::RedirectParams;
use crate::transport::{HttpTokenEndpoint, TokenEndpoint, TokenRequest, TokenResponse};
use crate::verify::{IdTokenVerifier, Rs256Verifier};

/// Validated outcome of one successful [`AuthClient::authorize`] call.
#[derive(Debug, Clone)]
pub struct AuthorizationResult {
    claims: IdTokenClaims,
    access_token: String,
    id_token: String,
}

impl AuthorizationResult {
    /// Verified identity token claims
    pub fn claims(&self) -> &IdTokenClaims {
        &self.claims
    }

    /// Opaque access token for the provider's APIs
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Raw identity token
    pub fn id_token(&self) -> &str {
        &self.id_token
    }

    /// Splits the result into claims and access token.
    pub fn into_parts(self) -> (IdTokenClaims, String) {
        (self.claims, self.access_token)
    }
}

/// Tokens from the most recent successful authorization.
#[derive(Default)]
struct SessionTokens {
    access_token: Option<String>,
    id_token: Option<String>,
}

/// Relying-party client for the Cyberus Key authorization code flow.
///
/// Each instance owns its configuration. The session cache is guarded by a
/// lock, so one instance may serve concurrent flows; the cache then holds
/// the tokens of whichever flow completed last.
///
/// # Examples
///
/// ```no_run
/// use cyberuskey::{AuthClient, RedirectParams};
///
/// # async fn example() -> cyberuskey::Result<()> {
/// let client = AuthClient::new("client-id", "client-secret", "https://app.example.com/cb")?;
///
/// let redirect = RedirectParams::from_query("code=abc&state=xyz");
/// let result = client.authorize(&redirect, Some("xyz"), None).await?;
///
/// println!("signed in as {}", result.claims().sub);
/// assert_eq!(client.access_token()?, result.access_token());
/// # Ok(())
/// # }
/// ```
pub struct AuthClient {
    config: ClientConfig,
    endpoint: Arc<dyn TokenEndpoint>,
    verifier: Arc<dyn IdTokenVerifier>,
    session: RwLock<SessionTokens>,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    /// Creates a client with the default provider URI and signing key.
    ///
    /// # Errors
    ///
    /// Returns [`CyberusKeyError::TokenExchange`] if the HTTP client cannot
    /// be created.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self> {
        Self::with_default_collaborators(ClientConfig::new(client_id, client_secret, redirect_uri))
    }

    /// Creates a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the error from [`ClientConfig::validate`], or
    /// [`CyberusKeyError::TokenExchange`] if the HTTP client cannot be
    /// created.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Self::with_default_collaborators(config)
    }

    fn with_default_collaborators(config: ClientConfig) -> Result<Self> {
        let endpoint = HttpTokenEndpoint::new(Duration::from_secs(config.timeout_seconds))?;
        Ok(Self::with_collaborators(
            config,
            Arc::new(endpoint),
            Arc::new(Rs256Verifier),
        ))
    }

    /// Creates a client with custom transport and verification
    /// collaborators.
    pub fn with_collaborators(
        config: ClientConfig,
        endpoint: Arc<dyn TokenEndpoint>,
        verifier: Arc<dyn IdTokenVerifier>,
    ) -> Self {
        Self {
            config,
            endpoint,
            verifier,
            session: RwLock::new(SessionTokens::default()),
        }
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Client identifier registered with the provider
    pub fn client_id(&self) -> &str {
        self.config.client_id()
    }

    /// Redirect URI registered with the provider
    pub fn redirect_uri(&self) -> &str {
        self.config.redirect_uri()
    }

    /// Provider base URI
    pub fn api_uri(&self) -> &url::Url {
        self.config.api_uri()
    }

    /// Replaces the provider base URI; see [`ClientConfig::set_api_uri`].
    pub fn set_api_uri(&mut self, uri: &str) -> Result<()> {
        self.config.set_api_uri(uri)
    }

    /// PEM-encoded provider signing key
    pub fn signing_public_key(&self) -> &str {
        self.config.signing_public_key()
    }

    /// Replaces the provider signing key; see
    /// [`ClientConfig::set_signing_public_key`].
    pub fn set_signing_public_key(&mut self, key: impl Into<String>) {
        self.config.set_signing_public_key(key);
    }

    /// Access token from the last successful [`AuthClient::authorize`].
    ///
    /// # Errors
    ///
    /// Returns [`CyberusKeyError::UninitializedCredential`] before the first
    /// successful authorization.
    pub fn access_token(&self) -> Result<String> {
        self.read_session(|session| session.access_token.clone(), "access token")
    }

    /// Identity token from the last successful [`AuthClient::authorize`].
    ///
    /// # Errors
    ///
    /// Returns [`CyberusKeyError::UninitializedCredential`] before the first
    /// successful authorization.
    pub fn id_token(&self) -> Result<String> {
        self.read_session(|session| session.id_token.clone(), "id token")
    }

    fn read_session(
        &self,
        field: impl FnOnce(&SessionTokens) -> Option<String>,
        name: &'static str,
    ) -> Result<String> {
        let session = self
            .session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        field(&*session).ok_or(CyberusKeyError::UninitializedCredential(name))
    }

    /// Exchanges the authorization code in `redirect` for tokens and
    /// validates them.
    ///
    /// `expected_state` and `expected_nonce` are the values the caller
    /// generated before redirecting the user (see [`crate::binding`]).
    ///
    /// # Errors
    ///
    /// - [`CyberusKeyError::Authenticate`] for a provider-reported error
    ///   (redirect or token endpoint) and for `invalid_state`,
    ///   `invalid_nonce`, `invalid_at_hash`, `invalid_c_hash`.
    /// - [`CyberusKeyError::MissingAuthorizationCode`] if the redirect has
    ///   no code.
    /// - [`CyberusKeyError::TokenExchange`] if the token request fails.
    /// - [`CyberusKeyError::SignatureVerification`] if the identity token
    ///   is not valid.
    ///
    /// On any error the cached session tokens are left untouched.
    pub async fn authorize(
        &self,
        redirect: &RedirectParams,
        expected_state: Option<&str>,
        expected_nonce: Option<&str>,
    ) -> Result<AuthorizationResult> {
        if let Some(error) = redirect.error() {
            tracing::debug!(error = %error, "Provider reported an error on redirect");
            return Err(CyberusKeyError::authenticate(
                error,
                redirect.error_description().unwrap_or_default(),
            ));
        }

        let code = redirect
            .code()
            .ok_or(CyberusKeyError::MissingAuthorizationCode)?;

        check_state(redirect.state(), expected_state)?;

        let request = TokenRequest {
            code: code.to_string(),
            redirect_uri: self.config.redirect_uri().to_string(),
            client_id: self.config.client_id().to_string(),
            client_secret: self.config.client_secret().to_string(),
        };
        let token_endpoint = self.config.token_endpoint()?;

        let tokens = match self.endpoint.exchange(&token_endpoint, &request).await? {
            TokenResponse::Issued(tokens) => tokens,
            TokenResponse::Error {
                error,
                error_description,
            } => {
                tracing::debug!(error = %error, "Token endpoint refused the exchange");
                return Err(CyberusKeyError::authenticate(
                    error,
                    error_description.unwrap_or_default(),
                ));
            }
        };

        let claims = self
            .verifier
            .verify(
                &tokens.id_token,
                self.config.signing_public_key(),
                self.config.client_id(),
                self.config.leeway_seconds,
            )
            .map_err(|e| {
                tracing::warn!(error = %e, "Identity token verification failed");
                CyberusKeyError::SignatureVerification(e)
            })?;

        check_nonce(claims.nonce.as_deref(), expected_nonce)?;

        if let Some(at_hash) = claims.at_hash.as_deref() {
            if !verify_claim_hash(at_hash, &tokens.access_token) {
                tracing::warn!(sub = %claims.sub, "at_hash does not match the access token");
                return Err(CyberusKeyError::authenticate(
                    INVALID_AT_HASH,
                    "Access token hash is invalid",
                ));
            }
        }

        if let Some(c_hash) = claims.c_hash.as_deref() {
            if !verify_claim_hash(c_hash, code) {
                tracing::warn!(sub = %claims.sub, "c_hash does not match the authorization code");
                return Err(CyberusKeyError::authenticate(
                    INVALID_C_HASH,
                    "Authorization code hash is invalid",
                ));
            }
        }

        {
            let mut session = self
                .session
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            session.access_token = Some(tokens.access_token.clone());
            session.id_token = Some(tokens.id_token.clone());
        }

        tracing::info!(sub = %claims.sub, "Cyberus Key authorization completed");

        Ok(AuthorizationResult {
            claims,
            access_token: tokens.access_token,
            id_token: tokens.id_token,
        })
    }
}

fn check_state(received: Option<&str>, expected: Option<&str>) -> Result<()> {
    match (received, expected) {
        (None, None) => Ok(()),
        (Some(received), Some(expected)) if received == expected => Ok(()),
        _ => {
            tracing::warn!("Redirect state does not match the expected value");
            Err(CyberusKeyError::authenticate(
                INVALID_STATE,
                "Invalid state value",
            ))
        }
    }
}

fn check_nonce(received: Option<&str>, expected: Option<&str>) -> Result<()> {
    match (received, expected) {
        (None, None) => Ok(()),
        (Some(received), Some(expected)) if received == expected => Ok(()),
        _ => {
            tracing::warn!("Identity token nonce does not match the expected value");
            Err(CyberusKeyError::authenticate(
                INVALID_NONCE,
                "Invalid nonce value",
            ))
        }
    }
}

//! Token endpoint transport
//!
//! The [`TokenEndpoint`] trait performs the authorization code exchange
//! against `{api_uri}/api/v2/tokens`. [`HttpTokenEndpoint`] is the
//! reqwest-backed implementation used by default.
//!
//! # Wire format
//!
//! ```text
//! POST /api/v2/tokens
//! Authorization: Basic base64(client_id:client_secret)
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=authorization_code&code=<code>&redirect_uri=<redirect_uri>
//! ```
//!
//! The provider answers with `{"id_token": ..., "access_token": ...}` or
//! `{"error": ..., "error_description": ...}`.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::error::{CyberusKeyError, Result};

/// Parameters of one authorization code exchange.
#[derive(Clone)]
pub struct TokenRequest {
    /// Authorization code from the redirect
    pub code: String,
    /// Redirect URI registered for the client
    pub redirect_uri: String,
    /// Client identifier, sent as the Basic auth user
    pub client_id: String,
    /// Client secret, sent as the Basic auth password
    pub client_secret: String,
}

impl TokenRequest {
    /// Form body sent to the token endpoint.
    pub fn form(&self) -> [(&'static str, &str); 3] {
        [
            ("grant_type", "authorization_code"),
            ("code", self.code.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ]
    }
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("code", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Tokens issued by a successful exchange.
#[derive(Clone, Deserialize)]
pub struct IssuedTokens {
    /// Signed identity token (compact JWS)
    pub id_token: String,
    /// Opaque access token
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Remaining response fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl fmt::Debug for IssuedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedTokens")
            .field("id_token", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Decoded token endpoint response.
#[derive(Debug, Clone)]
pub enum TokenResponse {
    /// The provider issued tokens
    Issued(IssuedTokens),
    /// The provider refused the exchange
    Error {
        /// Error tag, e.g. `invalid_grant`
        error: String,
        /// Optional human-readable description
        error_description: Option<String>,
    },
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenResponse {
    /// Interprets a token endpoint response body.
    ///
    /// A body carrying a non-empty `error` is a provider refusal whatever the
    /// status code. Otherwise a non-2xx status, a non-JSON body, or a body
    /// without `id_token` and `access_token` is a
    /// [`CyberusKeyError::TokenExchange`] failure.
    pub fn from_body(status: StatusCode, body: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            CyberusKeyError::TokenExchange(format!(
                "token endpoint returned {status} with a non-JSON body: {e}"
            ))
        })?;

        if let Ok(ErrorBody {
            error: Some(error),
            error_description,
        }) = ErrorBody::deserialize(&value)
        {
            if !error.is_empty() {
                return Ok(Self::Error {
                    error,
                    error_description,
                });
            }
        }

        if !status.is_success() {
            return Err(CyberusKeyError::TokenExchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let tokens = IssuedTokens::deserialize(value).map_err(|e| {
            CyberusKeyError::TokenExchange(format!("failed to parse token response: {e}"))
        })?;

        Ok(Self::Issued(tokens))
    }
}

/// Exchanges an authorization code for tokens.
#[async_trait::async_trait]
pub trait TokenEndpoint: Send + Sync + fmt::Debug {
    /// Sends `request` to `endpoint` and decodes the response.
    ///
    /// # Errors
    ///
    /// Returns [`CyberusKeyError::TokenExchange`] for transport failures,
    /// timeouts, and unusable responses. Provider-reported errors are not
    /// errors at this layer; they come back as [`TokenResponse::Error`].
    async fn exchange(&self, endpoint: &Url, request: &TokenRequest) -> Result<TokenResponse>;
}

/// reqwest-backed [`TokenEndpoint`].
#[derive(Debug, Clone)]
pub struct HttpTokenEndpoint {
    http: reqwest::Client,
}

impl HttpTokenEndpoint {
    /// Creates an endpoint whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`CyberusKeyError::TokenExchange`] if the HTTP client cannot
    /// be built (e.g. the TLS backend fails to initialize).
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cyberuskey/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                CyberusKeyError::TokenExchange(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self { http })
    }

    /// Wraps an existing client. The caller is responsible for its timeout.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn exchange(&self, endpoint: &Url, request: &TokenRequest) -> Result<TokenResponse> {
        tracing::debug!(endpoint = %endpoint, client_id = %request.client_id, "Exchanging authorization code");

        let resp = self
            .http
            .post(endpoint.clone())
            .basic_auth(&request.client_id, Some(&request.client_secret))
            .form(&request.form())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CyberusKeyError::TokenExchange(format!("token request timed out: {e}"))
                } else {
                    CyberusKeyError::TokenExchange(format!("token request failed: {e}"))
                }
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            CyberusKeyError::TokenExchange(format!("failed to read token response: {e}"))
        })?;

        tracing::debug!(status = %status, "Token endpoint responded");
        TokenResponse::from_body(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TokenRequest {
        TokenRequest {
            code: "abc".to_string(),
            redirect_uri: "https://app/cb".to_string(),
            client_id: "c".to_string(),
            client_secret: "s".to_string(),
        }
    }

    #[test]
    fn test_form_body_fields() {
        let req = request();
        let form = req.form();
        assert_eq!(form[0], ("grant_type", "authorization_code"));
        assert_eq!(form[1], ("code", "abc"));
        assert_eq!(form[2], ("redirect_uri", "https://app/cb"));
    }

    #[test]
    fn test_request_debug_redacts_secrets() {
        let rendered = format!("{:?}", request());
        assert!(!rendered.contains("\"s\""));
        assert!(!rendered.contains("abc"));
    }

    #[test]
    fn test_from_body_success() {
        let body = r#"{"id_token":"a.b.c","access_token":"tok","token_type":"Bearer","expires_in":3600,"scope":"openid"}"#;
        match TokenResponse::from_body(StatusCode::OK, body).unwrap() {
            TokenResponse::Issued(tokens) => {
                assert_eq!(tokens.id_token, "a.b.c");
                assert_eq!(tokens.access_token, "tok");
                assert_eq!(tokens.expires_in, Some(3600));
                assert_eq!(tokens.extra["scope"], "openid");
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_from_body_provider_error_on_bad_request() {
        let body = r#"{"error":"invalid_grant","error_description":"Code expired"}"#;
        match TokenResponse::from_body(StatusCode::BAD_REQUEST, body).unwrap() {
            TokenResponse::Error {
                error,
                error_description,
            } => {
                assert_eq!(error, "invalid_grant");
                assert_eq!(error_description.as_deref(), Some("Code expired"));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_from_body_provider_error_on_ok_status() {
        let body = r#"{"error":"invalid_client"}"#;
        assert!(matches!(
            TokenResponse::from_body(StatusCode::OK, body).unwrap(),
            TokenResponse::Error { error_description: None, .. }
        ));
    }

    #[test]
    fn test_from_body_non_json_is_exchange_failure() {
        let err = TokenResponse::from_body(StatusCode::BAD_GATEWAY, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, CyberusKeyError::TokenExchange(_)));
    }

    #[test]
    fn test_from_body_server_error_without_error_field() {
        let err = TokenResponse::from_body(StatusCode::INTERNAL_SERVER_ERROR, "{}").unwrap_err();
        assert!(matches!(err, CyberusKeyError::TokenExchange(msg) if msg.contains("500")));
    }

    #[test]
    fn test_from_body_missing_id_token() {
        let err = TokenResponse::from_body(StatusCode::OK, r#"{"access_token":"tok"}"#).unwrap_err();
        assert!(matches!(err, CyberusKeyError::TokenExchange(_)));
    }

    #[test]
    fn test_http_endpoint_builds() {
        assert!(HttpTokenEndpoint::new(Duration::from_secs(5)).is_ok());
    }
}

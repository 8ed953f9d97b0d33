//! Client configuration
//!
//! [`ClientConfig`] holds the credentials registered with Cyberus Key, the
//! provider base URI and the provider's public signing key. Each
//! [`crate::AuthClient`] owns its own copy; nothing is shared between
//! instances.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CyberusKeyError, Result};

/// Default Cyberus Key API base URI.
pub const DEFAULT_API_URI: &str = "https://api.cyberuskey.com";

/// Public key Cyberus Key signs identity tokens with.
pub const DEFAULT_SIGNING_PUBLIC_KEY: &str = "-----BEGIN PUBLIC KEY-----
MIGeMA0GCSqGSIb3DQEBAQUAA4GMADCBiAKBgHElKnuERpCN/WcD6RtS9rKhJODM
Idr2Y1yFrS255cOaG10CLwFPhSVK5z4HQv5/VN3GB2Ft+fbu9OZRTqdA4lHo0PB3
Kaj3yByDUdIoTHd4RmZMLSFVHKR0KAW193nI7s/pzeqDL0oFpHnRNZGUqhRbm2UK
fHHDWKkTn/iGIV7XAgMBAAE=
-----END PUBLIC KEY-----";

/// Relying-party configuration for one Cyberus Key client.
///
/// `client_id`, `client_secret` and `redirect_uri` are fixed at
/// construction. `api_uri` and `signing_public_key` can be changed through
/// [`ClientConfig::set_api_uri`] and [`ClientConfig::set_signing_public_key`].
///
/// # Examples
///
/// ```
/// use cyberuskey::config::ClientConfig;
///
/// let mut config = ClientConfig::new("c", "s", "https://app/cb");
/// assert_eq!(config.api_uri().as_str(), "https://api.cyberuskey.com/");
///
/// config.set_api_uri("https://staging.example.com/").unwrap();
/// assert!(config.set_api_uri("not-a-uri").is_err());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    client_id: String,

    #[serde(skip_serializing)]
    client_secret: String,

    redirect_uri: String,

    /// Provider base URI; the token endpoint is `{api_uri}/api/v2/tokens`
    #[serde(default = "default_api_uri")]
    api_uri: Url,

    /// PEM-encoded RSA public key used to verify identity tokens
    #[serde(default = "default_signing_public_key")]
    signing_public_key: String,

    /// Timeout for the token endpoint request (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Clock skew tolerated when checking `exp` (seconds)
    #[serde(default = "default_leeway_seconds")]
    pub leeway_seconds: u64,

    /// Logging settings for host applications calling [`crate::logging::init_logging`]
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_api_uri() -> Url {
    Url::parse(DEFAULT_API_URI).expect("DEFAULT_API_URI is a valid absolute URI")
}

fn default_signing_public_key() -> String {
    DEFAULT_SIGNING_PUBLIC_KEY.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_leeway_seconds() -> u64 {
    60
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_uri", &self.api_uri.as_str())
            .field("timeout_seconds", &self.timeout_seconds)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Creates a configuration with the default provider URI and key.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            api_uri: default_api_uri(),
            signing_public_key: default_signing_public_key(),
            timeout_seconds: default_timeout_seconds(),
            leeway_seconds: default_leeway_seconds(),
            logging: LoggingConfig::default(),
        }
    }

    /// Loads a configuration from a YAML file and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`CyberusKeyError::Io`] if the file cannot be read,
    /// [`CyberusKeyError::Yaml`] if it does not parse, or the error from
    /// [`ClientConfig::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;

        tracing::debug!(path = %path.display(), client_id = %config.client_id, "Loaded client configuration");
        Ok(config)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns [`CyberusKeyError::Config`] for empty credentials or a zero
    /// timeout, and [`CyberusKeyError::InvalidConfigValue`] if `api_uri`
    /// has no scheme or authority.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(CyberusKeyError::Config("client_id cannot be empty".to_string()));
        }

        if self.client_secret.is_empty() {
            return Err(CyberusKeyError::Config(
                "client_secret cannot be empty".to_string(),
            ));
        }

        if self.redirect_uri.is_empty() {
            return Err(CyberusKeyError::Config(
                "redirect_uri cannot be empty".to_string(),
            ));
        }

        parse_absolute_uri(self.api_uri.as_str())?;

        if self.timeout_seconds == 0 {
            return Err(CyberusKeyError::Config(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Client identifier registered with the provider
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Redirect URI registered with the provider
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Provider base URI, in the normalized form produced by [`Url`]
    /// (`https://host` reads back as `https://host/`).
    pub fn api_uri(&self) -> &Url {
        &self.api_uri
    }

    /// Replaces the provider base URI.
    ///
    /// # Errors
    ///
    /// Returns [`CyberusKeyError::InvalidConfigValue`] carrying the rejected
    /// value unless it is an absolute URI with a scheme and an authority.
    ///
    /// The value is stored parsed, so [`ClientConfig::api_uri`] returns its
    /// normalized form rather than the exact string passed in.
    pub fn set_api_uri(&mut self, uri: &str) -> Result<()> {
        self.api_uri = parse_absolute_uri(uri)?;
        Ok(())
    }

    /// PEM-encoded provider signing key
    pub fn signing_public_key(&self) -> &str {
        &self.signing_public_key
    }

    /// Replaces the provider signing key. The key is not checked here; a
    /// malformed key surfaces when the next identity token is verified.
    pub fn set_signing_public_key(&mut self, key: impl Into<String>) {
        self.signing_public_key = key.into();
    }

    /// Token endpoint derived from the base URI.
    ///
    /// `/api/v2/tokens` is appended to the base path. Any query or fragment
    /// on the base URI is dropped.
    pub fn token_endpoint(&self) -> Result<Url> {
        let mut url = self.api_uri.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| CyberusKeyError::InvalidConfigValue(self.api_uri.to_string()))?
            .pop_if_empty()
            .extend(["api", "v2", "tokens"]);
        Ok(url)
    }
}

/// Parses `uri`, accepting it only when it has both a scheme and an
/// authority component.
pub fn parse_absolute_uri(uri: &str) -> Result<Url> {
    match Url::parse(uri) {
        Ok(url) if url.has_host() && !url.cannot_be_a_base() => Ok(url),
        _ => Err(CyberusKeyError::InvalidConfigValue(uri.to_string())),
    }
}

/// Returns `true` when `uri` is an absolute URI with scheme and authority.
pub fn is_uri(uri: &str) -> bool {
    parse_absolute_uri(uri).is_ok()
}

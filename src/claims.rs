//! Identity token claims
//!
//! [`IdTokenClaims`] is the decoded payload of a verified Cyberus Key
//! identity token. Well-known claims get typed fields; everything else the
//! provider sends is kept in [`IdTokenClaims::extra`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `aud` claim: a single audience or a list of audiences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// Single audience string
    Single(String),
    /// Array of audiences
    Multiple(Vec<String>),
}

impl Audience {
    /// Returns `true` when `client_id` is one of the audiences.
    pub fn contains(&self, client_id: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == client_id,
            Audience::Multiple(auds) => auds.iter().any(|aud| aud == client_id),
        }
    }
}

/// Claims carried by a Cyberus Key identity token.
///
/// # Examples
///
/// ```
/// use cyberuskey::claims::IdTokenClaims;
///
/// let json = r#"{
///     "iss": "https://api.cyberuskey.com",
///     "sub": "user-1",
///     "aud": "client-1",
///     "exp": 1900000000,
///     "iat": 1800000000,
///     "mobile": "device-42",
///     "email": "john@example.com",
///     "locale": "en"
/// }"#;
///
/// let claims: IdTokenClaims = serde_json::from_str(json).unwrap();
/// assert!(claims.aud.contains("client-1"));
/// assert_eq!(claims.mobile.as_deref(), Some("device-42"));
/// assert_eq!(claims.get("locale").unwrap(), "en");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer
    pub iss: String,

    /// Subject: the user's OpenID identifier
    pub sub: String,

    /// Audience: the client identifier the token was issued to
    pub aud: Audience,

    /// Signing algorithm echoed by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Expiration time (seconds since the Unix epoch)
    pub exp: i64,

    /// Issued-at time (seconds since the Unix epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Identifier of the app instance that confirmed the login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,

    /// Nonce echoed from the authorization request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Access token hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_hash: Option<String>,

    /// Authorization code hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Full name, e.g. `John Cook`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    /// Any other claims present in the token
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl IdTokenClaims {
    /// Returns the claim set as a name → value mapping.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Looks up a single claim by name, typed or extra.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.to_map().remove(name)
    }
}

//! Redirect query parameters
//!
//! After the user confirms the login, Cyberus Key redirects back to the
//! client's `redirect_uri` with `code` and `state` (or `error` and
//! `error_description`) in the query string. [`RedirectParams`] normalizes
//! whatever shape the host framework hands over.

use std::collections::HashMap;

use url::Url;

/// Query parameters received on the redirect endpoint.
///
/// Repeated keys keep every value in arrival order; lookups return the
/// first non-empty one.
///
/// # Examples
///
/// ```
/// use cyberuskey::redirect::RedirectParams;
///
/// let params = RedirectParams::from_query("?code=abc&state=xyz");
/// assert_eq!(params.code(), Some("abc"));
/// assert_eq!(params.state(), Some("xyz"));
/// assert_eq!(params.error(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams {
    values: HashMap<String, Vec<String>>,
}

impl RedirectParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` query string. A leading
    /// `?` is ignored.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// Extracts the query parameters of a full callback URL.
    pub fn from_url(url: &Url) -> Self {
        url.query_pairs().into_owned().collect()
    }

    /// Adds a value, keeping values already present for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Returns the first non-empty value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)?
            .iter()
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }

    /// Returns every value of `key`.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Authorization code
    pub fn code(&self) -> Option<&str> {
        self.get("code")
    }

    /// Echoed `state`
    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    /// Provider-reported error tag
    pub fn error(&self) -> Option<&str> {
        self.get("error")
    }

    /// Provider-reported error description
    pub fn error_description(&self) -> Option<&str> {
        self.get("error_description")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RedirectParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl From<HashMap<String, String>> for RedirectParams {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<HashMap<String, Vec<String>>> for RedirectParams {
    fn from(values: HashMap<String, Vec<String>>) -> Self {
        Self { values }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RedirectParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

use std::fs;
use std::path::PathBuf;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tempfile::TempDir;

use cyberuskey::AuthClient;

pub const CLIENT_ID: &str = "c";
pub const CLIENT_SECRET: &str = "s";
pub const REDIRECT_URI: &str = "https://app/cb";

pub const PROVIDER_PRIVATE_KEY: &str = include_str!("../fixtures/provider_private.pem");
pub const PROVIDER_PUBLIC_KEY: &str = include_str!("../fixtures/provider_public.pem");
#[allow(dead_code)]
pub const UNRELATED_PUBLIC_KEY: &str = include_str!("../fixtures/unrelated_public.pem");

/// Claims of a freshly issued, unbound identity token for [`CLIENT_ID`].
pub fn base_claims() -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": "https://api.cyberuskey.com",
        "sub": "user-123",
        "aud": CLIENT_ID,
        "alg": "RS256",
        "iat": now,
        "exp": now + 600,
        "mobile": "app-instance-1",
        "email": "john@example.com",
        "name": "John Cook",
        "given_name": "John",
        "family_name": "Cook"
    })
}

/// Signs `claims` with the fixture provider key.
pub fn sign_id_token(claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(PROVIDER_PRIVATE_KEY.as_bytes())
        .expect("fixture private key must parse");
    encode(&Header::new(Algorithm::RS256), claims, &key).expect("signing must succeed")
}

/// Builds a client pointed at `api_uri` that trusts the fixture provider key.
pub fn client_for(api_uri: &str) -> AuthClient {
    let mut client =
        AuthClient::new(CLIENT_ID, CLIENT_SECRET, REDIRECT_URI).expect("client must build");
    client.set_api_uri(api_uri).expect("mock server URI is valid");
    client.set_signing_public_key(PROVIDER_PUBLIC_KEY);
    client
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("cyberuskey.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

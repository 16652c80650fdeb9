use std::time::Duration;

use async_trait::async_trait;
use eventoffer_common::AuthConfig;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AuthError;

const PEM_HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_FOOTER: &str = "-----END PUBLIC KEY-----";

/// Where the verifier gets the provider's public signing key from.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Returns the key as a PEM document.
    async fn fetch_public_key(&self) -> Result<String, AuthError>;
}

/// Fetches `public_key` from the realm metadata endpoint
/// (`{server_url}/realms/{realm}`).
pub struct RealmKeySource {
    client: wreq::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RealmMetadata {
    #[serde(default)]
    public_key: Option<String>,
}

impl RealmKeySource {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let timeout = Duration::from_secs(config.fetch_timeout_secs.max(1));
        let client = wreq::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|err| AuthError::Misconfigured(err.to_string()))?;
        Ok(Self {
            client,
            url: config.public_key_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl KeySource for RealmKeySource {
    async fn fetch_public_key(&self) -> Result<String, AuthError> {
        let response = self
            .client
            .get(self.url.as_str())
            .send()
            .await
            .map_err(|err| {
                warn!(url = %self.url, error = %err, "realm key request failed");
                AuthError::KeyUnavailable(err.to_string())
            })?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = %status, "realm key request rejected");
            return Err(AuthError::KeyUnavailable(format!(
                "realm endpoint returned {status}"
            )));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| AuthError::KeyUnavailable(err.to_string()))?;
        let metadata: RealmMetadata = serde_json::from_slice(&body)
            .map_err(|err| AuthError::KeyUnavailable(format!("realm metadata: {err}")))?;
        let key = metadata
            .public_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AuthError::KeyUnavailable("realm metadata has no public_key".into()))?;

        debug!(url = %self.url, "realm key fetched");
        Ok(wrap_public_key(&key))
    }
}

/// Wraps bare base64 key material in a `PUBLIC KEY` PEM envelope.
///
/// Input that is already armored is returned trimmed but otherwise untouched.
pub fn wrap_public_key(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("-----BEGIN") {
        return raw.to_string();
    }

    let body: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut pem = String::with_capacity(body.len() + body.len() / 64 + 64);
    pem.push_str(PEM_HEADER);
    pem.push('\n');
    for line in body.as_bytes().chunks(64) {
        // base64 is ASCII, chunking on bytes stays on char boundaries.
        pem.push_str(&String::from_utf8_lossy(line));
        pem.push('\n');
    }
    pem.push_str(PEM_FOOTER);
    pem
}

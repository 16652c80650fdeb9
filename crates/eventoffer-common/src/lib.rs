use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Signature algorithms a realm key may be used with. Symmetric (HS*) algorithms
/// are rejected: the verifier only ever holds the provider's public key.
pub const ASYMMETRIC_ALGORITHMS: &[&str] = &[
    "RS256", "RS384", "RS512", "PS256", "PS384", "PS512", "ES256", "ES384", "EdDSA",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GlobalConfigError {
    #[error("missing required global config field: {0}")]
    MissingField(&'static str),
    #[error("unsupported token algorithm: {0}")]
    InvalidAlgorithm(String),
    #[error("at least one token algorithm is required")]
    NoAlgorithms,
}

/// Identity provider settings used by the token verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub server_url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub algorithms: Vec<String>,
    pub audience: String,
    /// How long a fetched realm key is trusted before it is fetched again.
    pub key_ttl_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            server_url: "http://keycloak:8080".to_string(),
            realm: "myrealm".to_string(),
            client_id: "fastapi-client".to_string(),
            client_secret: "your-client-secret".to_string(),
            algorithms: vec!["RS256".to_string()],
            audience: "account".to_string(),
            key_ttl_secs: 300,
            fetch_timeout_secs: 5,
        }
    }
}

impl AuthConfig {
    /// Realm metadata endpoint; its JSON body carries the realm `public_key`.
    pub fn public_key_url(&self) -> String {
        format!(
            "{}/realms/{}",
            self.server_url.trim_end_matches('/'),
            self.realm
        )
    }

    pub fn well_known_url(&self) -> String {
        format!("{}/.well-known/openid-configuration", self.public_key_url())
    }

    fn validate(&self) -> Result<(), GlobalConfigError> {
        if self.algorithms.is_empty() {
            return Err(GlobalConfigError::NoAlgorithms);
        }
        for alg in &self.algorithms {
            if !ASYMMETRIC_ALGORITHMS.contains(&alg.as_str()) {
                return Err(GlobalConfigError::InvalidAlgorithm(alg.clone()));
            }
        }
        Ok(())
    }
}

/// Final, merged global configuration used by the running process.
///
/// Merge order: CLI > ENV > defaults. clap resolves CLI > ENV per field, the
/// result is overlaid on top of [`GlobalConfigPatch::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub host: String,
    pub port: u16,
    /// Database DSN used for this process.
    pub dsn: String,
    /// Put every `/api` resource route behind the bearer-token gate.
    pub require_auth: bool,
    pub auth: AuthConfig,
}

/// Optional layer used for merging global config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfigPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dsn: Option<String>,
    pub require_auth: Option<bool>,
    pub auth: AuthConfigPatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfigPatch {
    pub server_url: Option<String>,
    pub realm: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub algorithms: Option<Vec<String>>,
    pub audience: Option<String>,
    pub key_ttl_secs: Option<u64>,
    pub fetch_timeout_secs: Option<u64>,
}

impl AuthConfigPatch {
    pub fn overlay(&mut self, other: AuthConfigPatch) {
        if other.server_url.is_some() {
            self.server_url = other.server_url;
        }
        if other.realm.is_some() {
            self.realm = other.realm;
        }
        if other.client_id.is_some() {
            self.client_id = other.client_id;
        }
        if other.client_secret.is_some() {
            self.client_secret = other.client_secret;
        }
        if other.algorithms.is_some() {
            self.algorithms = other.algorithms;
        }
        if other.audience.is_some() {
            self.audience = other.audience;
        }
        if other.key_ttl_secs.is_some() {
            self.key_ttl_secs = other.key_ttl_secs;
        }
        if other.fetch_timeout_secs.is_some() {
            self.fetch_timeout_secs = other.fetch_timeout_secs;
        }
    }

    pub fn into_config(self) -> Result<AuthConfig, GlobalConfigError> {
        let defaults = AuthConfig::default();
        let config = AuthConfig {
            server_url: self.server_url.unwrap_or(defaults.server_url),
            realm: self.realm.unwrap_or(defaults.realm),
            client_id: self.client_id.unwrap_or(defaults.client_id),
            client_secret: self.client_secret.unwrap_or(defaults.client_secret),
            algorithms: self.algorithms.unwrap_or(defaults.algorithms),
            audience: self.audience.unwrap_or(defaults.audience),
            key_ttl_secs: self.key_ttl_secs.unwrap_or(defaults.key_ttl_secs),
            fetch_timeout_secs: self
                .fetch_timeout_secs
                .unwrap_or(defaults.fetch_timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

impl GlobalConfigPatch {
    pub fn overlay(&mut self, other: GlobalConfigPatch) {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.dsn.is_some() {
            self.dsn = other.dsn;
        }
        if other.require_auth.is_some() {
            self.require_auth = other.require_auth;
        }
        self.auth.overlay(other.auth);
    }

    pub fn into_config(self) -> Result<GlobalConfig, GlobalConfigError> {
        Ok(GlobalConfig {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            dsn: self.dsn.ok_or(GlobalConfigError::MissingField("dsn"))?,
            require_auth: self.require_auth.unwrap_or(false),
            auth: self.auth.into_config()?,
        })
    }
}

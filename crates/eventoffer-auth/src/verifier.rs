use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use eventoffer_common::AuthConfig;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::claims::{RawClaims, VerifiedClaims};
use crate::error::AuthError;
use crate::key_source::{KeySource, RealmKeySource};

/// A failed signature check only refetches the key if the cached one is at
/// least this old.
const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(10);

struct CachedKey {
    key: DecodingKey,
    fetched_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    fn of(alg: Algorithm) -> Option<Self> {
        match alg {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Some(Self::Rsa),
            Algorithm::ES256 | Algorithm::ES384 => Some(Self::Ec),
            Algorithm::EdDSA => Some(Self::Ed),
            _ => None,
        }
    }

    fn decoding_key(self, pem: &str) -> Result<DecodingKey, AuthError> {
        let key = match self {
            Self::Rsa => DecodingKey::from_rsa_pem(pem.as_bytes()),
            Self::Ec => DecodingKey::from_ec_pem(pem.as_bytes()),
            Self::Ed => DecodingKey::from_ed_pem(pem.as_bytes()),
        };
        key.map_err(|err| AuthError::KeyUnavailable(format!("unusable realm key: {err}")))
    }
}

/// Verifies bearer tokens against the realm key supplied by a [`KeySource`].
pub struct TokenVerifier {
    source: Arc<dyn KeySource>,
    validation: Validation,
    family: KeyFamily,
    ttl: Duration,
    refresh_cooldown: Duration,
    cached: ArcSwapOption<CachedKey>,
    fetch_lock: Mutex<()>,
}

impl TokenVerifier {
    /// Verifier that fetches keys from the realm endpoint named in `config`.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let source = RealmKeySource::new(config)?;
        Self::new(config, Arc::new(source))
    }

    pub fn new(config: &AuthConfig, source: Arc<dyn KeySource>) -> Result<Self, AuthError> {
        let algorithms = config
            .algorithms
            .iter()
            .map(|name| {
                Algorithm::from_str(name)
                    .map_err(|_| AuthError::Misconfigured(format!("unknown algorithm {name}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let Some(first) = algorithms.first().copied() else {
            return Err(AuthError::Misconfigured("no algorithms configured".into()));
        };
        let family = KeyFamily::of(first)
            .ok_or_else(|| AuthError::Misconfigured(format!("{first:?} needs a shared secret")))?;
        if algorithms.iter().any(|alg| KeyFamily::of(*alg) != Some(family)) {
            return Err(AuthError::Misconfigured(
                "algorithms must share one key type".into(),
            ));
        }

        let mut validation = Validation::new(first);
        validation.algorithms = algorithms;
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "aud", "sub"]);

        Ok(Self {
            source,
            validation,
            family,
            ttl: Duration::from_secs(config.key_ttl_secs),
            refresh_cooldown: DEFAULT_REFRESH_COOLDOWN,
            cached: ArcSwapOption::empty(),
            fetch_lock: Mutex::new(()),
        })
    }

    pub fn with_refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.refresh_cooldown = cooldown;
        self
    }

    /// Verifies the value of an `Authorization` header.
    pub async fn verify_bearer(&self, header: Option<&str>) -> Result<VerifiedClaims, AuthError> {
        let token = header.and_then(bearer_token).ok_or(AuthError::MissingToken)?;
        self.verify(token).await
    }

    pub async fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        let (key, from_cache) = self.current_key().await?;
        match self.decode(token, &key.key) {
            Err(err)
                if from_cache
                    && matches!(err.kind(), ErrorKind::InvalidSignature)
                    && key.fetched_at.elapsed() >= self.refresh_cooldown =>
            {
                debug!("signature rejected by cached realm key, refetching");
                let key = self.refresh(Some(&key)).await?;
                self.decode(token, &key.key).map_err(AuthError::from)
            }
            result => result.map_err(AuthError::from),
        }
    }

    /// Drops the cached key; the next verification fetches a fresh one.
    pub fn invalidate(&self) {
        self.cached.store(None);
    }

    fn decode(
        &self,
        token: &str,
        key: &DecodingKey,
    ) -> jsonwebtoken::errors::Result<VerifiedClaims> {
        let data = jsonwebtoken::decode::<RawClaims>(token, key, &self.validation)?;
        Ok(data.claims.into())
    }

    async fn current_key(&self) -> Result<(Arc<CachedKey>, bool), AuthError> {
        if let Some(key) = self.fresh_cached() {
            return Ok((key, true));
        }
        Ok((self.refresh(None).await?, false))
    }

    fn fresh_cached(&self) -> Option<Arc<CachedKey>> {
        self.cached
            .load_full()
            .filter(|key| key.fetched_at.elapsed() < self.ttl)
    }

    /// Fetches a new key unless another caller already replaced `stale` (or
    /// filled an empty cache) while we waited for the lock.
    async fn refresh(&self, stale: Option<&Arc<CachedKey>>) -> Result<Arc<CachedKey>, AuthError> {
        let _guard = self.fetch_lock.lock().await;
        if let Some(current) = self.fresh_cached() {
            let replaced = match stale {
                Some(stale) => !Arc::ptr_eq(&current, stale),
                None => true,
            };
            if replaced {
                return Ok(current);
            }
        }

        let pem = self.source.fetch_public_key().await?;
        let key = Arc::new(CachedKey {
            key: self.family.decoding_key(&pem)?,
            fetched_at: Instant::now(),
        });
        self.cached.store(Some(key.clone()));
        info!(ttl_secs = self.ttl.as_secs(), "realm key cached");
        Ok(key)
    }
}

/// Token part of an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

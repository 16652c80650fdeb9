use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims of a token whose signature and audience checked out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedClaims {
    pub sub: String,
    /// `preferred_username`.
    pub username: Option<String>,
    pub email: Option<String>,
    /// `realm_access.roles`.
    pub roles: Vec<String>,
    /// Every other claim, `exp` and `aud` included.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    sub: String,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    realm_access: Option<RealmAccess>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RealmAccess {
    #[serde(default)]
    roles: Vec<String>,
}

impl From<RawClaims> for VerifiedClaims {
    fn from(raw: RawClaims) -> Self {
        Self {
            sub: raw.sub,
            username: raw.preferred_username,
            email: raw.email,
            roles: raw.realm_access.unwrap_or_default().roles,
            extra: raw.extra,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token expired")]
    Expired,
    /// The realm key could not be fetched or parsed.
    #[error("signing key unavailable: {0}")]
    KeyUnavailable(String),
    #[error("verifier misconfigured: {0}")]
    Misconfigured(String),
}

impl AuthError {
    /// Failures the caller caused; everything else is on our side.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::Expired
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken(err.to_string()),
        }
    }
}

//! Bearer-token verification against an identity provider's realm key.
//!
//! The flow has two steps: fetch the realm public key ([`KeySource`]) and
//! decode the token with it ([`TokenVerifier`]). Fetched keys are cached for
//! the configured TTL and refetched once when a signature check fails.

mod claims;
mod error;
mod key_source;
mod verifier;

pub use claims::VerifiedClaims;
pub use error::AuthError;
pub use key_source::{KeySource, RealmKeySource, wrap_public_key};
pub use verifier::{TokenVerifier, bearer_token};

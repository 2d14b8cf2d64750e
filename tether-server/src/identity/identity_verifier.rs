use async_trait::async_trait;
use tether_core::SubjectId;
use thiserror::Error;

/// Reasons a credential can be refused. The messages are sent to clients as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidCredential,

    #[error("Token has expired")]
    CredentialExpired,
}

/// Turns an opaque credential into the identity it represents.
///
/// Called once per inbound event; implementations must not cache results
/// across calls on behalf of the relay.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<SubjectId, AuthError>;
}

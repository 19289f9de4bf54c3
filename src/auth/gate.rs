//! Auth gate contract
//!
//! Turns an `Authorization` header into a verified identity. Token
//! verification is delegated to an `AuthGate` implementation; header parsing
//! is shared so every gate reports header problems the same way.

use async_trait::async_trait;
use serde::Serialize;

/// Identity attached to a request after token verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedIdentity {
    /// External auth subject id
    pub identity: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingHeader,

    #[error("Authorization header must start with \"Bearer \"")]
    MalformedHeader,

    #[error("No token provided")]
    MissingToken,

    #[error("Token has expired")]
    Expired,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Invalid authentication token: {0}")]
    Invalid(String),

    #[error("Token verification failed: {0}")]
    VerificationFailed(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "NO_AUTH_HEADER",
            Self::MalformedHeader => "INVALID_AUTH_FORMAT",
            Self::MissingToken => "NO_TOKEN",
            Self::Expired => "TOKEN_EXPIRED",
            Self::Revoked => "TOKEN_REVOKED",
            Self::Invalid(_) => "INVALID_TOKEN",
            Self::VerificationFailed(_) => "AUTH_FAILED",
        }
    }

    /// Client-facing message, without verifier internals
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingHeader => "Authorization header is required",
            Self::MalformedHeader => "Authorization header must start with \"Bearer \"",
            Self::MissingToken => "No token provided",
            Self::Expired => "Token has expired. Please login again.",
            Self::Revoked => "Token has been revoked. Please login again.",
            Self::Invalid(_) => "Invalid authentication token.",
            Self::VerificationFailed(_) => "Authentication failed",
        }
    }
}

/// Verifies bearer tokens issued by the external identity provider
#[async_trait]
pub trait AuthGate: Send + Sync {
    /// Verify a raw token (without the `Bearer ` prefix)
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;

    /// Invalidate every token issued to `identity` so far
    async fn revoke_sessions(&self, identity: &str) -> Result<(), AuthError>;
}

/// Extract the bearer token from an Authorization header value
pub fn parse_bearer(auth_header: Option<&str>) -> Result<&str, AuthError> {
    let header = auth_header.ok_or(AuthError::MissingHeader)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

/// Parse the header and verify the token in one step
pub async fn authenticate(
    gate: &dyn AuthGate,
    auth_header: Option<&str>,
) -> Result<VerifiedIdentity, AuthError> {
    let token = parse_bearer(auth_header)?;
    gate.verify(token).await
}

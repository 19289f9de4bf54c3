//! JWT-based auth gate
//!
//! Verifies identity tokens issued by the external identity provider.
//!
//! - RS256 with the provider's PEM public key (production)
//! - HS256 with a shared secret (self-hosted issuers, dev mode, tests)
//! - Optional issuer / audience checks; a Firebase project id derives both
//! - Per-subject session revocation: tokens issued at or before the
//!   revocation instant are rejected

use async_trait::async_trait;
use dashmap::DashMap;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::gate::{AuthError, AuthGate, VerifiedIdentity};
use crate::types::PeerlinkError;

const DEV_SECRET: &str = "dev-mode-secret-not-for-production-use-123456";
const MIN_SECRET_LEN: usize = 32;

/// Claims read from an identity token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject: the external identity
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Issued at (Unix seconds)
    #[serde(default)]
    pub iat: u64,
    /// Expiration time (Unix seconds)
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Verification key material
#[derive(Debug, Clone)]
pub enum GateKey {
    /// Shared HMAC secret
    Hs256(String),
    /// PEM-encoded RSA public key
    Rs256Pem(String),
}

/// JWT auth gate configuration
#[derive(Debug, Clone)]
pub struct JwtGateConfig {
    pub key: GateKey,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl JwtGateConfig {
    /// Issuer and audience for a Firebase project
    pub fn for_firebase_project(key: GateKey, project_id: &str) -> Self {
        Self {
            key,
            issuer: Some(format!("https://securetoken.google.com/{}", project_id)),
            audience: Some(project_id.to_string()),
        }
    }
}

/// Auth gate verifying JWT identity tokens
pub struct JwtAuthGate {
    decoding_key: DecodingKey,
    validation: Validation,
    /// Subject -> revocation instant (Unix seconds)
    revoked: DashMap<String, u64>,
}

impl JwtAuthGate {
    /// Create a gate from configuration
    ///
    /// Returns an error if the secret is too short or the PEM does not parse
    pub fn new(config: JwtGateConfig) -> Result<Self, PeerlinkError> {
        let (algorithm, decoding_key) = match &config.key {
            GateKey::Hs256(secret) => {
                if secret.len() < MIN_SECRET_LEN {
                    return Err(PeerlinkError::Config(format!(
                        "AUTH_JWT_SECRET must be at least {} characters",
                        MIN_SECRET_LEN
                    )));
                }
                (Algorithm::HS256, DecodingKey::from_secret(secret.as_bytes()))
            }
            GateKey::Rs256Pem(pem) => {
                let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    PeerlinkError::Config(format!("Invalid AUTH_PUBLIC_KEY_PEM: {}", e))
                })?;
                (Algorithm::RS256, key)
            }
        };

        let mut validation = Validation::new(algorithm);
        match &config.issuer {
            Some(issuer) => validation.set_issuer(&[issuer]),
            None => validation.iss = None,
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            validation,
            revoked: DashMap::new(),
        })
    }

    /// Gate for dev mode using a fixed shared secret
    pub fn new_dev() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(DEV_SECRET.as_bytes()),
            validation,
            revoked: DashMap::new(),
        }
    }

    fn verify_claims(&self, token: &str) -> Result<IdTokenClaims, AuthError> {
        let data = decode::<IdTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::Invalid("empty subject".to_string()));
        }

        if let Some(revoked_at) = self.revoked.get(&claims.sub) {
            if claims.iat <= *revoked_at {
                return Err(AuthError::Revoked);
            }
        }

        Ok(claims)
    }
}

#[async_trait]
impl AuthGate for JwtAuthGate {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let claims = self.verify_claims(token)?;
        Ok(VerifiedIdentity {
            identity: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
        })
    }

    /// Tokens issued at or before now stop verifying for `identity`
    async fn revoke_sessions(&self, identity: &str) -> Result<(), AuthError> {
        self.revoked.insert(identity.to_string(), unix_now());
        debug!("Revoked sessions for {}", identity);
        Ok(())
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthError::Invalid(err.to_string()),
        _ => AuthError::VerificationFailed(err.to_string()),
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    fn claims(sub: &str, ttl_seconds: u64) -> IdTokenClaims {
        let now = unix_now();
        IdTokenClaims {
            sub: sub.into(),
            email: None,
            email_verified: false,
            iat: now,
            exp: now + ttl_seconds,
            iss: None,
            aud: None,
        }
    }

    fn sign_with(secret: &str, claims: &IdTokenClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn sign(claims: &IdTokenClaims) -> String {
        sign_with(SECRET, claims)
    }

    fn gate() -> JwtAuthGate {
        JwtAuthGate::new(JwtGateConfig {
            key: GateKey::Hs256(SECRET.into()),
            issuer: None,
            audience: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_sign_and_verify() {
        let gate = gate();
        let mut claims = claims("uid-123", 3600);
        claims.email = Some("a@b.edu".into());
        claims.email_verified = true;
        let token = sign(&claims);

        let identity = gate.verify(&token).await.unwrap();
        assert_eq!(identity.identity, "uid-123");
        assert_eq!(identity.email.as_deref(), Some("a@b.edu"));
        assert!(identity.email_verified);
    }

    #[tokio::test]
    async fn test_expired_token() {
        let gate = gate();
        let mut claims = claims("uid-123", 0);
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = sign(&claims);

        assert_eq!(gate.verify(&token).await, Err(AuthError::Expired));
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        let err = gate().verify("invalid-token").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_wrong_secret() {
        let token = sign_with(
            "different-secret-that-is-at-least-32-characters",
            &claims("uid-123", 3600),
        );

        let err = gate().verify(&token).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_issuer_and_audience() {
        let gate = JwtAuthGate::new(JwtGateConfig::for_firebase_project(
            GateKey::Hs256(SECRET.into()),
            "campus-app",
        ))
        .unwrap();

        let mut claims = claims("uid-123", 3600);
        claims.iss = Some("https://securetoken.google.com/campus-app".into());
        claims.aud = Some("campus-app".into());
        let token = sign(&claims);
        assert!(gate.verify(&token).await.is_ok());

        claims.aud = Some("other-app".into());
        let token = sign(&claims);
        assert_eq!(gate.verify(&token).await.unwrap_err().code(), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_revoked_sessions() {
        let gate = gate();
        let token = sign(&claims("uid-123", 3600));
        assert!(gate.verify(&token).await.is_ok());

        gate.revoke_sessions("uid-123").await.unwrap();
        assert_eq!(gate.verify(&token).await, Err(AuthError::Revoked));

        // Other subjects are unaffected
        let other = sign(&claims("uid-456", 3600));
        assert!(gate.verify(&other).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_subject_rejected() {
        let gate = gate();
        let token = sign(&claims("", 3600));
        assert_eq!(gate.verify(&token).await.unwrap_err().code(), "INVALID_TOKEN");
    }

    #[test]
    fn test_secret_validation() {
        let short = JwtGateConfig {
            key: GateKey::Hs256("short".into()),
            issuer: None,
            audience: None,
        };
        assert!(JwtAuthGate::new(short).is_err());

        let bad_pem = JwtGateConfig {
            key: GateKey::Rs256Pem("not a pem".into()),
            issuer: None,
            audience: None,
        };
        assert!(JwtAuthGate::new(bad_pem).is_err());
    }

    #[tokio::test]
    async fn test_dev_gate() {
        let gate = JwtAuthGate::new_dev();
        let token = sign_with(DEV_SECRET, &claims("dev-user", 60));
        assert_eq!(gate.verify(&token).await.unwrap().identity, "dev-user");
    }
}

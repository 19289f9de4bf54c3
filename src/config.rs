//! Configuration for Peerlink
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use uuid::Uuid;

use crate::auth::{GateKey, JwtGateConfig};

/// How skill matches are windowed before ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SkillRanking {
    /// Fetch `limit` candidates in presence order, then rank that window
    #[default]
    FetchWindow,
    /// Fetch every candidate, rank, then keep the top `limit`
    GlobalTopK,
}

/// Peerlink - student profiles and peer matching
#[derive(Parser, Debug, Clone)]
#[command(name = "peerlink")]
#[command(about = "Student collaboration backend: profiles and peer matching")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory store fallback, dev token secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format (text or json)
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "DATABASE_NAME", default_value = "peerlink")]
    pub database_name: String,

    /// Collection holding student profiles
    #[arg(long, env = "STUDENTS_COLLECTION", default_value = "students")]
    pub students_collection: String,

    /// HS256 shared secret for identity tokens
    #[arg(long, env = "AUTH_JWT_SECRET")]
    pub auth_jwt_secret: Option<String>,

    /// RS256 public key (PEM) for identity tokens
    #[arg(long, env = "AUTH_PUBLIC_KEY_PEM")]
    pub auth_public_key_pem: Option<String>,

    /// Firebase project id; sets the expected issuer and audience
    #[arg(long, env = "FIREBASE_PROJECT_ID")]
    pub firebase_project_id: Option<String>,

    /// Expected token issuer (overrides the Firebase-derived one)
    #[arg(long, env = "AUTH_ISSUER")]
    pub auth_issuer: Option<String>,

    /// Expected token audience (overrides the Firebase-derived one)
    #[arg(long, env = "AUTH_AUDIENCE")]
    pub auth_audience: Option<String>,

    /// Page size for peer listings when none is requested
    #[arg(long, env = "PEER_LIMIT_DEFAULT", default_value = "10")]
    pub peer_limit_default: usize,

    /// Largest page size a caller may request
    #[arg(long, env = "PEER_LIMIT_MAX", default_value = "100")]
    pub peer_limit_max: usize,

    /// Skill match windowing
    #[arg(long, env = "SKILL_RANKING", value_enum, default_value_t = SkillRanking::FetchWindow)]
    pub skill_ranking: SkillRanking,

    /// Reject peer queries from callers without a complete profile
    #[arg(long, env = "REQUIRE_COMPLETE_PROFILE", default_value = "false")]
    pub require_complete_profile: bool,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "10485760")]
    pub max_body_bytes: usize,
}

impl Args {
    /// Auth gate configuration, if a verification key is configured.
    ///
    /// The PEM key wins over the shared secret when both are set.
    pub fn gate_config(&self) -> Option<JwtGateConfig> {
        let key = match (&self.auth_public_key_pem, &self.auth_jwt_secret) {
            (Some(pem), _) => GateKey::Rs256Pem(pem.clone()),
            (None, Some(secret)) => GateKey::Hs256(secret.clone()),
            (None, None) => return None,
        };

        let mut config = match &self.firebase_project_id {
            Some(project) => JwtGateConfig::for_firebase_project(key, project),
            None => JwtGateConfig {
                key,
                issuer: None,
                audience: None,
            },
        };
        if let Some(issuer) = &self.auth_issuer {
            config.issuer = Some(issuer.clone());
        }
        if let Some(audience) = &self.auth_audience {
            config.audience = Some(audience.clone());
        }
        Some(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode
            && self.auth_jwt_secret.is_none()
            && self.auth_public_key_pem.is_none()
        {
            return Err(
                "AUTH_JWT_SECRET or AUTH_PUBLIC_KEY_PEM is required in production mode".to_string(),
            );
        }

        // The secret only matters when no public key takes precedence
        if let (Some(secret), None) = (&self.auth_jwt_secret, &self.auth_public_key_pem) {
            if secret.len() < 32 {
                return Err("AUTH_JWT_SECRET must be at least 32 characters".to_string());
            }
        }

        if self.peer_limit_default == 0 || self.peer_limit_default > self.peer_limit_max {
            return Err(
                "PEER_LIMIT_DEFAULT must be positive and not exceed PEER_LIMIT_MAX".to_string(),
            );
        }

        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err("LOG_FORMAT must be 'text' or 'json'".to_string());
        }

        Ok(())
    }
}

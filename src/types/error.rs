//! Error types for Peerlink
//!
//! Every rejection maps to a stable machine-readable code, an HTTP status
//! and a message that is safe to show to clients.

use hyper::StatusCode;

use crate::auth::AuthError;

/// Which uniqueness constraint a write ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Another profile already uses this institutional email
    EmailExists,
    /// The external identity is already linked to a profile
    IdentityExists,
    /// Some other unique constraint was violated
    Duplicate,
}

impl ConflictKind {
    /// Map the name of a violated unique index to a conflict kind
    pub fn from_index_name(index: &str) -> Self {
        if index.contains("collegeEmail") {
            Self::EmailExists
        } else if index.contains("firebaseUID") {
            Self::IdentityExists
        } else {
            Self::Duplicate
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::EmailExists => "EMAIL_EXISTS",
            Self::IdentityExists => "UID_EXISTS",
            Self::Duplicate => "DUPLICATE_DATA",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::EmailExists => "A student with this email already exists",
            Self::IdentityExists => "This account is already linked to a student profile",
            Self::Duplicate => "A student with this information already exists",
        }
    }
}

/// Main error type for Peerlink operations
#[derive(Debug, thiserror::Error)]
pub enum PeerlinkError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Conflict: {}", .0.message())]
    Conflict(ConflictKind),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Profile incomplete")]
    ProfileIncomplete,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PeerlinkError {
    /// Validation failure naming the offending field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ProfileIncomplete => StatusCode::FORBIDDEN,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Conflict(kind) => kind.code(),
            Self::NotFound(_) => "PROFILE_NOT_FOUND",
            Self::ProfileIncomplete => "PROFILE_INCOMPLETE",
            Self::Auth(err) => err.code(),
            Self::Database(_) => "DB_ERROR",
            Self::Config(_) | Self::Internal(_) => "SERVER_ERROR",
        }
    }

    /// Message safe to return to clients.
    ///
    /// Storage and internal failures are reduced to a generic message; the
    /// detailed text only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Conflict(kind) => kind.message().to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::ProfileIncomplete => {
                "Profile is incomplete. Please complete your profile.".to_string()
            }
            Self::Auth(err) => err.message().to_string(),
            Self::Database(_) => "Database error".to_string(),
            Self::Config(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Field name for validation failures
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PeerlinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("Invalid JSON: {}", err))
    }
}

impl From<mongodb::error::Error> for PeerlinkError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<std::io::Error> for PeerlinkError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<hyper::Error> for PeerlinkError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

/// Result type alias for Peerlink operations
pub type Result<T> = std::result::Result<T, PeerlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_kind_from_index_name() {
        assert_eq!(
            ConflictKind::from_index_name("personalInfo.collegeEmail_1"),
            ConflictKind::EmailExists
        );
        assert_eq!(
            ConflictKind::from_index_name("firebaseUID_1"),
            ConflictKind::IdentityExists
        );
        assert_eq!(ConflictKind::from_index_name("_id_"), ConflictKind::Duplicate);
    }

    #[test]
    fn test_database_errors_do_not_leak() {
        let err = PeerlinkError::Database("E11000 connection reset by peer 10.0.0.3".into());
        assert_eq!(err.public_message(), "Database error");
        assert_eq!(err.code(), "DB_ERROR");
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validation_error_carries_field() {
        let err = PeerlinkError::validation("personalInfo.fullName", "personalInfo.fullName is required");
        assert_eq!(err.field(), Some("personalInfo.fullName"));
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_conflict_codes_are_distinct() {
        let email = PeerlinkError::Conflict(ConflictKind::EmailExists);
        let uid = PeerlinkError::Conflict(ConflictKind::IdentityExists);
        assert_eq!(email.code(), "EMAIL_EXISTS");
        assert_eq!(uid.code(), "UID_EXISTS");
        assert_eq!(email.status_code(), StatusCode::CONFLICT);
    }
}

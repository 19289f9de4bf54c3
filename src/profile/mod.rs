//! Student profile model
//!
//! `Profile` is the canonical record produced by the validator and returned
//! by every store. Storage layouts convert to and from it.

pub mod submission;
pub mod validation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use submission::{ProfileSubmission, RawSubmission};
pub use validation::{validate_submission, ProfileValidator};

/// Personal details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    /// Institutional email, trimmed and lower-cased
    pub college_email: String,
    pub roll_number: String,
}

/// Academic placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicDetails {
    /// Stream / track, the primary key for peer matching
    pub stream: String,
    pub cohort: String,
    pub current_year: String,
}

/// Skills and portfolio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsInterests {
    pub main_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_link: Option<String>,
}

/// Collaboration preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationPrefs {
    pub stream_based: bool,
    pub cross_stream: bool,
    pub active_projects: Vec<String>,
    pub interested_in_new_projects: bool,
}

impl Default for CollaborationPrefs {
    fn default() -> Self {
        Self {
            stream_based: true,
            cross_stream: true,
            active_projects: Vec::new(),
            interested_in_new_projects: true,
        }
    }
}

/// Canonical student profile
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Persistent id assigned by the store (None until stored)
    pub id: Option<String>,
    /// External auth subject id
    pub identity: String,
    pub personal: PersonalInfo,
    pub academic: AcademicDetails,
    pub skills: SkillsInterests,
    pub collaboration: CollaborationPrefs,
    pub is_online: bool,
    pub last_active: DateTime<Utc>,
    pub profile_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn email(&self) -> &str {
        &self.personal.college_email
    }

    pub fn stream(&self) -> &str {
        &self.academic.stream
    }

    pub fn skills(&self) -> &[String] {
        &self.skills.main_skills
    }

    /// True if any of this profile's skills is in `query`
    pub fn has_any_skill(&self, query: &[String]) -> bool {
        self.skills.main_skills.iter().any(|s| query.contains(s))
    }
}

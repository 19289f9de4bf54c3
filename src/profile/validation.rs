//! Profile validation
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. required text fields, non-blank after trimming
//! 2. email format
//! 3. at least one skill

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::submission::{
    FieldSource, ProfileSubmission, RawSubmission, COHORT, COLLEGE_EMAIL, CURRENT_YEAR,
    FULL_NAME, MAIN_SKILLS, ROLL_NUMBER, STREAM,
};
use super::{AcademicDetails, CollaborationPrefs, PersonalInfo, Profile, SkillsInterests};
use crate::types::{PeerlinkError, Result};

/// local-part "@" domain "." tld, no whitespace, single "@"
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Check an email address against the accepted pattern
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Stateless validator turning raw submissions into canonical profiles
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileValidator;

impl ProfileValidator {
    pub fn new() -> Self {
        Self
    }

    /// Normalise and validate a raw submission for `identity`
    pub fn validate(&self, raw: &RawSubmission, identity: &str) -> Result<Profile> {
        let submission = ProfileSubmission::from_raw(raw);
        validate_submission(submission, identity, Utc::now())
    }
}

/// Validate a normalised submission.
///
/// `now` becomes both `created_at` and the initial `last_active`.
pub fn validate_submission(
    submission: ProfileSubmission,
    identity: &str,
    now: DateTime<Utc>,
) -> Result<Profile> {
    let full_name = required(&FULL_NAME, submission.full_name)?;
    let college_email = required(&COLLEGE_EMAIL, submission.college_email)?.to_lowercase();
    let roll_number = required(&ROLL_NUMBER, submission.roll_number)?;
    let stream = required(&STREAM, submission.stream)?;
    let cohort = required(&COHORT, submission.cohort)?;
    let current_year = required(&CURRENT_YEAR, submission.current_year)?;

    if !is_valid_email(&college_email) {
        return Err(PeerlinkError::validation(
            COLLEGE_EMAIL.name,
            "Invalid email format",
        ));
    }

    let main_skills = skills(submission.main_skills)?;

    let portfolio_link = submission
        .portfolio_link
        .map(|link| link.trim().to_string())
        .filter(|link| !link.is_empty());

    Ok(Profile {
        id: None,
        identity: identity.to_string(),
        personal: PersonalInfo {
            full_name,
            college_email,
            roll_number,
        },
        academic: AcademicDetails {
            stream,
            cohort,
            current_year,
        },
        skills: SkillsInterests {
            main_skills,
            portfolio_link,
        },
        collaboration: CollaborationPrefs::default(),
        is_online: false,
        last_active: now,
        profile_complete: true,
        created_at: now,
    })
}

fn required(field: &FieldSource, value: Option<String>) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PeerlinkError::validation(field.name, format!("{} is required", field.name)))
}

fn skills(value: Option<Vec<Value>>) -> Result<Vec<String>> {
    let mut tags = Vec::new();
    for item in value.unwrap_or_default() {
        match item {
            Value::String(tag) => {
                let tag = tag.trim();
                if !tag.is_empty() {
                    tags.push(tag.to_string());
                }
            }
            _ => {
                return Err(PeerlinkError::validation(
                    MAIN_SKILLS.name,
                    "Skills must be a list of strings",
                ))
            }
        }
    }

    if tags.is_empty() {
        return Err(PeerlinkError::validation(
            MAIN_SKILLS.name,
            "At least one skill must be selected",
        ));
    }

    Ok(tags)
}

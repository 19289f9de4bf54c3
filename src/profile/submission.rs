//! Raw profile submissions and their normalisation
//!
//! Clients send profile fields either nested (`personalInfo.fullName`) or
//! flat (`fullName`). Each logical field has an ordered list of JSON
//! pointers to probe; the first hit wins, nested locations come first.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Loosely structured submission body as received from the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSubmission(pub Value);

impl RawSubmission {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawSubmission {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A logical profile field and the locations it may be read from
#[derive(Debug, Clone, Copy)]
pub struct FieldSource {
    /// Canonical dotted name, used in validation errors
    pub name: &'static str,
    /// JSON pointers, probed in order
    pub probes: &'static [&'static str],
}

pub const FULL_NAME: FieldSource = FieldSource {
    name: "personalInfo.fullName",
    probes: &["/personalInfo/fullName", "/fullName"],
};

pub const COLLEGE_EMAIL: FieldSource = FieldSource {
    name: "personalInfo.collegeEmail",
    probes: &["/personalInfo/collegeEmail", "/collegeEmail"],
};

pub const ROLL_NUMBER: FieldSource = FieldSource {
    name: "personalInfo.rollNumber",
    probes: &["/personalInfo/rollNumber", "/rollNumber"],
};

pub const STREAM: FieldSource = FieldSource {
    name: "academicDetails.stream",
    probes: &["/academicDetails/stream", "/stream"],
};

pub const COHORT: FieldSource = FieldSource {
    name: "academicDetails.cohort",
    probes: &["/academicDetails/cohort", "/cohort"],
};

pub const CURRENT_YEAR: FieldSource = FieldSource {
    name: "academicDetails.currentYear",
    probes: &["/academicDetails/currentYear", "/currentYear"],
};

pub const MAIN_SKILLS: FieldSource = FieldSource {
    name: "skillsInterests.mainSkills",
    probes: &["/skillsInterests/mainSkills", "/mainSkills"],
};

pub const PORTFOLIO_LINK: FieldSource = FieldSource {
    name: "skillsInterests.portfolioLink",
    probes: &["/skillsInterests/portfolioLink", "/portfolioLink"],
};

impl FieldSource {
    /// Resolve a text value. Empty strings, nulls and other types fall
    /// through to the next probe; numbers are rendered as text.
    pub fn resolve_text(&self, raw: &Value) -> Option<String> {
        self.probes.iter().find_map(|pointer| match raw.pointer(pointer)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Resolve a list value. The first location holding an array wins,
    /// even when that array is empty.
    pub fn resolve_list(&self, raw: &Value) -> Option<Vec<Value>> {
        self.probes
            .iter()
            .find_map(|pointer| raw.pointer(pointer)?.as_array().cloned())
    }
}

/// Submission resolved into one shape, not yet validated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileSubmission {
    pub full_name: Option<String>,
    pub college_email: Option<String>,
    pub roll_number: Option<String>,
    pub stream: Option<String>,
    pub cohort: Option<String>,
    pub current_year: Option<String>,
    pub main_skills: Option<Vec<Value>>,
    pub portfolio_link: Option<String>,
}

impl ProfileSubmission {
    /// Normalise a raw submission by probing every field source
    pub fn from_raw(raw: &RawSubmission) -> Self {
        let value = raw.as_value();
        Self {
            full_name: FULL_NAME.resolve_text(value),
            college_email: COLLEGE_EMAIL.resolve_text(value),
            roll_number: ROLL_NUMBER.resolve_text(value),
            stream: STREAM.resolve_text(value),
            cohort: COHORT.resolve_text(value),
            current_year: CURRENT_YEAR.resolve_text(value),
            main_skills: MAIN_SKILLS.resolve_list(value),
            portfolio_link: PORTFOLIO_LINK.resolve_text(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_shape() {
        let raw = RawSubmission::new(json!({
            "personalInfo": { "fullName": "Asha Rao", "collegeEmail": "asha@uni.edu", "rollNumber": "21CS001" },
            "academicDetails": { "stream": "CSE", "cohort": "2021", "currentYear": "3" },
            "skillsInterests": { "mainSkills": ["rust"], "portfolioLink": "https://asha.dev" }
        }));

        let sub = ProfileSubmission::from_raw(&raw);
        assert_eq!(sub.full_name.as_deref(), Some("Asha Rao"));
        assert_eq!(sub.stream.as_deref(), Some("CSE"));
        assert_eq!(sub.main_skills, Some(vec![json!("rust")]));
        assert_eq!(sub.portfolio_link.as_deref(), Some("https://asha.dev"));
    }

    #[test]
    fn test_flat_shape() {
        let raw = RawSubmission::new(json!({
            "fullName": "Asha Rao",
            "collegeEmail": "asha@uni.edu",
            "rollNumber": "21CS001",
            "stream": "CSE",
            "cohort": "2021",
            "currentYear": 3,
            "mainSkills": ["rust", "go"]
        }));

        let sub = ProfileSubmission::from_raw(&raw);
        assert_eq!(sub.college_email.as_deref(), Some("asha@uni.edu"));
        assert_eq!(sub.current_year.as_deref(), Some("3"));
        assert_eq!(sub.main_skills.map(|s| s.len()), Some(2));
        assert_eq!(sub.portfolio_link, None);
    }

    #[test]
    fn test_nested_preferred_over_flat() {
        let raw = RawSubmission::new(json!({
            "personalInfo": { "fullName": "Nested Name" },
            "fullName": "Flat Name"
        }));
        assert_eq!(FULL_NAME.resolve_text(raw.as_value()).as_deref(), Some("Nested Name"));
    }

    #[test]
    fn test_empty_nested_falls_through_to_flat() {
        let raw = json!({
            "personalInfo": { "fullName": "" },
            "fullName": "Flat Name"
        });
        assert_eq!(FULL_NAME.resolve_text(&raw).as_deref(), Some("Flat Name"));
    }

    #[test]
    fn test_nested_empty_list_wins() {
        let raw = json!({
            "skillsInterests": { "mainSkills": [] },
            "mainSkills": ["rust"]
        });
        assert_eq!(MAIN_SKILLS.resolve_list(&raw), Some(vec![]));
    }

    #[test]
    fn test_non_text_values_are_absent() {
        let raw = json!({ "fullName": true, "stream": null });
        assert_eq!(FULL_NAME.resolve_text(&raw), None);
        assert_eq!(STREAM.resolve_text(&raw), None);
    }
}

//! Response shapes for the students API
//!
//! The caller's own profile is returned in full apart from the identity.
//! Peer listings use a narrower projection without roll numbers or
//! identities.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::profile::{AcademicDetails, CollaborationPrefs, PersonalInfo, Profile, SkillsInterests};
use crate::services::RankedProfile;

/// The caller's own profile
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView<'a> {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    pub personal_info: &'a PersonalInfo,
    pub academic_details: &'a AcademicDetails,
    pub skills_interests: &'a SkillsInterests,
    pub collaboration_prefs: &'a CollaborationPrefs,
    pub is_online: bool,
    pub last_active: DateTime<Utc>,
    pub profile_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Profile> for ProfileView<'a> {
    fn from(profile: &'a Profile) -> Self {
        Self {
            id: profile.id.as_deref(),
            personal_info: &profile.personal,
            academic_details: &profile.academic,
            skills_interests: &profile.skills,
            collaboration_prefs: &profile.collaboration,
            is_online: profile.is_online,
            last_active: profile.last_active,
            profile_complete: profile.profile_complete,
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerPersonal<'a> {
    pub full_name: &'a str,
    pub college_email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSkills<'a> {
    pub main_skills: &'a [String],
}

/// Another student as seen in a peer listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerView<'a> {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    pub personal_info: PeerPersonal<'a>,
    pub academic_details: &'a AcademicDetails,
    pub skills_interests: PeerSkills<'a>,
    pub is_online: bool,
    pub last_active: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_skills: Option<&'a [String]>,
}

impl<'a> From<&'a Profile> for PeerView<'a> {
    fn from(profile: &'a Profile) -> Self {
        Self {
            id: profile.id.as_deref(),
            personal_info: PeerPersonal {
                full_name: &profile.personal.full_name,
                college_email: &profile.personal.college_email,
            },
            academic_details: &profile.academic,
            skills_interests: PeerSkills {
                main_skills: &profile.skills.main_skills,
            },
            is_online: profile.is_online,
            last_active: profile.last_active,
            match_score: None,
            matching_skills: None,
        }
    }
}

impl<'a> From<&'a RankedProfile> for PeerView<'a> {
    fn from(ranked: &'a RankedProfile) -> Self {
        Self {
            match_score: Some(ranked.match_score),
            matching_skills: Some(&ranked.matching_skills),
            ..PeerView::from(&ranked.profile)
        }
    }
}

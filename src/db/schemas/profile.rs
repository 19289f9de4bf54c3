//! Student profile document schema
//!
//! Field names follow the existing `students` collection layout.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::profile::{AcademicDetails, CollaborationPrefs, PersonalInfo, Profile, SkillsInterests};

/// Student profile document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub personal_info: PersonalInfo,

    pub academic_details: AcademicDetails,

    pub skills_interests: SkillsInterests,

    #[serde(default)]
    pub collaboration_prefs: CollaborationPrefs,

    /// External auth subject id. Older documents carry an explicit null.
    #[serde(
        rename = "firebaseUID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub firebase_uid: Option<String>,

    pub created_at: DateTime,

    pub last_active: DateTime,

    #[serde(default)]
    pub is_online: bool,

    #[serde(default)]
    pub profile_complete: bool,
}

impl From<&Profile> for ProfileDoc {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile
                .id
                .as_deref()
                .and_then(|id| ObjectId::parse_str(id).ok()),
            personal_info: profile.personal.clone(),
            academic_details: profile.academic.clone(),
            skills_interests: profile.skills.clone(),
            collaboration_prefs: profile.collaboration.clone(),
            firebase_uid: Some(profile.identity.clone()).filter(|uid| !uid.is_empty()),
            created_at: DateTime::from_chrono(profile.created_at),
            last_active: DateTime::from_chrono(profile.last_active),
            is_online: profile.is_online,
            profile_complete: profile.profile_complete,
        }
    }
}

impl From<ProfileDoc> for Profile {
    fn from(doc: ProfileDoc) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()),
            identity: doc.firebase_uid.unwrap_or_default(),
            personal: doc.personal_info,
            academic: doc.academic_details,
            skills: doc.skills_interests,
            collaboration: doc.collaboration_prefs,
            is_online: doc.is_online,
            last_active: doc.last_active.to_chrono(),
            profile_complete: doc.profile_complete,
            created_at: doc.created_at.to_chrono(),
        }
    }
}

/// Index keys match the ones the collection was initialised with. Names
/// are left to the server so they line up with existing indexes.
impl IntoIndexes for ProfileDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Email uniqueness is enforced here, not by a pre-check
            (
                doc! { "personalInfo.collegeEmail": 1 },
                Some(IndexOptions::builder().unique(true).build()),
            ),
            // One profile per external identity
            (
                doc! { "firebaseUID": 1 },
                Some(IndexOptions::builder().unique(true).sparse(true).build()),
            ),
            (doc! { "academicDetails.stream": 1 }, None),
            (doc! { "skillsInterests.mainSkills": 1 }, None),
            (doc! { "isOnline": 1 }, None),
            (doc! { "lastActive": 1 }, None),
        ]
    }
}

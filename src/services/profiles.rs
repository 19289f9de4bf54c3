//! Profile service
//!
//! Creation, lookup and presence for the caller's own profile. Validation
//! happens before anything reaches the store; uniqueness is left to the store.

use std::sync::Arc;
use tracing::{debug, info};

use crate::profile::{Profile, ProfileValidator, RawSubmission};
use crate::store::ProfileStore;
use crate::types::{PeerlinkError, Result};

/// Profile operations for authenticated identities
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    validator: ProfileValidator,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            validator: ProfileValidator::new(),
        }
    }

    /// Validate a submission and store it as `identity`'s profile
    pub async fn create_profile(&self, raw: &RawSubmission, identity: &str) -> Result<Profile> {
        let profile = self.validator.validate(raw, identity).inspect_err(|e| {
            debug!("Rejected profile for {}: {}", identity, e);
        })?;

        let stored = self.store.create(profile).await?;
        info!(
            "Created profile for {} ({})",
            stored.identity,
            stored.email()
        );
        Ok(stored)
    }

    /// The caller's profile, or `NotFound`
    pub async fn get_profile(&self, identity: &str) -> Result<Profile> {
        self.store
            .find_by_identity(identity)
            .await?
            .ok_or_else(not_found)
    }

    /// Set the online flag and refresh last activity
    pub async fn set_presence(&self, identity: &str, is_online: bool) -> Result<()> {
        self.store.update_presence(identity, is_online).await?;
        debug!("Presence for {} set to {}", identity, is_online);
        Ok(())
    }

    /// Mark the caller online and return their refreshed profile
    pub async fn touch(&self, identity: &str) -> Result<Profile> {
        self.set_presence(identity, true).await?;
        self.get_profile(identity).await
    }

    /// Fail unless `identity` has a complete profile
    pub async fn require_complete_profile(&self, identity: &str) -> Result<Profile> {
        let profile = self.get_profile(identity).await?;
        if !profile.profile_complete {
            return Err(PeerlinkError::ProfileIncomplete);
        }
        Ok(profile)
    }
}

fn not_found() -> PeerlinkError {
    PeerlinkError::NotFound("Student profile".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::profile;
    use crate::store::MemoryProfileStore;
    use crate::types::ConflictKind;
    use serde_json::json;
    use tokio_test::assert_ok;

    fn service() -> (ProfileService, Arc<MemoryProfileStore>) {
        let store = Arc::new(MemoryProfileStore::new());
        (ProfileService::new(store.clone()), store)
    }

    fn submission(email: &str) -> RawSubmission {
        RawSubmission::new(json!({
            "personalInfo": { "fullName": "Asha Rao", "collegeEmail": email, "rollNumber": "21CS042" },
            "academicDetails": { "stream": "CSE", "cohort": "2021", "currentYear": 3 },
            "skillsInterests": { "mainSkills": ["rust", "ml"] }
        }))
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (service, _) = service();
        let created = service
            .create_profile(&submission("Asha@Uni.edu"), "uid-1")
            .await
            .unwrap();
        assert!(created.profile_complete);
        assert!(created.id.is_some());
        assert_eq!(created.email(), "asha@uni.edu");

        let fetched = service.get_profile("uid-1").await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_invalid_submission_not_persisted() {
        let (service, store) = service();
        let raw = RawSubmission::new(json!({ "fullName": "No Email" }));
        let err = service.create_profile(&raw, "uid-1").await.unwrap_err();
        assert_eq!(err.field(), Some("personalInfo.collegeEmail"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_email_and_identity() {
        let (service, _) = service();
        assert_ok!(service.create_profile(&submission("a@b.edu"), "uid-1").await);

        let err = service
            .create_profile(&submission("a@b.edu"), "uid-2")
            .await
            .unwrap_err();
        assert!(matches!(err, PeerlinkError::Conflict(ConflictKind::EmailExists)));

        let err = service
            .create_profile(&submission("other@b.edu"), "uid-1")
            .await
            .unwrap_err();
        assert!(matches!(err, PeerlinkError::Conflict(ConflictKind::IdentityExists)));
    }

    #[tokio::test]
    async fn test_get_missing_profile() {
        let (service, _) = service();
        let err = service.get_profile("ghost").await.unwrap_err();
        assert_eq!(err.code(), "PROFILE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_set_presence_twice() {
        let (service, _) = service();
        service
            .create_profile(&submission("a@b.edu"), "uid-1")
            .await
            .unwrap();

        service.set_presence("uid-1", true).await.unwrap();
        let first = service.get_profile("uid-1").await.unwrap();
        service.set_presence("uid-1", true).await.unwrap();
        let second = service.get_profile("uid-1").await.unwrap();

        assert!(first.is_online && second.is_online);
        assert!(second.last_active >= first.last_active);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(first.personal, second.personal);
    }

    #[tokio::test]
    async fn test_touch_marks_online() {
        let (service, _) = service();
        service
            .create_profile(&submission("a@b.edu"), "uid-1")
            .await
            .unwrap();
        let profile = service.touch("uid-1").await.unwrap();
        assert!(profile.is_online);

        let err = service.touch("ghost").await.unwrap_err();
        assert!(matches!(err, PeerlinkError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_require_complete_profile() {
        let (service, store) = service();
        let mut partial = profile("half", "CSE", &["rust"]);
        partial.profile_complete = false;
        store.create(partial).await.unwrap();
        store.create(profile("full", "CSE", &["rust"])).await.unwrap();

        let err = service.require_complete_profile("half").await.unwrap_err();
        assert!(matches!(err, PeerlinkError::ProfileIncomplete));
        assert_ok!(service.require_complete_profile("full").await);
        assert!(service.require_complete_profile("ghost").await.is_err());
    }
}

//! Profile storage
//!
//! `ProfileStore` is the seam between the services and the document store.
//! Uniqueness of email and identity is the store's job and must be enforced
//! atomically with the insert; callers never pre-check.
//!
//! Candidate queries come back in presence order: online first, then most
//! recently active.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use std::cmp::Ordering;

use crate::profile::Profile;
use crate::types::Result;

pub use memory::MemoryProfileStore;
pub use mongo::MongoProfileStore;

/// Filters shared by the candidate queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateQuery<'a> {
    /// Identity to leave out of the results
    pub exclude_identity: Option<&'a str>,
    /// Maximum number of results; `None` means unbounded
    pub limit: Option<usize>,
}

impl<'a> CandidateQuery<'a> {
    pub fn excluding(identity: &'a str) -> Self {
        Self {
            exclude_identity: Some(identity),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `profile` passes the exclusion filter
    pub fn admits(&self, profile: &Profile) -> bool {
        self.exclude_identity != Some(profile.identity.as_str())
    }
}

/// Persistence for student profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert a validated profile and return it with its persistent id.
    ///
    /// Fails with `Conflict(EmailExists)` or `Conflict(IdentityExists)`;
    /// the email constraint is reported first when both are violated.
    async fn create(&self, profile: Profile) -> Result<Profile>;

    /// Profile linked to an external identity
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Profile>>;

    /// Set the online flag and refresh `last_active`.
    ///
    /// Fails with `NotFound` when no profile exists for `identity`.
    async fn update_presence(&self, identity: &str, is_online: bool) -> Result<()>;

    /// Profiles in `stream`
    async fn find_by_stream(&self, stream: &str, query: CandidateQuery<'_>) -> Result<Vec<Profile>>;

    /// Profiles sharing at least one of `skills`
    async fn find_by_skills(
        &self,
        skills: &[String],
        query: CandidateQuery<'_>,
    ) -> Result<Vec<Profile>>;

    /// Check the store is reachable
    async fn ping(&self) -> Result<()>;
}

/// Presence ordering: online first, then most recently active
pub fn presence_order(a: &Profile, b: &Profile) -> Ordering {
    b.is_online
        .cmp(&a.is_online)
        .then_with(|| b.last_active.cmp(&a.last_active))
}

/// Sort profiles into presence order (stable)
pub fn sort_by_presence(profiles: &mut [Profile]) {
    profiles.sort_by(presence_order);
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_presence_order() {
        let mut profiles = vec![
            with_presence(profile("a", "CSE", &["rust"]), true, 5),
            with_presence(profile("b", "CSE", &["rust"]), false, 10),
            with_presence(profile("c", "CSE", &["rust"]), true, 2),
        ];
        sort_by_presence(&mut profiles);

        let order: Vec<_> = profiles.iter().map(|p| p.identity.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_candidate_query_admits() {
        let me = profile("me", "CSE", &["rust"]);
        let other = profile("other", "CSE", &["rust"]);

        let query = CandidateQuery::excluding("me");
        assert!(!query.admits(&me));
        assert!(query.admits(&other));
        assert!(CandidateQuery::default().admits(&me));
    }
}

//! In-memory profile store
//!
//! Used in dev mode when MongoDB is unavailable, and by tests. Both unique
//! constraints are checked and the insert applied under a single write lock.

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{sort_by_presence, CandidateQuery, ProfileStore};
use crate::profile::Profile;
use crate::types::{ConflictKind, PeerlinkError, Result};

#[derive(Default)]
struct Tables {
    /// identity -> profile
    profiles: HashMap<String, Profile>,
    /// email -> identity
    emails: HashMap<String, String>,
}

/// Profile store held in process memory
#[derive(Default)]
pub struct MemoryProfileStore {
    tables: RwLock<Tables>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles
    pub async fn len(&self) -> usize {
        self.tables.read().await.profiles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn candidates<F>(&self, query: CandidateQuery<'_>, predicate: F) -> Vec<Profile>
    where
        F: Fn(&Profile) -> bool,
    {
        let tables = self.tables.read().await;
        let mut matches: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| query.admits(p) && predicate(p))
            .cloned()
            .collect();
        drop(tables);

        sort_by_presence(&mut matches);
        if let Some(limit) = query.limit {
            matches.truncate(limit);
        }
        matches
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn create(&self, mut profile: Profile) -> Result<Profile> {
        let mut tables = self.tables.write().await;

        if tables.emails.contains_key(&profile.personal.college_email) {
            return Err(PeerlinkError::Conflict(ConflictKind::EmailExists));
        }
        if tables.profiles.contains_key(&profile.identity) {
            return Err(PeerlinkError::Conflict(ConflictKind::IdentityExists));
        }

        profile.id = Some(ObjectId::new().to_hex());
        tables
            .emails
            .insert(profile.personal.college_email.clone(), profile.identity.clone());
        tables
            .profiles
            .insert(profile.identity.clone(), profile.clone());

        debug!("Stored profile for {} in memory", profile.identity);
        Ok(profile)
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(identity).cloned())
    }

    async fn update_presence(&self, identity: &str, is_online: bool) -> Result<()> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .get_mut(identity)
            .ok_or_else(|| PeerlinkError::NotFound("Student profile".to_string()))?;

        profile.is_online = is_online;
        profile.last_active = Utc::now();
        Ok(())
    }

    async fn find_by_stream(&self, stream: &str, query: CandidateQuery<'_>) -> Result<Vec<Profile>> {
        Ok(self.candidates(query, |p| p.stream() == stream).await)
    }

    async fn find_by_skills(
        &self,
        skills: &[String],
        query: CandidateQuery<'_>,
    ) -> Result<Vec<Profile>> {
        Ok(self.candidates(query, |p| p.has_any_skill(skills)).await)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

//! MongoDB-backed profile store
//!
//! Uniqueness rides on the `collegeEmail_unique` and `firebaseUID_unique`
//! indexes; a duplicate-key error on insert becomes the matching conflict.

use async_trait::async_trait;
use bson::{doc, DateTime, Document};
use tracing::debug;

use super::{CandidateQuery, ProfileStore};
use crate::db::schemas::ProfileDoc;
use crate::db::{MongoClient, MongoCollection};
use crate::profile::Profile;
use crate::types::{PeerlinkError, Result};

/// Profile store over a `students` collection
#[derive(Clone)]
pub struct MongoProfileStore {
    client: MongoClient,
    collection: MongoCollection<ProfileDoc>,
}

impl MongoProfileStore {
    /// Open the collection, creating its indexes if missing
    pub async fn new(client: &MongoClient, collection_name: &str) -> Result<Self> {
        let collection = client.collection::<ProfileDoc>(collection_name).await?;
        Ok(Self {
            client: client.clone(),
            collection,
        })
    }

    async fn find_candidates(&self, mut filter: Document, query: CandidateQuery<'_>) -> Result<Vec<Profile>> {
        if let Some(identity) = query.exclude_identity {
            filter.insert("firebaseUID", doc! { "$ne": identity });
        }
        let limit = query.limit.map(|l| l as i64);

        let docs = self
            .collection
            .find_sorted(filter, presence_sort(), limit)
            .await?;
        Ok(docs.into_iter().map(Profile::from).collect())
    }
}

/// Online first, then most recently active
fn presence_sort() -> Document {
    doc! { "isOnline": -1, "lastActive": -1 }
}

#[async_trait]
impl ProfileStore for MongoProfileStore {
    async fn create(&self, mut profile: Profile) -> Result<Profile> {
        let id = self.collection.insert_one(ProfileDoc::from(&profile)).await?;
        profile.id = Some(id.to_hex());
        debug!("Inserted profile {} for {}", id, profile.identity);
        Ok(profile)
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<Profile>> {
        let found = self
            .collection
            .find_one(doc! { "firebaseUID": identity })
            .await?;
        Ok(found.map(Profile::from))
    }

    async fn update_presence(&self, identity: &str, is_online: bool) -> Result<()> {
        let result = self
            .collection
            .update_one(
                doc! { "firebaseUID": identity },
                doc! { "$set": { "isOnline": is_online, "lastActive": DateTime::now() } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(PeerlinkError::NotFound("Student profile".to_string()));
        }
        Ok(())
    }

    async fn find_by_stream(&self, stream: &str, query: CandidateQuery<'_>) -> Result<Vec<Profile>> {
        self.find_candidates(doc! { "academicDetails.stream": stream }, query)
            .await
    }

    async fn find_by_skills(
        &self,
        skills: &[String],
        query: CandidateQuery<'_>,
    ) -> Result<Vec<Profile>> {
        self.find_candidates(doc! { "skillsInterests.mainSkills": { "$in": skills.to_vec() } }, query)
            .await
    }

    async fn ping(&self) -> Result<()> {
        self.client.ping().await
    }
}

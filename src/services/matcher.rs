//! Peer matching
//!
//! Turns store candidate queries into bounded, self-excluded result pages.
//! Stream matches come back in presence order. Skill matches are ranked by
//! the number of shared skills, ties keeping presence order.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::config::SkillRanking;
use crate::profile::Profile;
use crate::store::{sort_by_presence, CandidateQuery, ProfileStore};
use crate::types::{PeerlinkError, Result};

/// Page size when the caller gives none
pub const DEFAULT_PEER_LIMIT: usize = 10;

/// Upper bound on any page size
pub const MAX_PEER_LIMIT: usize = 100;

/// A skill match with its score
#[derive(Debug, Clone, PartialEq)]
pub struct RankedProfile {
    pub profile: Profile,
    /// Number of the candidate's skills found in the query
    pub match_score: usize,
    /// The shared skills, in the candidate's own order
    pub matching_skills: Vec<String>,
}

impl RankedProfile {
    /// Score `profile` against the query skill set
    pub fn score(profile: Profile, query: &HashSet<&str>) -> Self {
        let matching_skills: Vec<String> = profile
            .skills()
            .iter()
            .filter(|s| query.contains(s.as_str()))
            .cloned()
            .collect();
        Self {
            match_score: matching_skills.len(),
            matching_skills,
            profile,
        }
    }
}

/// Stream and skill based peer discovery
#[derive(Clone)]
pub struct PeerMatcher {
    store: Arc<dyn ProfileStore>,
    ranking: SkillRanking,
    default_limit: usize,
    max_limit: usize,
}

impl PeerMatcher {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            ranking: SkillRanking::default(),
            default_limit: DEFAULT_PEER_LIMIT,
            max_limit: MAX_PEER_LIMIT,
        }
    }

    pub fn with_ranking(mut self, ranking: SkillRanking) -> Self {
        self.ranking = ranking;
        self
    }

    /// Set the default and maximum page sizes
    pub fn with_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    /// Effective page size: absent or zero means the default, large values
    /// are clamped to the maximum
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            None | Some(0) => self.default_limit,
            Some(n) => n.min(self.max_limit),
        }
    }

    /// Peers in `stream`, online first, then most recently active
    pub async fn match_by_stream(
        &self,
        requester: &str,
        stream: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Profile>> {
        let limit = self.resolve_limit(limit);
        let query = CandidateQuery::excluding(requester).with_limit(Some(limit));

        let mut peers = self.store.find_by_stream(stream, query).await?;
        peers.retain(|p| p.identity != requester);
        sort_by_presence(&mut peers);
        peers.truncate(limit);

        debug!("{} stream peers in '{}' for {}", peers.len(), stream, requester);
        Ok(peers)
    }

    /// Peers sharing at least one of `skills`, best matches first.
    ///
    /// Fails validation when no non-blank skill is given, without touching
    /// the store.
    pub async fn match_by_skills(
        &self,
        requester: &str,
        skills: &[String],
        limit: Option<usize>,
    ) -> Result<Vec<RankedProfile>> {
        let wanted: Vec<String> = skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if wanted.is_empty() {
            return Err(PeerlinkError::validation("skills", "Skills array is required"));
        }

        let limit = self.resolve_limit(limit);
        let fetch_limit = match self.ranking {
            SkillRanking::FetchWindow => Some(limit),
            SkillRanking::GlobalTopK => None,
        };
        let query = CandidateQuery::excluding(requester).with_limit(fetch_limit);

        let mut candidates = self.store.find_by_skills(&wanted, query).await?;
        candidates.retain(|p| p.identity != requester);
        sort_by_presence(&mut candidates);

        let query_set: HashSet<&str> = wanted.iter().map(String::as_str).collect();
        let mut ranked: Vec<RankedProfile> = candidates
            .into_iter()
            .map(|p| RankedProfile::score(p, &query_set))
            .collect();
        ranked.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        ranked.truncate(limit);

        debug!(
            "{} skill peers for {} ({:?})",
            ranked.len(),
            requester,
            self.ranking
        );
        Ok(ranked)
    }
}

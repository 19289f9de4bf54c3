//! Service layer for Peerlink
//!
//! Services are constructed once at start-up around a shared `ProfileStore`
//! and handed to the request handlers through `AppState`.

pub mod matcher;
pub mod profiles;

pub use matcher::{PeerMatcher, RankedProfile, DEFAULT_PEER_LIMIT, MAX_PEER_LIMIT};
pub use profiles::ProfileService;

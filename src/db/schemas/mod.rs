//! Database schemas for Peerlink
//!
//! Defines MongoDB document structures and their indexes.

mod profile;

pub use profile::ProfileDoc;

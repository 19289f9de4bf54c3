//! Shared types

pub mod error;

pub use error::{ConflictKind, PeerlinkError, Result};

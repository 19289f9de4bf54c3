//! Peerlink - student collaboration backend
//!
//! Stores student profiles and matches students with peers by academic
//! stream or shared skills.
//!
//! ## Components
//!
//! - **Profile validation**: raw submissions (nested or flat) normalised into
//!   canonical profiles, rejected on the first invalid field
//! - **Profile store**: MongoDB or in-memory, uniqueness of email and
//!   identity enforced by the store
//! - **Peer matcher**: stream and skill matching, presence ordering, skill
//!   overlap scoring
//! - **Auth gate**: JWT identity token verification
//! - **HTTP surface**: hyper server exposing the students API

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod profile;
pub mod routes;
pub mod server;
pub mod services;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{PeerlinkError, Result};

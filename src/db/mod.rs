//! MongoDB access

pub mod mongo;
pub mod schemas;

pub use mongo::{IntoIndexes, MongoClient, MongoCollection};

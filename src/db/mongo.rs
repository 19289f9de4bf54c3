//! MongoDB client and collection wrapper
//!
//! Collections apply their schema's indexes when opened. Inserts translate
//! duplicate-key write errors into conflicts keyed by the violated index.

use bson::{doc, oid::ObjectId, Document};
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions, UpdateModifications},
    results::UpdateResult,
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::types::{ConflictKind, PeerlinkError};

/// MongoDB server error code for unique index violations
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Create a new MongoDB client
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, PeerlinkError> {
        info!("Connecting to MongoDB at {}", uri);

        // Fail fast on unreachable servers instead of hanging at start-up
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=5000&connectTimeoutMS=5000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=5000&connectTimeoutMS=5000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| PeerlinkError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        let mongo = Self {
            client,
            db_name: db_name.to_string(),
        };
        mongo.ping().await?;

        info!("Connected to MongoDB database '{}'", db_name);
        Ok(mongo)
    }

    /// Round-trip a ping command
    pub async fn ping(&self) -> Result<(), PeerlinkError> {
        self.client
            .database(&self.db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| PeerlinkError::Database(format!("MongoDB ping failed: {}", e)))?;
        Ok(())
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, PeerlinkError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes,
{
    /// Open a collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, PeerlinkError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), PeerlinkError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| PeerlinkError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document.
    ///
    /// A unique index violation comes back as `PeerlinkError::Conflict`.
    pub async fn insert_one(&self, item: T) -> Result<ObjectId, PeerlinkError> {
        let result = self.inner.insert_one(item).await.map_err(insert_error)?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| PeerlinkError::Database("Failed to get inserted ID".into()))
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, PeerlinkError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| PeerlinkError::Database(format!("Find failed: {}", e)))
    }

    /// Find documents by filter with sort and optional limit
    pub async fn find_sorted(
        &self,
        filter: Document,
        sort: Document,
        limit: Option<i64>,
    ) -> Result<Vec<T>, PeerlinkError> {
        use futures_util::StreamExt;

        let options = FindOptions::builder().sort(sort).limit(limit).build();

        let cursor = self
            .inner
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| PeerlinkError::Database(format!("Find failed: {}", e)))?;

        let results: Vec<T> = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(results)
    }

    /// Update one document
    pub async fn update_one(
        &self,
        filter: Document,
        update: impl Into<UpdateModifications>,
    ) -> Result<UpdateResult, PeerlinkError> {
        self.inner
            .update_one(filter, update.into())
            .await
            .map_err(|e| PeerlinkError::Database(format!("Update failed: {}", e)))
    }
}

/// Map an insert failure: duplicate keys become conflicts, anything else
/// is a database error
fn insert_error(err: mongodb::error::Error) -> PeerlinkError {
    match duplicate_key_index(&err) {
        Some(index) => PeerlinkError::Conflict(ConflictKind::from_index_name(&index)),
        None => PeerlinkError::Database(format!("Insert failed: {}", err)),
    }
}

/// Name of the unique index a write ran into, if the error is a
/// duplicate-key error. Unknown index names come back empty.
pub fn duplicate_key_index(err: &mongodb::error::Error) -> Option<String> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            Some(index_name_from_message(&write_error.message).unwrap_or_default())
        }
        _ => None,
    }
}

/// Pull the index name out of an E11000 message:
/// `E11000 duplicate key error collection: db.students index: <name> dup key: {...}`
fn index_name_from_message(message: &str) -> Option<String> {
    let rest = message.split("index: ").nth(1)?;
    rest.split_whitespace().next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    use mongodb::error::{Error, WriteError};

    fn write_error(code: i32, message: &str) -> Error {
        let write_error: WriteError =
            bson::from_document(doc! { "code": code, "errmsg": message }).unwrap();
        Error::from(ErrorKind::Write(WriteFailure::WriteError(write_error)))
    }

    #[test]
    fn test_index_name_from_message() {
        let msg = "E11000 duplicate key error collection: peerlink.students index: personalInfo.collegeEmail_1 dup key: { personalInfo.collegeEmail: \"a@b.edu\" }";
        assert_eq!(
            index_name_from_message(msg).as_deref(),
            Some("personalInfo.collegeEmail_1")
        );
        assert_eq!(index_name_from_message("E11000 duplicate key error"), None);
    }

    #[test]
    fn test_duplicate_keys_become_conflicts() {
        let email = write_error(
            DUPLICATE_KEY_CODE,
            "E11000 duplicate key error collection: peerlink.students index: personalInfo.collegeEmail_1 dup key: { personalInfo.collegeEmail: \"a@b.edu\" }",
        );
        assert_eq!(insert_error(email).code(), "EMAIL_EXISTS");

        let identity = write_error(
            DUPLICATE_KEY_CODE,
            "E11000 duplicate key error collection: peerlink.students index: firebaseUID_1 dup key: { firebaseUID: \"uid-1\" }",
        );
        assert_eq!(insert_error(identity).code(), "UID_EXISTS");

        // No index in the message still counts as a duplicate
        let unnamed = write_error(DUPLICATE_KEY_CODE, "E11000 duplicate key error");
        assert_eq!(duplicate_key_index(&unnamed).as_deref(), Some(""));
        assert_eq!(insert_error(unnamed).code(), "DUPLICATE_DATA");
    }

    #[test]
    fn test_other_write_errors_are_database_errors() {
        let err = write_error(121, "Document failed validation");
        assert!(duplicate_key_index(&err).is_none());
        assert_eq!(insert_error(err).code(), "DB_ERROR");
    }

    // Collection behaviour needs a running MongoDB instance and is not
    // exercised here
}

//! Persistence gateway for student documents.
//!
//! Every call is a single round trip; errors are handed back unchanged and nothing is retried.

mod memory;
mod mongo;

pub use memory::MemoryStudentStore;
pub use mongo::MongoStudentStore;

use crate::students::{NewStudent, StoredStudent};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

/// Errors returned by a [`StudentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be reached or rejected the operation.
    #[error("Student store unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The database reported an inserted id that is not an `ObjectId`.
    #[error("Unexpected inserted id: {0}")]
    UnexpectedId(String),
    /// No document carries the requested id.
    #[error("No student with id {0}")]
    NotFound(ObjectId),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(error: mongodb::error::Error) -> Self {
        Self::Unavailable(Box::new(error))
    }
}

/// Storage operations required by the HTTP handlers.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Insert a validated student and return the id the database assigned to it.
    async fn insert(&self, student: &NewStudent) -> Result<ObjectId, StoreError>;

    /// Fetch a single student by id.
    async fn find_by_id(&self, id: ObjectId) -> Result<StoredStudent, StoreError>;
}

use crate::store::{StoreError, StudentStore};
use crate::students::{NewStudent, StoredStudent};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process [`StudentStore`] that assigns fresh `ObjectId`s, for tests and local runs.
#[derive(Default)]
pub struct MemoryStudentStore {
    documents: RwLock<HashMap<ObjectId, NewStudent>>,
}

impl MemoryStudentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored students.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// True when nothing has been inserted.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn insert(&self, student: &NewStudent) -> Result<ObjectId, StoreError> {
        let id = ObjectId::new();
        self.documents.write().await.insert(id, student.clone());
        Ok(id)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<StoredStudent, StoreError> {
        self.documents
            .read()
            .await
            .get(&id)
            .cloned()
            .map(|student| StoredStudent::new(id, student))
            .ok_or(StoreError::NotFound(id))
    }
}

use crate::store::{StoreError, StudentStore};
use crate::students::{NewStudent, StoredStudent};
use async_trait::async_trait;
use mongodb::{
    Client, Collection, Database,
    bson::{doc, oid::ObjectId},
};

/// [`StudentStore`] backed by a MongoDB collection.
///
/// The wrapped driver handles are cheap to clone and pool connections internally, so one
/// instance is built at startup and shared by every request.
#[derive(Clone)]
pub struct MongoStudentStore {
    database: Database,
    students: Collection<NewStudent>,
    stored: Collection<StoredStudent>,
}

impl MongoStudentStore {
    /// Create a driver client for `url` and bind it to `database.collection`.
    ///
    /// The driver connects lazily; use [`MongoStudentStore::ping`] to verify reachability.
    pub async fn connect(url: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(url).await?;
        tracing::debug!(database, collection, "Initialized MongoDB client");
        Ok(Self::from_client(&client, database, collection))
    }

    /// Bind an existing client to `database.collection`.
    pub fn from_client(client: &Client, database: &str, collection: &str) -> Self {
        let database = client.database(database);
        let students = database.collection::<NewStudent>(collection);
        let stored = students.clone_with_type::<StoredStudent>();
        Self {
            database,
            students,
            stored,
        }
    }

    /// Run the `ping` admin command against the bound database.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[async_trait]
impl StudentStore for MongoStudentStore {
    async fn insert(&self, student: &NewStudent) -> Result<ObjectId, StoreError> {
        let result = self.students.insert_one(student).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::UnexpectedId(result.inserted_id.to_string()))
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<StoredStudent, StoreError> {
        self.stored
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(StoreError::NotFound(id))
    }
}

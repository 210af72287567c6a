use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use serde_json::Value;

use super::error::DocStoreError;
use super::id::{Collection, DocumentId};
use super::traits::DocumentStore;

/// MongoDB-backed document store.
///
/// Documents are stored as-is with a server-generated `_id`; the hex form
/// of that ObjectId is the [`DocumentId`] handed back to callers.
pub struct MongoDocStore {
    database: Database,
}

impl MongoDocStore {
    /// Connect to MongoDB and verify the deployment responds to a ping.
    pub async fn connect(uri: &str, database_name: &str) -> Result<Self, DocStoreError> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(DocStoreError::Mongo)?;
        let client = Client::with_options(options).map_err(DocStoreError::Mongo)?;
        let database = client.database(database_name);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(DocStoreError::Mongo)?;

        Ok(Self { database })
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.database.collection::<Document>(collection.as_str())
    }

    fn object_id(id: &DocumentId) -> Result<ObjectId, DocStoreError> {
        ObjectId::parse_str(id.as_str())
            .map_err(|_| DocStoreError::InvalidId(id.as_str().to_string()))
    }
}

/// Strip the storage-internal `_id` and convert back to plain JSON.
fn into_payload(mut document: Document) -> Result<Value, DocStoreError> {
    document.remove("_id");
    Ok(serde_json::to_value(&document)?)
}

#[async_trait]
impl DocumentStore for MongoDocStore {
    async fn put(
        &self,
        collection: Collection,
        document: &Value,
    ) -> Result<DocumentId, DocStoreError> {
        let mut document = mongodb::bson::to_document(document)
            .map_err(|e| DocStoreError::Mongo(e.into()))?;
        // Identity is always server-assigned.
        document.remove("_id");

        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(DocStoreError::Mongo)?;

        match result.inserted_id {
            Bson::ObjectId(oid) => Ok(DocumentId::from_generated(oid.to_hex())),
            other => Err(DocStoreError::InvalidId(format!(
                "server returned a non-ObjectId identifier: {other}"
            ))),
        }
    }

    async fn get(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Value>, DocStoreError> {
        let oid = Self::object_id(id)?;
        let found = self
            .collection(collection)
            .find_one(doc! { "_id": oid })
            .await
            .map_err(DocStoreError::Mongo)?;

        found.map(into_payload).transpose()
    }

    async fn delete(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Value>, DocStoreError> {
        let oid = Self::object_id(id)?;
        let removed = self
            .collection(collection)
            .find_one_and_delete(doc! { "_id": oid })
            .await
            .map_err(DocStoreError::Mongo)?;

        removed.map(into_payload).transpose()
    }
}

use async_trait::async_trait;
use serde_json::Value;

use super::error::DocStoreError;
use super::id::{Collection, DocumentId};

/// A store of opaque JSON documents grouped into named collections.
///
/// The store assigns identity at write time and returns it to the caller.
/// No relational constraints are enforced here; callers own referential
/// integrity across stores.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a document and return its generated identifier.
    async fn put(
        &self,
        collection: Collection,
        document: &Value,
    ) -> Result<DocumentId, DocStoreError>;

    /// Fetch a document by id.
    ///
    /// An absent document is `Ok(None)`, not an error.
    async fn get(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Value>, DocStoreError>;

    /// Remove a document by id, returning the removed document.
    ///
    /// Deleting an absent document is `Ok(None)`, not an error.
    async fn delete(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Value>, DocStoreError>;
}

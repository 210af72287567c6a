use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use uuid::Uuid;

use super::error::DocStoreError;
use super::id::{Collection, DocumentId};
use super::traits::DocumentStore;

/// Filesystem-backed document store.
///
/// Each document is a single JSON file at `{base_path}/{collection}/{id}.json`.
/// Writes go through a temp file and a rename so a reader never observes a
/// partially written document.
pub struct FilesystemDocStore {
    base_path: PathBuf,
}

impl FilesystemDocStore {
    /// Create a store rooted at `base_path`, creating the collection
    /// directories if needed.
    pub async fn new(base_path: PathBuf) -> Result<Self, DocStoreError> {
        for collection in [Collection::Games, Collection::Entries] {
            fs::create_dir_all(base_path.join(collection.as_str())).await?;
        }
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self { base_path })
    }

    /// Compute the filesystem path for a document.
    fn document_path(&self, collection: Collection, id: &DocumentId) -> PathBuf {
        self.base_path
            .join(collection.as_str())
            .join(format!("{}.json", id.as_str()))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path.join(".tmp").join(Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl DocumentStore for FilesystemDocStore {
    async fn put(
        &self,
        collection: Collection,
        document: &Value,
    ) -> Result<DocumentId, DocStoreError> {
        let id = DocumentId::from_generated(Uuid::now_v7().simple().to_string());
        let bytes = serde_json::to_vec(document)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        let path = self.document_path(collection, &id);
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(id)
    }

    async fn get(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Value>, DocStoreError> {
        match fs::read(self.document_path(collection, id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<Value>, DocStoreError> {
        let path = self.document_path(collection, id);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let document = serde_json::from_slice(&bytes)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(Some(document)),
            // Lost a race with another delete; the end state is the same.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

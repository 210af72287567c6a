pub mod docstore;

pub use docstore::{Collection, DocStoreError, DocumentId, DocumentStore};

use common::docstore::{DocStoreError, DocumentId};
use sea_orm::DbErr;
use thiserror::Error;

pub type ArenaResult<T> = Result<T, ArenaError>;

/// Application-level error type for the paired persistence layer.
///
/// Ordinary not-found conditions (lookups, idempotent deletes) are not
/// errors; those return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// A game with this name already exists.
    #[error("a game named `{0}` already exists")]
    NameConflict(String),

    /// The username or email is already in use.
    #[error("username or email is already in use")]
    UserConflict,

    /// The game referenced by a new entry does not exist.
    #[error("game `{0}` not found")]
    GameNotFound(String),

    /// The submitter referenced by a new entry does not exist.
    #[error("user `{0}` not found")]
    UserNotFound(String),

    /// Writing the code document failed before any relational write; both
    /// stores are untouched.
    #[error("failed to write code document")]
    DocumentWriteFailed(#[source] DocStoreError),

    /// The relational write failed after the code document was written;
    /// the document has been removed again.
    #[error("relational write failed after code document `{document_id}` was written (document removed)")]
    PairedWriteFailed {
        document_id: DocumentId,
        #[source]
        source: DbErr,
    },

    /// The two stores no longer agree and automatic cleanup failed, or a
    /// post-write consistency check did not hold. Reported on the
    /// `codearena::consistency` log target at raise time and propagated;
    /// requires operator attention.
    #[error("stores are inconsistent: {0}")]
    FatalInconsistency(String),

    #[error(transparent)]
    Db(#[from] DbErr),

    #[error(transparent)]
    Document(#[from] DocStoreError),
}

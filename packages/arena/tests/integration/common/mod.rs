use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use arena::database;
use arena::docstore::filesystem::FilesystemDocStore;
use arena::models::{CodeDocument, NewEntry, NewGame, NewUser};
use arena::{ArenaService, entity};

/// An `ArenaService` wired to throwaway backends: a single-connection
/// in-memory SQLite database and a tempdir-backed filesystem document
/// store.
pub struct TestArena {
    pub arena: ArenaService,
    pub db: DatabaseConnection,
    docs_dir: tempfile::TempDir,
}

impl TestArena {
    pub async fn spawn() -> Self {
        let db = memory_db().await;
        let docs_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let docs = Arc::new(
            FilesystemDocStore::new(docs_dir.path().join("docs"))
                .await
                .expect("Failed to open document store"),
        );
        let arena = ArenaService::new(db.clone(), docs);

        Self {
            arena,
            db,
            docs_dir,
        }
    }

    /// Number of documents currently stored in a collection.
    pub fn document_count(&self, collection: &str) -> usize {
        std::fs::read_dir(self.docs_dir.path().join("docs").join(collection))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Create a user from the standard fixture fields.
    pub async fn create_user(&self, username: &str) -> entity::user::Model {
        self.arena
            .create_user(new_user(username))
            .await
            .expect("create_user failed")
    }

    /// Create a game paired with the given code.
    pub async fn create_game(&self, name: &str, code: &str) -> entity::game::Model {
        self.arena
            .create_game(new_game(name), CodeDocument::new(code))
            .await
            .expect("create_game failed")
    }

    /// Create an entry against an existing game and submitter.
    pub async fn create_entry(
        &self,
        game: &str,
        submitter: &str,
        code: &str,
    ) -> entity::game_entry::Model {
        self.arena
            .create_entry(
                NewEntry {
                    game_name: game.to_string(),
                    submitter: submitter.to_string(),
                },
                CodeDocument::new(code),
            )
            .await
            .expect("create_entry failed")
    }
}

/// Open a single-connection in-memory SQLite database with the schema
/// synced. A single connection keeps every query on the same memory
/// instance.
pub async fn memory_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to open in-memory database");
    database::sync_schema(&db)
        .await
        .expect("Failed to sync schema");
    db
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        displayname: format!("{username} display name"),
        password_hash: "wagdgwudg".into(),
        salt: "asfdazwgzw".into(),
    }
}

pub fn new_game(name: &str) -> NewGame {
    NewGame {
        name: name.to_string(),
        description: "A turn based game with the goal of creating a row of 3 identical symbols."
            .into(),
    }
}

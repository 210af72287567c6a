//! End-to-end self-test against the configured stores.
//!
//! Connects to the relational database and the document store from the
//! regular application configuration, then runs the full user/game/entry
//! round trip, cleaning up after itself. Intended for deployment checks.

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::{Level, info};

use arena::config::{AppConfig, DocStoreBackend};
use arena::docstore::DocumentStore;
use arena::docstore::filesystem::FilesystemDocStore;
use arena::models::{CodeDocument, GameRelation, NewEntry, NewGame, NewUser};
use arena::{ArenaService, database, seed};

const CHECK_USER: &str = "dbcheck-user";
const CHECK_GAME: &str = "dbcheck-game";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("failed to connect to the relational store")?;
    seed::ensure_indexes(&db).await?;

    let docs = open_doc_store(&config).await?;
    let arena = ArenaService::new(db, docs);

    run_round_trip(&arena).await?;

    info!("All store checks passed");
    Ok(())
}

async fn open_doc_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.docstore.backend {
        DocStoreBackend::Filesystem => {
            let store = FilesystemDocStore::new(config.docstore.path.clone())
                .await
                .context("failed to open the filesystem document store")?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "mongo-store")]
        DocStoreBackend::Mongodb => {
            let uri = config
                .docstore
                .mongo_uri
                .as_deref()
                .context("docstore.mongo_uri is required for the mongodb backend")?;
            let database = config
                .docstore
                .mongo_database
                .as_deref()
                .context("docstore.mongo_database is required for the mongodb backend")?;
            let store = arena::docstore::mongodb::MongoDocStore::connect(uri, database)
                .await
                .context("failed to connect to MongoDB")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongo-store"))]
        DocStoreBackend::Mongodb => {
            bail!("docstore.backend is `mongodb` but this build lacks the `mongo-store` feature")
        }
    }
}

async fn run_round_trip(arena: &ArenaService) -> anyhow::Result<()> {
    // Clean up leftovers from an interrupted previous run.
    arena.delete_game(CHECK_GAME).await?;
    arena.delete_user(CHECK_USER).await?;

    let user = arena
        .create_user(NewUser {
            username: CHECK_USER.into(),
            email: "dbcheck@example.invalid".into(),
            displayname: "Store Checker".into(),
            password_hash: "not-a-real-hash".into(),
            salt: "not-a-real-salt".into(),
        })
        .await?;
    info!("Created user {}", user.username);

    let game = arena
        .create_game(
            NewGame {
                name: CHECK_GAME.into(),
                description: "Throwaway game written by the store self-test".into(),
            },
            CodeDocument::new("console.log('dbcheck');"),
        )
        .await?;
    info!(
        "Created game {} with code document {}",
        game.name, game.game_code_id
    );

    let code = arena
        .get_game_code(&game.game_code_id)
        .await?
        .context("game code document missing right after create")?;
    if code.code != "console.log('dbcheck');" {
        bail!("game code round trip returned different content");
    }

    let entry = arena
        .create_entry(
            NewEntry {
                game_name: game.name.clone(),
                submitter: user.username.clone(),
            },
            CodeDocument::new("console.log('entry');"),
        )
        .await?;
    info!("Created entry {}", entry.id);

    let entries = arena
        .get_game(&game.name, &[GameRelation::Entries])
        .await?
        .context("game missing after entry create")?
        .entries
        .unwrap_or_default();
    if !entries.iter().any(|e| e.id == entry.id) {
        bail!("entry {} is not visible from the game relation", entry.id);
    }

    if arena.delete_game(&game.name).await?.is_none() {
        bail!("game disappeared before delete");
    }
    if arena.get_game(&game.name, &[]).await?.is_some() {
        bail!("game still present after delete");
    }
    if arena.get_game_code(&game.game_code_id).await?.is_some() {
        bail!("game code document still present after delete");
    }
    if arena.get_entry(entry.id, &[]).await?.is_some() {
        bail!("entry survived the game delete");
    }

    arena.delete_user(&user.username).await?;
    Ok(())
}

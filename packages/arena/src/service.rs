use std::sync::Arc;

use chrono::Utc;
use common::docstore::{Collection, DocStoreError, DocumentId, DocumentStore};
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{game, game_entry, user};
use crate::error::{ArenaError, ArenaResult};
use crate::models::{
    CodeDocument, EntryRelation, EntryView, GameRelation, GameView, NewEntry, NewGame, NewUser,
    UserRelation, UserView,
};

/// Log target for store inconsistencies that need operator attention,
/// kept separate from ordinary request errors so it can be routed to an
/// alerting sink.
const CONSISTENCY_TARGET: &str = "codearena::consistency";

/// Coordinates paired writes across the relational store and the document
/// store, so that a Game or GameEntry row and its companion code document
/// behave as one unit despite the two stores committing independently.
///
/// Every operation is a sequential chain of awaited store calls; the two
/// stores are never written in parallel, so a failure always has a known
/// set of completed steps to compensate. The compensating cleanup for a
/// half-finished create runs at most once per failure, and there are no
/// retries.
pub struct ArenaService {
    db: DatabaseConnection,
    docs: Arc<dyn DocumentStore>,
}

impl ArenaService {
    /// Build a service over explicit store handles.
    pub fn new(db: DatabaseConnection, docs: Arc<dyn DocumentStore>) -> Self {
        Self { db, docs }
    }

    // ---- users ----------------------------------------------------------

    /// Create a user. A username or email collision maps to `UserConflict`
    /// via the store-level unique constraints, so concurrent duplicate
    /// registrations cannot both succeed.
    #[instrument(skip(self, new_user), fields(username = %new_user.username))]
    pub async fn create_user(&self, new_user: NewUser) -> ArenaResult<user::Model> {
        let model = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            displayname: Set(new_user.displayname),
            password_hash: Set(new_user.password_hash),
            salt: Set(new_user.salt),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ArenaError::UserConflict,
            _ => ArenaError::from(e),
        })
    }

    /// Fetch a user with the requested relations, or `None`.
    pub async fn get_user(
        &self,
        username: &str,
        relations: &[UserRelation],
    ) -> ArenaResult<Option<UserView>> {
        let Some(found) = user::Entity::find_by_id(username).one(&self.db).await? else {
            return Ok(None);
        };

        let game_entries = if relations.contains(&UserRelation::GameEntries) {
            Some(
                game_entry::Entity::find()
                    .filter(game_entry::Column::SubmitterUsername.eq(username))
                    .order_by_asc(game_entry::Column::Id)
                    .all(&self.db)
                    .await?,
            )
        } else {
            None
        };

        Ok(Some(UserView {
            user: found,
            game_entries,
        }))
    }

    /// Delete a user, returning the removed record.
    ///
    /// The user's entries survive with a nulled-out submitter. Deleting an
    /// absent user is a no-op returning `None`.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, username: &str) -> ArenaResult<Option<user::Model>> {
        let Some(found) = user::Entity::find_by_id(username).one(&self.db).await? else {
            return Ok(None);
        };

        // Detach entries before the row goes away.
        game_entry::Entity::update_many()
            .col_expr(
                game_entry::Column::SubmitterUsername,
                sea_orm::sea_query::Expr::value(Option::<String>::None),
            )
            .filter(game_entry::Column::SubmitterUsername.eq(username))
            .exec(&self.db)
            .await?;

        user::Entity::delete_by_id(username).exec(&self.db).await?;

        info!("Deleted user {username}");
        Ok(Some(found))
    }

    // ---- games ----------------------------------------------------------

    /// Create a game paired with its code document.
    ///
    /// The document is written first; if the relational insert then fails,
    /// the document is deleted again so no orphan survives the call.
    #[instrument(skip(self, new_game, code), fields(name = %new_game.name))]
    pub async fn create_game(
        &self,
        new_game: NewGame,
        code: CodeDocument,
    ) -> ArenaResult<game::Model> {
        if game::Entity::find_by_id(new_game.name.as_str())
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(ArenaError::NameConflict(new_game.name));
        }

        let document_id = self.put_code(Collection::Games, &code).await?;

        let model = game::ActiveModel {
            name: Set(new_game.name.clone()),
            description: Set(new_game.description.clone()),
            game_code_id: Set(document_id.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let inserted = match model.insert(&self.db).await {
            Ok(inserted) => inserted,
            Err(e) => {
                // A unique violation here means another create won the race
                // between our existence check and the insert; after the
                // document is compensated that is an ordinary name conflict.
                let lost_race = matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)));
                let err = self.compensate(Collection::Games, document_id, e).await;
                return Err(match (lost_race, err) {
                    (true, ArenaError::PairedWriteFailed { .. }) => {
                        ArenaError::NameConflict(new_game.name)
                    }
                    (_, err) => err,
                });
            }
        };

        // Read back what was stored; the pair is only reported as created
        // once the relational side provably holds the submitted record.
        let stored = game::Entity::find_by_id(inserted.name.as_str())
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                self.fatal(format!(
                    "game `{}` missing immediately after insert",
                    inserted.name
                ))
            })?;

        if stored.name != new_game.name
            || stored.description != new_game.description
            || stored.game_code_id != document_id.as_str()
        {
            return Err(self.fatal(format!(
                "stored game `{}` does not match the submitted record",
                new_game.name
            )));
        }

        info!(
            "Created game {} with code document {document_id}",
            stored.name
        );
        Ok(stored)
    }

    /// Fetch a game with the requested relations, or `None`.
    pub async fn get_game(
        &self,
        name: &str,
        relations: &[GameRelation],
    ) -> ArenaResult<Option<GameView>> {
        let Some(found) = game::Entity::find_by_id(name).one(&self.db).await? else {
            return Ok(None);
        };

        let entries = if relations.contains(&GameRelation::Entries) {
            Some(
                game_entry::Entity::find()
                    .filter(game_entry::Column::GameName.eq(name))
                    .order_by_asc(game_entry::Column::Id)
                    .all(&self.db)
                    .await?,
            )
        } else {
            None
        };

        Ok(Some(GameView {
            game: found,
            entries,
        }))
    }

    /// Fetch the code document paired with a game, or `None`.
    pub async fn get_game_code(&self, id: &str) -> ArenaResult<Option<CodeDocument>> {
        self.read_code(Collection::Games, id).await
    }

    /// Delete a game, its entries, and their paired code documents.
    ///
    /// Returns the removed game, or `None` for an absent one (idempotent
    /// no-op). Relational rows are removed before documents, so a reader
    /// never follows a live row to a missing document; the reverse window
    /// (row gone, document still present) closes immediately after.
    #[instrument(skip(self))]
    pub async fn delete_game(&self, name: &str) -> ArenaResult<Option<game::Model>> {
        let Some(found) = game::Entity::find_by_id(name).one(&self.db).await? else {
            return Ok(None);
        };

        let entries = game_entry::Entity::find()
            .filter(game_entry::Column::GameName.eq(name))
            .all(&self.db)
            .await?;

        game_entry::Entity::delete_many()
            .filter(game_entry::Column::GameName.eq(name))
            .exec(&self.db)
            .await?;
        game::Entity::delete_by_id(name).exec(&self.db).await?;

        self.remove_code(Collection::Games, &found.game_code_id, "game", name)
            .await?;
        for entry in &entries {
            self.remove_code(
                Collection::Entries,
                &entry.submitted_code_id,
                "entry",
                &entry.id.to_string(),
            )
            .await?;
        }

        info!("Deleted game {name} and {} entries", entries.len());
        Ok(Some(found))
    }

    // ---- entries --------------------------------------------------------

    /// Create a game entry paired with its code document.
    ///
    /// Both referenced records must exist before anything is written to
    /// either store.
    #[instrument(
        skip(self, new_entry, code),
        fields(game = %new_entry.game_name, submitter = %new_entry.submitter)
    )]
    pub async fn create_entry(
        &self,
        new_entry: NewEntry,
        code: CodeDocument,
    ) -> ArenaResult<game_entry::Model> {
        if game::Entity::find_by_id(new_entry.game_name.as_str())
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(ArenaError::GameNotFound(new_entry.game_name));
        }
        if user::Entity::find_by_id(new_entry.submitter.as_str())
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(ArenaError::UserNotFound(new_entry.submitter));
        }

        let document_id = self.put_code(Collection::Entries, &code).await?;

        let model = game_entry::ActiveModel {
            submitted_code_id: Set(document_id.as_str().to_string()),
            submitter_username: Set(Some(new_entry.submitter.clone())),
            game_name: Set(new_entry.game_name.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let inserted = match model.insert(&self.db).await {
            Ok(inserted) => inserted,
            Err(e) => {
                return Err(self.compensate(Collection::Entries, document_id, e).await);
            }
        };

        self.assert_entry_linked(&inserted, &new_entry).await?;

        info!(
            "Created entry {} for game {}",
            inserted.id, new_entry.game_name
        );
        Ok(inserted)
    }

    /// Fetch an entry with the requested relations, or `None`.
    pub async fn get_entry(
        &self,
        id: i32,
        relations: &[EntryRelation],
    ) -> ArenaResult<Option<EntryView>> {
        let Some(found) = game_entry::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let game = if relations.contains(&EntryRelation::Game) {
            game::Entity::find_by_id(found.game_name.as_str())
                .one(&self.db)
                .await?
        } else {
            None
        };

        let submitter = match (
            &found.submitter_username,
            relations.contains(&EntryRelation::Submitter),
        ) {
            (Some(username), true) => {
                user::Entity::find_by_id(username.as_str())
                    .one(&self.db)
                    .await?
            }
            _ => None,
        };

        Ok(Some(EntryView {
            entry: found,
            game,
            submitter,
        }))
    }

    /// Fetch the code document paired with an entry, or `None`.
    pub async fn get_entry_code(&self, id: &str) -> ArenaResult<Option<CodeDocument>> {
        self.read_code(Collection::Entries, id).await
    }

    /// Delete an entry and its paired code document. Deleting an absent
    /// entry is a no-op returning `None`.
    #[instrument(skip(self))]
    pub async fn delete_entry(&self, id: i32) -> ArenaResult<Option<game_entry::Model>> {
        let Some(found) = game_entry::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        game_entry::Entity::delete_by_id(id).exec(&self.db).await?;
        self.remove_code(
            Collection::Entries,
            &found.submitted_code_id,
            "entry",
            &id.to_string(),
        )
        .await?;

        info!("Deleted entry {id}");
        Ok(Some(found))
    }

    // ---- paired-write plumbing ------------------------------------------

    /// Serialize and store a code document, the first half of a paired
    /// write. Failure here leaves both stores untouched.
    async fn put_code(
        &self,
        collection: Collection,
        code: &CodeDocument,
    ) -> ArenaResult<DocumentId> {
        let value = serde_json::to_value(code)
            .map_err(|e| ArenaError::DocumentWriteFailed(DocStoreError::Serialization(e)))?;

        self.docs
            .put(collection, &value)
            .await
            .map_err(ArenaError::DocumentWriteFailed)
    }

    /// Fetch and decode a code document by its stored id.
    async fn read_code(
        &self,
        collection: Collection,
        id: &str,
    ) -> ArenaResult<Option<CodeDocument>> {
        let id = DocumentId::parse(id)?;
        let Some(value) = self.docs.get(collection, &id).await? else {
            return Ok(None);
        };
        let code = serde_json::from_value(value).map_err(DocStoreError::Serialization)?;
        Ok(Some(code))
    }

    /// Undo a code document write after the paired relational write failed.
    ///
    /// Fires at most once per failure and returns the error to surface:
    /// the relational error wrapped as `PairedWriteFailed` when the
    /// document was removed, or `FatalInconsistency` when the removal
    /// itself failed and the document is now orphaned.
    async fn compensate(
        &self,
        collection: Collection,
        document_id: DocumentId,
        db_err: DbErr,
    ) -> ArenaError {
        match self.docs.delete(collection, &document_id).await {
            Ok(_) => {
                warn!(
                    "Relational write failed, removed paired code document {document_id}: {db_err}"
                );
                ArenaError::PairedWriteFailed {
                    document_id,
                    source: db_err,
                }
            }
            Err(delete_err) => self.fatal(format!(
                "relational write failed ({db_err}) and removing code document {document_id} \
                 from `{collection}` also failed ({delete_err}); the document is orphaned"
            )),
        }
    }

    /// Delete a companion code document after its owning row is gone.
    ///
    /// An already-absent document is logged and tolerated since the target
    /// state is reached; a failing delete leaves an orphan and is fatal.
    async fn remove_code(
        &self,
        collection: Collection,
        id: &str,
        owner_kind: &str,
        owner: &str,
    ) -> ArenaResult<()> {
        let document_id = match DocumentId::parse(id) {
            Ok(document_id) => document_id,
            Err(e) => {
                return Err(self.fatal(format!(
                    "deleted {owner_kind} `{owner}` holds an unusable code document id: {e}"
                )));
            }
        };

        match self.docs.delete(collection, &document_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                warn!(
                    target: CONSISTENCY_TARGET,
                    "code document {document_id} for deleted {owner_kind} `{owner}` was already missing"
                );
                Ok(())
            }
            Err(e) => Err(self.fatal(format!(
                "deleted {owner_kind} `{owner}` but its code document {document_id} could not \
                 be removed: {e}"
            ))),
        }
    }

    /// Verify a freshly inserted entry is visible through both relation
    /// back-references and still matches its input.
    async fn assert_entry_linked(
        &self,
        inserted: &game_entry::Model,
        new_entry: &NewEntry,
    ) -> ArenaResult<()> {
        let view = self
            .get_entry(
                inserted.id,
                &[EntryRelation::Game, EntryRelation::Submitter],
            )
            .await?
            .ok_or_else(|| {
                self.fatal(format!(
                    "entry {} missing immediately after insert",
                    inserted.id
                ))
            })?;

        let game_matches = view
            .game
            .as_ref()
            .is_some_and(|g| g.name == new_entry.game_name);
        let submitter_matches = view
            .submitter
            .as_ref()
            .is_some_and(|u| u.username == new_entry.submitter);
        if !game_matches || !submitter_matches {
            return Err(self.fatal(format!(
                "stored entry {} does not reference game `{}` and submitter `{}`",
                inserted.id, new_entry.game_name, new_entry.submitter
            )));
        }

        let in_game_entries = self
            .get_game(&new_entry.game_name, &[GameRelation::Entries])
            .await?
            .and_then(|view| view.entries)
            .is_some_and(|entries| entries.iter().any(|e| e.id == inserted.id));
        let in_user_entries = self
            .get_user(&new_entry.submitter, &[UserRelation::GameEntries])
            .await?
            .and_then(|view| view.game_entries)
            .is_some_and(|entries| entries.iter().any(|e| e.id == inserted.id));
        if !in_game_entries || !in_user_entries {
            return Err(self.fatal(format!(
                "entry {} is not visible from its game and submitter relations",
                inserted.id
            )));
        }

        Ok(())
    }

    /// Record an inconsistency between the two stores on the operator
    /// channel and produce the error to propagate.
    fn fatal(&self, detail: String) -> ArenaError {
        tracing::error!(target: CONSISTENCY_TARGET, "{detail}");
        ArenaError::FatalInconsistency(detail)
    }
}

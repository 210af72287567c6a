use serde::{Deserialize, Serialize};

use crate::entity::{game, game_entry, user};

/// Input for creating a user record.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub displayname: String,
    /// Opaque salted hash; produced by the credential layer.
    pub password_hash: String,
    pub salt: String,
}

/// Input for creating a game. The code document travels separately and is
/// written as one logical unit with the record.
#[derive(Clone, Debug)]
pub struct NewGame {
    pub name: String,
    pub description: String,
}

/// Input for creating a game entry.
#[derive(Clone, Debug)]
pub struct NewEntry {
    pub game_name: String,
    pub submitter: String,
}

/// Payload of a paired code document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDocument {
    pub code: String,
}

impl CodeDocument {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Relations loadable alongside a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameRelation {
    Entries,
}

/// Relations loadable alongside a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserRelation {
    GameEntries,
}

/// Relations loadable alongside a game entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryRelation {
    Game,
    Submitter,
}

/// A game with optionally loaded relations.
///
/// `entries` is `None` when the relation was not requested.
#[derive(Clone, Debug)]
pub struct GameView {
    pub game: game::Model,
    pub entries: Option<Vec<game_entry::Model>>,
}

/// A user with optionally loaded relations.
#[derive(Clone, Debug)]
pub struct UserView {
    pub user: user::Model,
    pub game_entries: Option<Vec<game_entry::Model>>,
}

/// A game entry with optionally loaded relations.
///
/// `game` is `None` when the relation was not requested. `submitter` is
/// `None` when not requested, or when the submitting user has been
/// deleted.
#[derive(Clone, Debug)]
pub struct EntryView {
    pub entry: game_entry::Model,
    pub game: Option<game::Model>,
    pub submitter: Option<user::Model>,
}

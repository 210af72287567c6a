use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game_entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Id of the paired code document in the `entries` collection.
    pub submitted_code_id: String,

    /// NULL once the submitting user has been deleted; the entry itself
    /// survives.
    pub submitter_username: Option<String>,
    #[sea_orm(belongs_to, from = "submitter_username", to = "username")]
    pub submitter: Option<super::user::Entity>,

    pub game_name: String,
    #[sea_orm(belongs_to, from = "game_name", to = "name")]
    pub game: HasOne<super::game::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

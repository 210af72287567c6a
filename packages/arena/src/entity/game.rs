use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game")]
pub struct Model {
    /// Globally unique game name.
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    pub description: String,

    /// Id of the paired code document in the `games` collection.
    /// Always written together with the document it references.
    pub game_code_id: String,

    #[sea_orm(has_many)]
    pub entries: HasMany<super::game_entry::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// Login name, chosen once at registration.
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,

    #[sea_orm(unique)]
    pub email: String,
    pub displayname: String,

    /// Salted hash of the password. Hashing and comparison happen at the
    /// credential layer; this record only carries the opaque values.
    pub password_hash: String,
    pub salt: String,

    #[sea_orm(has_many)]
    pub game_entries: HasMany<super::game_entry::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

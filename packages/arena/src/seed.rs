use sea_orm::*;
use sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::entity::game_entry;

/// Ensure required database indexes exist.
///
/// Schema sync covers tables and unique constraints but not plain lookup
/// indexes, so the entry foreign-key columns are indexed manually on
/// startup. Failures are logged and tolerated; the indexes only matter for
/// query speed.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes = [
        ("idx_game_entry_game_name", game_entry::Column::GameName),
        (
            "idx_game_entry_submitter",
            game_entry::Column::SubmitterUsername,
        ),
    ];

    for (name, column) in indexes {
        let stmt = Index::create()
            .if_not_exists()
            .name(name)
            .table(game_entry::Entity)
            .col(column)
            .to_string(PostgresQueryBuilder);

        match db.execute_unprepared(&stmt).await {
            Ok(_) => {
                info!("Ensured index {name} exists");
            }
            Err(e) => {
                tracing::warn!("Failed to create index {name}: {e}");
            }
        }
    }

    Ok(())
}

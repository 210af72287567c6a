use sea_orm::{EntityTrait, PaginatorTrait};

use arena::ArenaError;
use arena::entity::game_entry;
use arena::models::{CodeDocument, EntryRelation, GameRelation, NewEntry, UserRelation};

use crate::common::TestArena;

#[tokio::test]
async fn entry_requires_an_existing_game() {
    let t = TestArena::spawn().await;
    t.create_user("player").await;

    let err = t
        .arena
        .create_entry(
            NewEntry {
                game_name: "missing".into(),
                submitter: "player".into(),
            },
            CodeDocument::new("x();"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ArenaError::GameNotFound(name) if name == "missing"));

    // Neither store was written.
    assert_eq!(game_entry::Entity::find().count(&t.db).await.unwrap(), 0);
    assert_eq!(t.document_count("entries"), 0);
}

#[tokio::test]
async fn entry_requires_an_existing_submitter() {
    let t = TestArena::spawn().await;
    t.create_game("Pong", "bounce();").await;

    let err = t
        .arena
        .create_entry(
            NewEntry {
                game_name: "Pong".into(),
                submitter: "nobody".into(),
            },
            CodeDocument::new("x();"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ArenaError::UserNotFound(name) if name == "nobody"));

    assert_eq!(game_entry::Entity::find().count(&t.db).await.unwrap(), 0);
    assert_eq!(t.document_count("entries"), 0);
}

#[tokio::test]
async fn entry_is_visible_from_both_back_references() {
    let t = TestArena::spawn().await;
    t.create_user("player").await;
    t.create_game("Pong", "bounce();").await;
    let entry = t.create_entry("Pong", "player", "paddle();").await;

    let view = t
        .arena
        .get_entry(entry.id, &[EntryRelation::Game, EntryRelation::Submitter])
        .await
        .unwrap()
        .expect("entry should exist");
    assert_eq!(view.game.as_ref().map(|g| g.name.as_str()), Some("Pong"));
    assert_eq!(
        view.submitter.as_ref().map(|u| u.username.as_str()),
        Some("player")
    );

    let game_view = t
        .arena
        .get_game("Pong", &[GameRelation::Entries])
        .await
        .unwrap()
        .unwrap();
    let entries = game_view.entries.expect("entries relation was requested");
    assert!(entries.iter().any(|e| e.id == entry.id));

    let user_view = t
        .arena
        .get_user("player", &[UserRelation::GameEntries])
        .await
        .unwrap()
        .unwrap();
    let game_entries = user_view
        .game_entries
        .expect("game_entries relation was requested");
    assert!(game_entries.iter().any(|e| e.id == entry.id));
}

#[tokio::test]
async fn entry_code_round_trip_and_delete() {
    let t = TestArena::spawn().await;
    t.create_user("player").await;
    t.create_game("Pong", "bounce();").await;
    let entry = t.create_entry("Pong", "player", "paddle();").await;

    let code = t
        .arena
        .get_entry_code(&entry.submitted_code_id)
        .await
        .unwrap()
        .expect("entry code document should exist");
    assert_eq!(code.code, "paddle();");

    let deleted = t
        .arena
        .delete_entry(entry.id)
        .await
        .unwrap()
        .expect("delete should return the entry");
    assert_eq!(deleted.id, entry.id);

    assert!(t.arena.get_entry(entry.id, &[]).await.unwrap().is_none());
    assert!(t
        .arena
        .get_entry_code(&entry.submitted_code_id)
        .await
        .unwrap()
        .is_none());

    // Parent records survive an entry delete.
    assert!(t.arena.get_game("Pong", &[]).await.unwrap().is_some());
    assert!(t.arena.get_user("player", &[]).await.unwrap().is_some());

    // Deleting again is a no-op.
    assert!(t.arena.delete_entry(entry.id).await.unwrap().is_none());
}

use arena::ArenaError;
use arena::models::{CodeDocument, NewGame};

use crate::common::{TestArena, new_game};

#[tokio::test]
async fn game_and_code_round_trip() {
    let t = TestArena::spawn().await;

    let created = t.create_game("TicTacToe", "console.log(1)").await;
    assert!(!created.game_code_id.is_empty());

    let view = t
        .arena
        .get_game("TicTacToe", &[])
        .await
        .unwrap()
        .expect("game should exist");
    assert_eq!(view.game.name, "TicTacToe");
    assert_eq!(view.game.description, new_game("TicTacToe").description);
    assert_eq!(view.game.game_code_id, created.game_code_id);

    let code = t
        .arena
        .get_game_code(&created.game_code_id)
        .await
        .unwrap()
        .expect("code document should exist");
    assert_eq!(code, CodeDocument::new("console.log(1)"));

    let deleted = t
        .arena
        .delete_game("TicTacToe")
        .await
        .unwrap()
        .expect("delete should return the game");
    assert_eq!(deleted.name, "TicTacToe");

    assert!(t.arena.get_game("TicTacToe", &[]).await.unwrap().is_none());
    assert!(t
        .arena
        .get_game_code(&created.game_code_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn duplicate_name_is_a_conflict_and_keeps_the_original() {
    let t = TestArena::spawn().await;
    let original = t.create_game("TicTacToe", "console.log(1)").await;

    let err = t
        .arena
        .create_game(
            NewGame {
                name: "TicTacToe".into(),
                description: "lul".into(),
            },
            CodeDocument::new("console.log(2)"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ArenaError::NameConflict(name) if name == "TicTacToe"));

    // Stored game and code are still the first creator's.
    let view = t.arena.get_game("TicTacToe", &[]).await.unwrap().unwrap();
    assert_eq!(view.game.description, original.description);
    assert_eq!(view.game.game_code_id, original.game_code_id);

    let code = t
        .arena
        .get_game_code(&original.game_code_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(code.code, "console.log(1)");

    // The losing create wrote nothing to the document store either.
    assert_eq!(t.document_count("games"), 1);
}

#[tokio::test]
async fn delete_absent_game_is_a_no_op() {
    let t = TestArena::spawn().await;
    assert!(t.arena.delete_game("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_game_cascades_to_entries() {
    let t = TestArena::spawn().await;
    t.create_user("player").await;
    t.create_game("Pong", "bounce();").await;
    let entry = t.create_entry("Pong", "player", "paddle();").await;
    assert_eq!(t.document_count("entries"), 1);

    t.arena
        .delete_game("Pong")
        .await
        .unwrap()
        .expect("delete should return the game");

    assert!(t.arena.get_entry(entry.id, &[]).await.unwrap().is_none());
    assert_eq!(t.document_count("games"), 0);
    assert_eq!(t.document_count("entries"), 0);

    // The submitter is untouched.
    assert!(t.arena.get_user("player", &[]).await.unwrap().is_some());
}

pub mod game;
pub mod game_entry;
pub mod user;

mod common;
mod entry;
mod game;

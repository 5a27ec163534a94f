pub mod board;
pub mod collision;
pub mod game;
pub mod piece;
pub mod scoring;
pub mod snapshot;

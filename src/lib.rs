pub mod app;
pub mod follow;
pub mod group;
pub mod interrupt;
pub mod output;
pub mod render;
pub mod terminal;

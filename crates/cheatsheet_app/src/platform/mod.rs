pub mod app;
pub mod config;
pub mod effects;
pub mod intake;
pub mod render;

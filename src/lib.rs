pub mod app;
pub mod config;
pub mod debounce;
pub mod discover;
pub mod events;
pub mod models;
pub mod page;
pub mod render;
pub mod tmdb;

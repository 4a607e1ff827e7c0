pub mod cli;
pub mod commands;
pub mod config;
pub mod tui;

pub use kanban_core as core;
pub use kanban_core::model;

pub use kanban_core::AppConfig;

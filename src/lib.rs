pub use kanban_tui::cli;
pub use kanban_tui::commands;
pub use kanban_tui::config;
pub use kanban_tui::tui;
pub use kanban_tui::AppConfig;

pub use kanban_core as core;
pub use kanban_core::model;
pub use kanban_core::telemetry;

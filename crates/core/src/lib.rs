pub mod api;
pub mod board;
pub mod config;
pub mod drag;
pub mod filter;
pub mod form;
pub mod http;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod model;
pub mod options;
pub mod pagination;
pub mod resolver;
pub mod session;
pub mod telemetry;

pub use api::{ApiError, TaskApi, TaskPage};
pub use board::{BoardProjection, ListProjection};
pub use config::{AppConfig, ConfigOverrides};
pub use filter::{FilterInputs, FilterSpec};
pub use http::HttpTaskApi;
pub use model::*;
pub use session::{Command, Completion, Notice, Reaction, Session, UiEvent};

//! CLI layer - Command-line interface
//!
//! Contains argument parsing, the stdin command reader, output
//! formatting, signal handling, the edit-session runner, and the
//! example task list.

pub mod app;
pub mod args;
pub mod command;
pub mod config_cmd;
pub mod presenter;
pub mod session_cmd;
pub mod signals;
pub mod tasks_cmd;

// Re-export commonly used types
pub use app::{run_edit, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, EditArgs, EditOptions, SessionAction, TasksAction};
pub use presenter::Presenter;

//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::recording::Duration;

/// TaskMaster - task drafts with image and voice-memo attachments
#[derive(Parser, Debug)]
#[command(name = "taskmaster")]
#[command(version)]
#[command(about = "Draft tasks with image and voice-memo attachments")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open an interactive task editor (commands are read from stdin)
    Edit(EditArgs),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage the stored login session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Browse the example task list
    Tasks {
        #[command(subcommand)]
        action: TasksAction,
    },
}

/// Options for `taskmaster edit`
#[derive(clap::Args, Debug, Default)]
pub struct EditArgs {
    /// Initial task title
    #[arg(short = 't', long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Edit one of the example tasks instead of creating a new one
    #[arg(long, value_name = "ID")]
    pub task: Option<String>,

    /// Show a desktop notification after saving
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Simulated latency before the task is submitted (e.g., 500ms, 2s)
    #[arg(long, value_name = "TIME")]
    pub submit_delay: Option<String>,

    /// Recordings stop automatically after this long (e.g., 30s, 5m)
    #[arg(long, value_name = "TIME")]
    pub max_recording: Option<String>,

    /// Directory voice memos are written to
    #[arg(long, value_name = "DIR")]
    pub recordings_dir: Option<PathBuf>,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Session action subcommands
#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// Show the stored identity
    Show,
    /// Store the id of the logged-in user
    Login {
        /// User id
        user_id: String,
    },
    /// Store the push-notification token for this device
    PushToken {
        /// Token issued by the push service
        token: String,
    },
    /// Forget the stored identity
    Logout,
}

/// Tasks action subcommands
#[derive(Subcommand, Debug)]
pub enum TasksAction {
    /// List the example tasks
    List {
        /// Print the tasks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an example task and list the ones left
    Delete {
        /// Task id
        id: String,
        /// Print the remaining tasks as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parsed edit options, after merging config sources
#[derive(Debug, Clone)]
pub struct EditOptions {
    pub title: Option<String>,
    pub task_id: Option<String>,
    pub recordings_dir: PathBuf,
    pub submit_delay: Duration,
    pub max_recording: Duration,
    pub notify: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &["recordings_dir", "submit_delay", "max_recording", "notify"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn edit_parses_defaults() {
        let cli = Cli::parse_from(["taskmaster", "edit"]);
        let Commands::Edit(args) = cli.command else {
            panic!("Expected edit command");
        };
        assert!(args.title.is_none());
        assert!(args.task.is_none());
        assert!(!args.notify);
        assert!(args.submit_delay.is_none());
    }

    #[test]
    fn tasks_delete_parses_id() {
        let cli = Cli::parse_from(["taskmaster", "tasks", "delete", "2", "--json"]);
        let Commands::Tasks {
            action: TasksAction::Delete { id, json },
        } = cli.command
        else {
            panic!("Expected tasks delete");
        };
        assert_eq!(id, "2");
        assert!(json);
    }

    #[test]
    fn edit_parses_options() {
        let cli = Cli::parse_from([
            "taskmaster",
            "edit",
            "-t",
            "Buy milk",
            "--task",
            "2",
            "-n",
            "--submit-delay",
            "0s",
            "--max-recording",
            "1m",
        ]);
        let Commands::Edit(args) = cli.command else {
            panic!("Expected edit command");
        };
        assert_eq!(args.title.as_deref(), Some("Buy milk"));
        assert_eq!(args.task.as_deref(), Some("2"));
        assert!(args.notify);
        assert_eq!(args.submit_delay.as_deref(), Some("0s"));
        assert_eq!(args.max_recording.as_deref(), Some("1m"));
    }

    #[test]
    fn config_set_parses() {
        let cli = Cli::parse_from(["taskmaster", "config", "set", "notify", "true"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "notify");
            assert_eq!(value, "true");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn session_login_parses() {
        let cli = Cli::parse_from(["taskmaster", "session", "login", "user-42"]);
        assert!(matches!(
            cli.command,
            Commands::Session {
                action: SessionAction::Login { ref user_id }
            } if user_id == "user-42"
        ));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["taskmaster"]).is_err());
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("submit_delay"));
        assert!(is_valid_config_key("recordings_dir"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}

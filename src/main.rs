//! TaskMaster CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskmaster::cli::{
    app::{cli_config, load_merged_config, resolve_edit_options, run_edit},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    session_cmd::handle_session_command,
    tasks_cmd::handle_tasks_command,
    EXIT_ERROR, EXIT_USAGE_ERROR,
};
use taskmaster::infrastructure::{InMemoryTaskStore, TomlSessionStore, XdgConfigStore};

/// Environment variable holding the log filter (e.g. `taskmaster=debug`)
const LOG_ENV: &str = "TASKMASTER_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    let presenter = Presenter::new();

    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Session { action } => {
            let store = TomlSessionStore::new();
            if let Err(e) = handle_session_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Tasks { action } => {
            let store = InMemoryTaskStore::with_examples();
            if let Err(e) = handle_tasks_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Edit(args) => {
            let config = load_merged_config(cli_config(&args)).await;
            match resolve_edit_options(&args, &config) {
                Ok(options) => run_edit(options).await,
                Err((key, e)) => {
                    presenter.error(&format!("Invalid {}: {}", key, e));
                    ExitCode::from(EXIT_USAGE_ERROR)
                }
            }
        }
    }
}

//! Interactive edit session runner

use std::env;
use std::io::BufRead;
use std::process::ExitCode;

use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::application::ports::{player_event_channel, ConfigStore};
use crate::application::{
    AttachmentCoordinator, EditSession, EditSessionConfig, SessionCommand, SessionOutcome,
    SessionSnapshot,
};
use crate::domain::config::AppConfig;
use crate::domain::error::DurationParseError;
use crate::domain::recording::Duration;
use crate::domain::task::TaskDraft;
use crate::infrastructure::{
    create_notifier, CpalRecorder, InMemoryTaskStore, RodioPlayer, TomlSessionStore,
    XdgConfigStore,
};

use super::args::{EditArgs, EditOptions};
use super::command::{parse_line, Input};
use super::presenter::Presenter;
use super::signals::cancel_on_interrupt;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment overrides, applied above the config file
pub const ENV_RECORDINGS_DIR: &str = "TASKMASTER_RECORDINGS_DIR";
pub const ENV_SUBMIT_DELAY: &str = "TASKMASTER_SUBMIT_DELAY";
pub const ENV_MAX_RECORDING: &str = "TASKMASTER_MAX_RECORDING";

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            Presenter::new().warn(&format!("Ignoring config file: {}", e));
            AppConfig::empty()
        }
    };

    let env_config = AppConfig {
        recordings_dir: env_value(ENV_RECORDINGS_DIR),
        submit_delay: env_value(ENV_SUBMIT_DELAY),
        max_recording: env_value(ENV_MAX_RECORDING),
        notify: None,
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Config layer contributed by `taskmaster edit` flags
pub fn cli_config(args: &EditArgs) -> AppConfig {
    AppConfig {
        recordings_dir: args
            .recordings_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string()),
        submit_delay: args.submit_delay.clone(),
        max_recording: args.max_recording.clone(),
        notify: args.notify.then_some(true),
    }
}

/// Turn the merged config into edit options, rejecting malformed durations
pub fn resolve_edit_options(
    args: &EditArgs,
    config: &AppConfig,
) -> Result<EditOptions, (&'static str, DurationParseError)> {
    let parse = |value: Option<&String>, fallback: fn() -> Duration, key: &'static str| match value {
        Some(s) => s.parse::<Duration>().map_err(|e| (key, e)),
        None => Ok(fallback()),
    };

    Ok(EditOptions {
        title: args.title.clone(),
        task_id: args.task.clone(),
        recordings_dir: config.recordings_dir_or_default(),
        submit_delay: parse(
            config.submit_delay.as_ref(),
            Duration::default_submit_delay,
            "submit-delay",
        )?,
        max_recording: parse(
            config.max_recording.as_ref(),
            Duration::default_max_recording,
            "max-recording",
        )?,
        notify: config.notify_or_default(),
    })
}

/// Run an interactive edit session until save, cancel, or end of input
pub async fn run_edit(options: EditOptions) -> ExitCode {
    let presenter = Presenter::new();

    let store = match options.task_id {
        Some(_) => InMemoryTaskStore::with_examples(),
        None => InMemoryTaskStore::new(),
    };

    let mut draft = match options.task_id.as_deref() {
        Some(id) => match store.get(id).await {
            Some(task) => TaskDraft::from_task(&task),
            None => {
                presenter.error(&format!("No example task with id \"{}\"", id));
                return ExitCode::from(EXIT_ERROR);
            }
        },
        None => TaskDraft::new(),
    };
    if let Some(title) = options.title {
        draft.set_title(title);
    }

    let (player_tx, player_rx) = player_event_channel();
    let coordinator = AttachmentCoordinator::new(
        CpalRecorder::new(),
        RodioPlayer::new(),
        options.recordings_dir,
        player_tx,
    );
    let session = EditSession::new(
        coordinator,
        draft,
        store,
        TomlSessionStore::new(),
        create_notifier(options.notify),
        EditSessionConfig {
            submit_delay: options.submit_delay,
            max_recording: options.max_recording,
            enable_notify: options.notify,
        },
    );

    let (command_tx, command_rx) = mpsc::channel(32);
    let (update_tx, update_rx) = watch::channel(session.snapshot());

    let renderer = tokio::spawn(render_updates(update_rx.clone()));
    let session_task = tokio::spawn(session.run(command_rx, player_rx, update_tx));
    let interrupt = cancel_on_interrupt(command_tx.clone());

    presenter.info("Editing task. Type `help` for commands.");
    forward_stdin(command_tx, update_rx).await;

    let outcome = session_task.await;
    interrupt.abort();
    if renderer.await.is_err() {
        debug!("renderer task ended abnormally");
    }

    match outcome {
        Ok(SessionOutcome::Saved(task)) => match serde_json::to_string_pretty(&task) {
            Ok(json) => {
                presenter.output(&json);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                presenter.error(&format!("Cannot serialise task: {}", e));
                ExitCode::from(EXIT_ERROR)
            }
        },
        Ok(SessionOutcome::Cancelled) | Ok(SessionOutcome::Closed) => {
            presenter.info("Draft discarded");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&format!("Session task failed: {}", e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Read stdin lines on a plain thread and forward them as session commands.
///
/// The thread is detached; a blocked read must not keep the runtime alive.
/// End of input cancels the session.
async fn forward_stdin(
    commands: mpsc::Sender<SessionCommand>,
    updates: watch::Receiver<SessionSnapshot>,
) {
    let (line_tx, mut line_rx) = mpsc::channel::<String>(32);
    let spawned = std::thread::Builder::new()
        .name("taskmaster-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });

    let presenter = Presenter::new();
    if let Err(e) = spawned {
        presenter.error(&format!("Cannot read input: {}", e));
        let _ = commands.send(SessionCommand::Cancel).await;
        return;
    }

    loop {
        let line = tokio::select! {
            line = line_rx.recv() => line,
            _ = commands.closed() => return,
        };
        let Some(line) = line else { break };

        match parse_line(&line) {
            Ok(Input::Command(command)) => {
                if commands.send(command).await.is_err() {
                    return;
                }
            }
            Ok(Input::Help) => presenter.editor_help(),
            Ok(Input::Status) => presenter.status(&updates.borrow()),
            Ok(Input::Blank) => {}
            Err(e) => presenter.warn(&e.to_string()),
        }
    }

    debug!("end of input");
    let _ = commands.send(SessionCommand::Cancel).await;
}

/// Print what changed after every processed session input
async fn render_updates(mut updates: watch::Receiver<SessionSnapshot>) {
    let mut presenter = Presenter::new();
    let mut previous = updates.borrow_and_update().clone();

    while updates.changed().await.is_ok() {
        let next = updates.borrow_and_update().clone();
        presenter.transition(&previous, &next);
        previous = next;
    }
    presenter.stop_spinner();
}

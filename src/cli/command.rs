//! Line-oriented editor commands read from stdin

use thiserror::Error;

use crate::application::SessionCommand;
use crate::domain::error::{DueDateParseError, PriorityParseError};
use crate::domain::task::{parse_due, Priority};

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(SessionCommand),
    Help,
    Status,
    Blank,
}

/// Errors for lines that are not valid commands
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Unknown command: \"{0}\". Type `help` for the list of commands")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Priority(#[from] PriorityParseError),

    #[error(transparent)]
    Due(#[from] DueDateParseError),
}

/// Parse one line typed into the editor
pub fn parse_line(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "" => return Ok(Input::Blank),
        "help" | "?" => return Ok(Input::Help),
        "status" => return Ok(Input::Status),
        "title" => SessionCommand::SetTitle(rest.to_string()),
        "body" => SessionCommand::SetBody(rest.to_string()),
        "tag" => SessionCommand::SetTag(rest.to_string()),
        "priority" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("priority"));
            }
            SessionCommand::SetPriority(rest.parse::<Priority>()?)
        }
        "due" => SessionCommand::SetDue(parse_due(rest)?),
        "image" => SessionCommand::SelectImage((!rest.is_empty()).then(|| rest.to_string())),
        "clear-image" => SessionCommand::ClearImage,
        "record" => SessionCommand::StartRecording,
        "stop" => SessionCommand::StopRecording,
        "play" => SessionCommand::PlayAudio,
        "stop-play" => SessionCommand::StopPlayback,
        "delete-audio" => SessionCommand::DeleteAudio,
        "dismiss" => SessionCommand::ResetSaveState,
        "save" => SessionCommand::Save,
        "cancel" | "quit" => SessionCommand::Cancel,
        other => return Err(InputError::Unknown(other.to_string())),
    };

    Ok(Input::Command(command))
}

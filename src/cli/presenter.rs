//! CLI presenter for output formatting
//!
//! Everything but the saved task goes to stderr, so stdout can be piped.

use std::time::Duration as StdDuration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::SessionSnapshot;
use crate::domain::attachment::AudioPhase;
use crate::domain::task::SaveResult;

/// Lines printed by `help` inside the editor
const EDITOR_HELP: &[(&str, &str)] = &[
    ("title <text>", "Set the title"),
    ("body <text>", "Set the description"),
    ("tag <text>", "Set the tag (empty clears it)"),
    ("priority <high|medium|low>", "Set the priority"),
    ("due <YYYY-MM-DD [HH:MM]>|none", "Set or clear the due date"),
    ("image [uri]", "Attach an image (no uri: picker cancelled)"),
    ("clear-image", "Remove the image"),
    ("record", "Start recording a voice memo"),
    ("stop", "Stop recording"),
    ("play", "Play the voice memo"),
    ("stop-play", "Stop playback"),
    ("delete-audio", "Delete the voice memo"),
    ("status", "Show the draft"),
    ("dismiss", "Clear the last save message"),
    ("save", "Save the task and exit"),
    ("cancel", "Discard the draft and exit"),
];

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(StdDuration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print a field of the draft to stderr
    fn field(&self, key: &str, value: &str) {
        eprintln!("  {:<10} {}", key.cyan(), value);
    }

    /// Print the command reference
    pub fn editor_help(&self) {
        for (usage, description) in EDITOR_HELP {
            eprintln!("  {:<32} {}", usage.bold(), description);
        }
    }

    /// Print the whole draft
    pub fn status(&self, snapshot: &SessionSnapshot) {
        let draft = &snapshot.draft;
        let attachments = &snapshot.attachments;
        let or_dash = |v: &str| if v.is_empty() { "-".to_string() } else { v.to_string() };

        self.field("title", &or_dash(draft.title()));
        self.field("body", &or_dash(draft.body()));
        self.field("tag", &or_dash(draft.tag()));
        self.field("priority", draft.priority().display_text());
        self.field(
            "due",
            &draft
                .due()
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
        self.field(
            "image",
            attachments.image_reference.as_deref().unwrap_or("-"),
        );
        self.field(
            "memo",
            &attachments
                .audio_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
        self.field("audio", &format_phase(&attachments.phase));
        if !matches!(snapshot.save_result, SaveResult::Idle) {
            self.field("last save", &snapshot.save_result.to_string());
        }
    }

    /// Report what changed between two snapshots
    pub fn transition(&mut self, prev: &SessionSnapshot, next: &SessionSnapshot) {
        let (before, after) = (&prev.attachments, &next.attachments);

        if before.image_reference != after.image_reference {
            match &after.image_reference {
                Some(reference) => self.info(&format!("Image attached: {}", reference)),
                None => self.info("Image removed"),
            }
        }

        if before.phase != after.phase {
            match (&before.phase, &after.phase) {
                (_, AudioPhase::Recording) => self.info("Recording... (type `stop` to finish)"),
                (AudioPhase::Recording, AudioPhase::Recorded) => {
                    let path = after
                        .audio_file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    self.success(&format!("Voice memo recorded: {}", path));
                }
                (AudioPhase::Playing, AudioPhase::Recorded) => self.info("Playback finished"),
                (_, AudioPhase::Playing) => self.info("Playing voice memo..."),
                (_, AudioPhase::Idle) => self.info("Voice memo discarded"),
                (_, AudioPhase::Error(message)) => self.error(message),
                _ => {}
            }
        }

        if !prev.is_loading && next.is_loading {
            self.start_spinner("Saving task...");
        } else if prev.is_loading && !next.is_loading {
            self.stop_spinner();
        }

        if prev.save_result != next.save_result {
            match &next.save_result {
                SaveResult::Success(_) => self.success(&next.save_result.to_string()),
                SaveResult::Error(message) => self.error(message),
                SaveResult::Idle => {}
            }
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Short, coloured label for an audio phase
pub fn format_phase(phase: &AudioPhase) -> String {
    match phase {
        AudioPhase::Idle => "no memo".dimmed().to_string(),
        AudioPhase::Recording => "recording".red().to_string(),
        AudioPhase::Recorded => "recorded".green().to_string(),
        AudioPhase::Playing => "playing".cyan().to_string(),
        AudioPhase::Error(message) => format!("{} ({})", "error".red(), message),
    }
}

//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::recording::Duration;

/// Directory name used under the platform config/cache/data dirs
pub const APP_DIR_NAME: &str = "taskmaster";

/// Environment variable that relocates every taskmaster file under one root
pub const HOME_ENV: &str = "TASKMASTER_HOME";

fn home_override() -> Option<PathBuf> {
    std::env::var_os(HOME_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Directory holding `config.toml`: `$TASKMASTER_HOME` or `<config>/taskmaster`
pub fn app_config_dir() -> PathBuf {
    home_override().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR_NAME)
    })
}

/// Directory holding persisted session state: `$TASKMASTER_HOME` or `<data>/taskmaster`
pub fn app_data_dir() -> PathBuf {
    home_override().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join(APP_DIR_NAME)
    })
}

/// Default location for voice memos: `<cache>/taskmaster/recordings`
pub fn default_recordings_dir() -> PathBuf {
    match home_override() {
        Some(home) => home.join("recordings"),
        None => dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR_NAME)
            .join("recordings"),
    }
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub recordings_dir: Option<String>,
    pub submit_delay: Option<String>,
    pub max_recording: Option<String>,
    pub notify: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            recordings_dir: Some(default_recordings_dir().to_string_lossy().to_string()),
            submit_delay: Some(Duration::default_submit_delay().to_string()),
            max_recording: Some(Duration::default_max_recording().to_string()),
            notify: Some(false),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            recordings_dir: other.recordings_dir.or(self.recordings_dir),
            submit_delay: other.submit_delay.or(self.submit_delay),
            max_recording: other.max_recording.or(self.max_recording),
            notify: other.notify.or(self.notify),
        }
    }

    /// Get the recordings directory, or the platform default if not set
    pub fn recordings_dir_or_default(&self) -> PathBuf {
        self.recordings_dir
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_recordings_dir)
    }

    /// Get submit_delay as parsed Duration, or default if not set/invalid
    pub fn submit_delay_or_default(&self) -> Duration {
        self.submit_delay
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_submit_delay)
    }

    /// Get max_recording as parsed Duration, or default if not set/invalid
    pub fn max_recording_or_default(&self) -> Duration {
        self.max_recording
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_recording)
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }
}

//! Session identity persisted as a small TOML file

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::{SessionStore, SessionStoreError};
use crate::domain::config::app_data_dir;
use crate::domain::session::SessionIdentity;

/// `session.toml` under the platform data directory
pub struct TomlSessionStore {
    path: PathBuf,
}

impl TomlSessionStore {
    /// Store at `<data>/taskmaster/session.toml` (or under `$TASKMASTER_HOME`)
    pub fn new() -> Self {
        Self {
            path: app_data_dir().join("session.toml"),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for TomlSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for TomlSessionStore {
    async fn load(&self) -> Result<SessionIdentity, SessionStoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored session");
                return Ok(SessionIdentity::default());
            }
            Err(e) => return Err(SessionStoreError::ReadError(e.to_string())),
        };

        toml::from_str(&content).map_err(|e| SessionStoreError::ParseError(e.to_string()))
    }

    async fn save(&self, identity: &SessionIdentity) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionStoreError::WriteError(e.to_string()))?;
        }

        let content = toml::to_string_pretty(identity)
            .map_err(|e| SessionStoreError::WriteError(e.to_string()))?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| SessionStoreError::WriteError(e.to_string()))
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionStoreError::WriteError(e.to_string())),
        }
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

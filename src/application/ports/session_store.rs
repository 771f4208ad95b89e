//! Session store port interface

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::session::SessionIdentity;

/// Session store errors
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    #[error("Failed to read session: {0}")]
    ReadError(String),

    #[error("Failed to parse session: {0}")]
    ParseError(String),

    #[error("Failed to write session: {0}")]
    WriteError(String),
}

/// Port for the locally persisted session identity
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the identity; anonymous if nothing was stored.
    async fn load(&self) -> Result<SessionIdentity, SessionStoreError>;

    async fn save(&self, identity: &SessionIdentity) -> Result<(), SessionStoreError>;

    /// Forget the stored identity (logout).
    async fn clear(&self) -> Result<(), SessionStoreError>;

    fn path(&self) -> PathBuf;
}

//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod attachment;
pub mod config;
pub mod error;
pub mod recording;
pub mod session;
pub mod task;

// Re-export common types
pub use attachment::AudioPhase;
pub use config::AppConfig;
pub use error::*;
pub use recording::Duration;
pub use session::SessionIdentity;
pub use task::{Priority, SaveResult, Task, TaskDraft};

//! Application layer - Use cases and port interfaces
//!
//! Contains the attachment state machine, the task-edit session that
//! drives it, and the trait definitions for external systems.

pub mod attachment;
pub mod edit_session;
pub mod ports;

#[cfg(test)]
mod attachment_props;
#[cfg(test)]
pub(crate) mod testing;

// Re-export use cases
pub use attachment::{AttachmentCoordinator, AttachmentSnapshot};
pub use edit_session::{
    EditSession, EditSessionConfig, SessionCommand, SessionOutcome, SessionSnapshot,
    SAVE_SUCCESS_MESSAGE,
};

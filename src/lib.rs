//! TaskMaster - task drafts with image and voice-memo attachments
//!
//! This crate provides the attachment state machine behind the task editor:
//! picking an image, recording a voice memo from the microphone, playing it
//! back, and handing the finished task to the task service.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects (audio phase, task, draft, priority, config)
//! - **Application**: The attachment coordinator, the edit session, and port traits
//! - **Infrastructure**: Adapters (cpal recorder, rodio player, stores, notifications)
//! - **CLI**: Command-line interface, stdin command reader, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

//! Task domain module

mod draft;
mod priority;
mod task;

pub use draft::{parse_due, EmptyTitleError, SaveResult, TaskDraft};
pub use priority::{Priority, ALL_PRIORITIES};
pub use task::Task;

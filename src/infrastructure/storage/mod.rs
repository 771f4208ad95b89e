//! Task storage module

mod memory_task_store;

pub use memory_task_store::InMemoryTaskStore;

//! Session persistence module

mod toml_session_store;

pub use toml_session_store::TomlSessionStore;

//! Session domain module

mod identity;

pub use identity::SessionIdentity;

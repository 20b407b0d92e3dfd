//! Repository implementations module.
//!
//! - `local`: In-memory implementation used by the server, unit tests and
//!   local development
pub mod local;

pub use local::LocalRepository;

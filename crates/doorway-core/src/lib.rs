//! Shared vocabulary for the doorway access-control gate.
//!
//! Credentials, verification outcomes, feedback records, the static
//! configuration and the crate-wide error type live here so that the
//! hardware, network and gate crates agree on them.

pub mod address;
pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

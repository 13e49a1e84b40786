//! Logging setup shared by the binaries and tests of the workspace.
pub mod config;
pub mod panic_hook;
pub mod tracing;

pub use config::Config;

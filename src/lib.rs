pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod gitsync;
pub mod installer;
pub mod marker;
pub mod registry;
pub mod topology;
pub mod utils;

pub use error::{Result, SpError};

/// Crate version, re-exported for report payloads.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

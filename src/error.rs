//! Error types for the fallible edges of the crate
//!
//! The simulation itself never fails; only parsing of level tables,
//! settings and persisted progress does.

use thiserror::Error;

/// Errors produced while loading external data
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid settings: {0}")]
    Settings(#[source] serde_json::Error),

    #[error("invalid level catalog: {0}")]
    Catalog(#[source] serde_json::Error),

    #[error("invalid progress record: {0}")]
    Progress(#[source] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("level catalog contains no levels")]
    EmptyCatalog,

    #[error("level {level}: {reason}")]
    InvalidLevel { level: u32, reason: &'static str },

    #[error("level {level}, brick {index}: {reason}")]
    InvalidBrick {
        level: u32,
        index: usize,
        reason: &'static str,
    },
}

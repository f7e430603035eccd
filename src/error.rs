//! Error types for taskboard
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad arguments, unknown item, bad config)
//! - 3: Conflict (duplicate identity, missing epic, schedule overlap)
//! - 4: Operation failed (io, malformed board file)

use thiserror::Error;

use crate::item::ItemId;

/// Exit codes for the taskboard CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const CONFLICT: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskboard operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Conflicts (exit code 3)
    #[error("Item with id {0} already exists")]
    DuplicateId(ItemId),

    #[error("Epic with id {0} does not exist")]
    MissingEpic(ItemId),

    #[error("Scheduled time overlaps item {0}")]
    TimeOverlap(ItemId),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidArgument(_) | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            // Conflicts
            Error::DuplicateId(_) | Error::MissingEpic(_) | Error::TimeOverlap(_) => {
                exit_codes::CONFLICT
            }

            // Operation failures
            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for taskboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
        }
    }
}

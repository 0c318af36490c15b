//! Global error handling for pkm-manifest
//!
//! Per-file read problems never reach this type; they are folded into
//! placeholder text by the loader. Everything here aborts the run.

use std::io;
use thiserror::Error;

/// Global error type for pkm-manifest operations
#[derive(Error, Debug)]
pub enum PackError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Directory listing errors
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// XML processing errors
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON configuration errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to move the finished document into place
    #[error("Failed to persist output: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writer errors
    #[error("Writer error: {0}")]
    Writer(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Specialized Result type for pkm-manifest operations
pub type Result<T> = std::result::Result<T, PackError>;

/// Creates a PackError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::PackError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

//! Error types for theme fragment construction.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building theme fragments.
///
/// Every variant is fatal to plugin construction.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// A theme, normalize or icon resource could not be located under any
    /// configured base directory nor the working directory.
    #[error("Can not find the file: {request}")]
    ResourceNotFound {
        request: String,
        searched: Vec<PathBuf>,
    },

    /// The SCSS compiler rejected the assembled source.
    #[error("SASS compilation failed: {message}")]
    Compile { message: String },

    /// A located resource could not be read.
    #[error("Failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    /// Plugin options could not be parsed.
    #[error("Invalid theme plugin options: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

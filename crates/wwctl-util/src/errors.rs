use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all wwctl operations.
#[derive(Debug, Error, Diagnostic)]
pub enum WwError {
    /// The configuration file could not be read or parsed.
    #[error("Failed to load configuration from {}: {message}", .path.display())]
    #[diagnostic(help(
        "Pass --warewulfconf <path>, set WAREWULFCONF, or use --emptyconf to run without a configuration file"
    ))]
    Config { path: PathBuf, message: String },

    /// The command tree was assembled incorrectly (duplicate names, bad flags).
    #[error("Command registration failed: {message}")]
    Registration { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type WwResult<T> = miette::Result<T>;

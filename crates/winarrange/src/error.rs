//! Error handling for the winarrange binary.

use std::{io, path::PathBuf, result};

use thiserror::Error;

/// Convenient result type for winarrange commands.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Discovery, layout or monitor errors.
    #[error("{0}")]
    Arrange(#[from] arranger::Error),
    /// Settings could not be read, parsed or written.
    #[error("Settings error: {}", .0.pretty())]
    Config(#[from] config::Error),
    /// The desktop fixture could not be loaded.
    #[error("Desktop fixture {}: {message}", path.display())]
    Fixture {
        /// Fixture file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },
}

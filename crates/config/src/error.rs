//! Error types for settings loading, saving and validation.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors produced while loading, parsing, writing, or validating settings.
pub enum Error {
    #[error("{message}")]
    /// I/O or filesystem read error.
    Read {
        /// Optional path associated with the read error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// RON parse error; the message carries the line/column location.
    Parse {
        /// Optional path associated with the parse error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// Failure serializing or writing the settings file.
    Write {
        /// Path that could not be written.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },
    #[error("{section}.{key}: {message}")]
    /// A stored value could not be interpreted.
    Validation {
        /// Settings section.
        section: String,
        /// Key within the section.
        key: String,
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Render a human-friendly error message including location when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => match path {
                Some(p) => format!("Read error at {}: {}", p.display(), message),
                None => format!("Read error: {}", message),
            },
            Self::Parse { path, message } => match path {
                Some(p) => format!("Settings parse error in {}\n{}", p.display(), message),
                None => format!("Settings parse error\n{}", message),
            },
            Self::Write { path, message } => {
                format!("Write error at {}: {}", path.display(), message)
            }
            Self::Validation {
                section,
                key,
                message,
            } => format!("Invalid setting [{}] {}: {}", section, key, message),
        }
    }

    /// Access the optional path attached to this error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path.as_deref(),
            Self::Write { path, .. } => Some(path),
            Self::Validation { .. } => None,
        }
    }

    /// Build a validation error for `section.key`.
    pub(crate) fn invalid(section: &str, key: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            section: section.to_string(),
            key: key.to_string(),
            message: message.into(),
        }
    }
}

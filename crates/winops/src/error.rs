use thiserror::Error;

use crate::WindowHandle;

/// Errors that can occur during window operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Enumerating top-level windows failed.
    #[error("window enumeration failed: {0}")]
    Enumerate(String),

    /// Enumerating displays failed.
    #[error("screen enumeration failed: {0}")]
    Screens(String),

    /// The window closed before or during the operation.
    #[error("window {0} is gone")]
    WindowGone(WindowHandle),

    /// The OS refused the operation (elevated or protected window).
    #[error("access denied for window {0}")]
    AccessDenied(WindowHandle),

    /// Owning process of a window could not be resolved.
    #[error("process lookup failed: {0}")]
    ProcessLookup(String),

    /// Any other OS-level failure, with the platform's description.
    #[error("OS error: {0}")]
    Os(String),
}

/// Result alias for facade operations.
pub type Result<T> = std::result::Result<T, Error>;

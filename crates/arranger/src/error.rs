use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the arranger crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors surfaced synchronously to callers of the arranger.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither title nor process keywords were supplied.
    #[error("no filter keywords provided; supply title or process keywords")]
    NoFilter,

    /// Discovery ran but nothing matched the filter.
    #[error("no windows matched the filter")]
    NoWindowsMatched,

    /// The monitor was asked to start with no arranged windows to track.
    #[error("nothing to monitor; arrange windows first")]
    NothingToMonitor,

    /// Window enumeration failed in the OS facade.
    #[error("window detection failed: {0}")]
    Discovery(#[source] winops::Error),

    /// Screen enumeration failed in the OS facade.
    #[error("screen detection failed: {0}")]
    Screens(#[source] winops::Error),

    /// The OS reported no displays.
    #[error("no screens available")]
    NoScreens,

    /// Layout parameters cannot produce a layout.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// The monitor interval must be non-zero.
    #[error("monitor interval must be greater than zero")]
    InvalidInterval,

    /// The arranger was shut down and accepts no further work.
    #[error("arranger has been shut down")]
    ShutDown,

    /// No sort strategy is registered under this name.
    #[error("unknown sort strategy '{0}'")]
    UnknownStrategy(String),
}

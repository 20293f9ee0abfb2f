use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::Rect;

/// Opaque OS-assigned window identifier.
///
/// Stable while the window lives, but the OS may hand the same value to an
/// unrelated window after this one closes. Never treat it as a long-lived
/// identity without corroborating the owning process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl Display for WindowHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:#x}", self.0)
    }
}

/// A top-level window as reported by [`crate::WinOps::list_windows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub title: String,
    pub rect: Rect,
    pub visible: bool,
    pub minimized: bool,
}

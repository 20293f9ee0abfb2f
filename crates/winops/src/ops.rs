use crate::{Result, Screen, WindowHandle, WindowInfo};

/// Trait abstraction over OS window operations.
///
/// Implementations wrap the platform's window APIs. Each call stands alone
/// and may fail independently; callers decide how far a failure spreads.
pub trait WinOps: Send + Sync {
    /// Enumerate all top-level windows with geometry, title and visibility.
    fn list_windows(&self) -> Result<Vec<WindowInfo>>;
    /// Resolve the id of the process owning `handle`.
    fn window_pid(&self, handle: WindowHandle) -> Result<u32>;
    /// Resolve the executable name of process `pid`.
    fn process_name(&self, pid: u32) -> Result<String>;
    /// Whether the window is currently minimized.
    fn is_minimized(&self, handle: WindowHandle) -> Result<bool>;
    /// Restore a minimized window.
    fn restore(&self, handle: WindowHandle) -> Result<()>;
    /// Move the window's top-left corner to `(x, y)`.
    fn move_window(&self, handle: WindowHandle, x: i32, y: i32) -> Result<()>;
    /// Resize the window to `w` by `h`, keeping its origin.
    fn resize_window(&self, handle: WindowHandle, w: i32, h: i32) -> Result<()>;
}

/// Trait abstraction over display enumeration.
pub trait ScreenOps: Send + Sync {
    /// List connected displays in global coordinates.
    fn list_screens(&self) -> Result<Vec<Screen>>;
}

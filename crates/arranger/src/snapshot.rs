use winops::{Rect, WindowHandle};

/// Placeholder process name used when the owner's name cannot be resolved.
pub const UNKNOWN_PROCESS: &str = "unknown";

/// One candidate window, captured fresh on every discovery or poll cycle.
///
/// Snapshots are values: they are replaced wholesale, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub handle: WindowHandle,
    pub title: String,
    pub rect: Rect,
    /// Process owning the window at capture time.
    pub process_id: u32,
    /// Best-effort executable name, [`UNKNOWN_PROCESS`] on lookup failure.
    pub process_name: String,
}

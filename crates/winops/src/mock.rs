//! In-memory desktop implementing [`WinOps`] and [`ScreenOps`].

use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Error, Rect, Result, Screen, ScreenOps, WinOps, WindowHandle, WindowInfo};

/// A window living on the mock desktop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockWindow {
    pub handle: WindowHandle,
    pub title: String,
    /// Owning process id.
    pub pid: u32,
    /// Executable name; `None` makes process-name lookups fail.
    #[serde(default)]
    pub process: Option<String>,
    pub rect: Rect,
    /// Hidden windows are skipped by discovery.
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub minimized: bool,
}

/// Serde default for [`MockWindow::visible`].
fn default_true() -> bool {
    true
}

impl MockWindow {
    /// A visible, non-minimized window owned by `pid` running `process`.
    pub fn new(handle: u64, title: &str, pid: u32, process: &str, rect: Rect) -> Self {
        Self {
            handle: WindowHandle(handle),
            title: title.to_string(),
            pid,
            process: Some(process.to_string()),
            rect,
            visible: true,
            minimized: false,
        }
    }
}

/// Mock desktop. Clones share state, so tests keep one clone while the
/// arranger drives another.
#[derive(Clone, Default)]
pub struct MockWinOps {
    windows: Arc<Mutex<Vec<MockWindow>>>,
    screens: Arc<Mutex<Vec<Screen>>>,
    calls: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<HashSet<WindowHandle>>>,
    fail_list: Arc<AtomicBool>,
    panic_list: Arc<AtomicBool>,
}

impl MockWinOps {
    /// Empty desktop with no screens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Desktop with a single primary screen of the given size at the origin.
    pub fn with_screen(width: i32, height: i32) -> Self {
        let ops = Self::new();
        ops.set_screens(vec![Screen {
            x: 0,
            y: 0,
            width,
            height,
            is_primary: true,
        }]);
        ops
    }

    /// Replace every window.
    pub fn set_windows(&self, wins: Vec<MockWindow>) {
        *self.windows.lock() = wins;
    }

    /// Open a window on top of the others.
    pub fn add_window(&self, win: MockWindow) {
        self.windows.lock().push(win);
    }

    /// Close a window.
    pub fn remove_window(&self, handle: WindowHandle) {
        self.windows.lock().retain(|w| w.handle != handle);
    }

    /// Current state of a window, if it exists.
    pub fn window(&self, handle: WindowHandle) -> Option<MockWindow> {
        self.windows.lock().iter().find(|w| w.handle == handle).cloned()
    }

    /// Simulate the user dragging or resizing a window by hand.
    pub fn set_rect(&self, handle: WindowHandle, rect: Rect) {
        self.update(handle, |w| w.rect = rect);
    }

    /// Simulate the OS recycling `handle` for a window of another process.
    pub fn set_pid(&self, handle: WindowHandle, pid: u32, process: &str) {
        self.update(handle, |w| {
            w.pid = pid;
            w.process = Some(process.to_string());
        });
    }

    /// Minimize or restore a window.
    pub fn set_minimized(&self, handle: WindowHandle, minimized: bool) {
        self.update(handle, |w| w.minimized = minimized);
    }

    /// Replace the screen list.
    pub fn set_screens(&self, screens: Vec<Screen>) {
        *self.screens.lock() = screens;
    }

    /// Make enumeration fail until reset.
    pub fn set_fail_list(&self, v: bool) {
        self.fail_list.store(v, Ordering::SeqCst);
    }

    /// Make enumeration panic until reset.
    pub fn set_panic_list(&self, v: bool) {
        self.panic_list.store(v, Ordering::SeqCst);
    }

    /// Make every mutation of `handle` fail with access denied.
    pub fn fail_handle(&self, handle: WindowHandle) {
        self.failing.lock().insert(handle);
    }

    /// Every recorded mutation, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Recorded mutations that targeted `handle`.
    pub fn calls_for(&self, handle: WindowHandle) -> Vec<String> {
        let tag = handle.to_string();
        self.calls
            .lock()
            .iter()
            .filter(|c| c.split_whitespace().nth(1) == Some(tag.as_str()))
            .cloned()
            .collect()
    }

    /// Forget recorded mutations.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn note(&self, s: String) {
        trace!(call = %s, "mock_winops");
        self.calls.lock().push(s);
    }

    fn update(&self, handle: WindowHandle, f: impl FnOnce(&mut MockWindow)) {
        if let Some(w) = self.windows.lock().iter_mut().find(|w| w.handle == handle) {
            f(w);
        }
    }

    /// Apply a mutation, failing for closed or access-denied windows.
    fn mutate(&self, handle: WindowHandle, f: impl FnOnce(&mut MockWindow)) -> Result<()> {
        if self.failing.lock().contains(&handle) {
            return Err(Error::AccessDenied(handle));
        }
        let mut wins = self.windows.lock();
        let w = wins
            .iter_mut()
            .find(|w| w.handle == handle)
            .ok_or(Error::WindowGone(handle))?;
        f(w);
        Ok(())
    }
}

impl WinOps for MockWinOps {
    fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        if self.panic_list.load(Ordering::SeqCst) {
            panic!("mock enumeration panicked");
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::Enumerate("mock failure".into()));
        }
        Ok(self
            .windows
            .lock()
            .iter()
            .map(|w| WindowInfo {
                handle: w.handle,
                title: w.title.clone(),
                rect: w.rect,
                visible: w.visible,
                minimized: w.minimized,
            })
            .collect())
    }

    fn window_pid(&self, handle: WindowHandle) -> Result<u32> {
        self.window(handle)
            .map(|w| w.pid)
            .ok_or(Error::WindowGone(handle))
    }

    fn process_name(&self, pid: u32) -> Result<String> {
        self.windows
            .lock()
            .iter()
            .find(|w| w.pid == pid)
            .and_then(|w| w.process.clone())
            .ok_or_else(|| Error::ProcessLookup(format!("no process {pid}")))
    }

    fn is_minimized(&self, handle: WindowHandle) -> Result<bool> {
        self.window(handle)
            .map(|w| w.minimized)
            .ok_or(Error::WindowGone(handle))
    }

    fn restore(&self, handle: WindowHandle) -> Result<()> {
        self.note(format!("restore {handle}"));
        self.mutate(handle, |w| w.minimized = false)
    }

    fn move_window(&self, handle: WindowHandle, x: i32, y: i32) -> Result<()> {
        self.note(format!("move {handle} {x} {y}"));
        self.mutate(handle, |w| {
            w.rect.x = x;
            w.rect.y = y;
        })
    }

    fn resize_window(&self, handle: WindowHandle, w: i32, h: i32) -> Result<()> {
        self.note(format!("resize {handle} {w} {h}"));
        self.mutate(handle, |win| {
            win.rect.w = w;
            win.rect.h = h;
        })
    }
}

impl ScreenOps for MockWinOps {
    fn list_screens(&self) -> Result<Vec<Screen>> {
        Ok(self.screens.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> MockWinOps {
        let ops = MockWinOps::with_screen(1000, 800);
        ops.set_windows(vec![
            MockWindow::new(1, "alpha", 10, "mstsc.exe", Rect::new(0, 0, 100, 100)),
            MockWindow::new(2, "beta", 20, "notepad.exe", Rect::new(50, 50, 100, 100)),
        ]);
        ops
    }

    #[test]
    fn move_and_resize_update_geometry() {
        let ops = desktop();
        ops.move_window(WindowHandle(1), 30, 40).unwrap();
        ops.resize_window(WindowHandle(1), 300, 200).unwrap();
        assert_eq!(
            ops.window(WindowHandle(1)).unwrap().rect,
            Rect::new(30, 40, 300, 200)
        );
        assert_eq!(ops.calls_for(WindowHandle(1)).len(), 2);
        assert!(ops.calls_for(WindowHandle(2)).is_empty());
    }

    #[test]
    fn closed_and_denied_windows_fail() {
        let ops = desktop();
        ops.remove_window(WindowHandle(2));
        assert_eq!(
            ops.move_window(WindowHandle(2), 0, 0),
            Err(Error::WindowGone(WindowHandle(2)))
        );
        ops.fail_handle(WindowHandle(1));
        assert_eq!(
            ops.resize_window(WindowHandle(1), 1, 1),
            Err(Error::AccessDenied(WindowHandle(1)))
        );
    }

    #[test]
    fn handle_reuse_changes_owner() {
        let ops = desktop();
        assert_eq!(ops.window_pid(WindowHandle(1)).unwrap(), 10);
        ops.set_pid(WindowHandle(1), 99, "calc.exe");
        assert_eq!(ops.window_pid(WindowHandle(1)).unwrap(), 99);
        assert_eq!(ops.process_name(99).unwrap(), "calc.exe");
    }

    #[test]
    fn enumeration_failure_is_injectable() {
        let ops = desktop();
        ops.set_fail_list(true);
        assert!(matches!(ops.list_windows(), Err(Error::Enumerate(_))));
        ops.set_fail_list(false);
        assert_eq!(ops.list_windows().unwrap().len(), 2);
    }
}

//! What the monitor believes about arranged windows.

use std::{
    collections::{HashMap, HashSet},
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use winops::{Rect, WindowHandle};

use crate::WindowSnapshot;

/// Where one arranged window should be, and who owned it at the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedStateEntry {
    pub handle: WindowHandle,
    /// Rect the window was placed at.
    pub expected_rect: Rect,
    /// Process owning `handle` when the expectation was recorded. A live
    /// window under this handle with a different owner is a recycled handle.
    pub owner_process_id: u32,
    /// Title at placement time, for status messages.
    pub title: String,
}

/// Handle population captured at the last full layout.
pub type BaselineHandleSet = HashSet<WindowHandle>;

/// Expected placement for every arranged window, keyed by handle.
///
/// Replaced wholesale after each arrangement; entries only ever leave
/// individually.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedStateTable {
    entries: HashMap<WindowHandle, ExpectedStateEntry>,
}

impl ExpectedStateTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `windows` with their target `rects`; windows without a rect are
    /// left out.
    pub fn from_placement(windows: &[WindowSnapshot], rects: &[Rect]) -> Self {
        let entries = windows
            .iter()
            .zip(rects)
            .map(|(w, r)| {
                (
                    w.handle,
                    ExpectedStateEntry {
                        handle: w.handle,
                        expected_rect: *r,
                        owner_process_id: w.process_id,
                        title: w.title.clone(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Entry for `handle`, if tracked.
    pub fn get(&self, handle: WindowHandle) -> Option<&ExpectedStateEntry> {
        self.entries.get(&handle)
    }

    /// Stop tracking `handle`.
    pub fn remove(&mut self, handle: WindowHandle) -> Option<ExpectedStateEntry> {
        self.entries.remove(&handle)
    }

    /// Whether `handle` is tracked.
    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Number of tracked windows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked handles in ascending order.
    pub fn handles(&self) -> Vec<WindowHandle> {
        let mut v: Vec<_> = self.entries.keys().copied().collect();
        v.sort_unstable();
        v
    }
}

/// How the monitor reacts to the matched population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonitorMode {
    /// Re-lay out whenever the matched population changes.
    #[default]
    Template,
    /// Only hold previously arranged windows in place; ignore newcomers.
    Snapshot,
}

impl FromStr for MonitorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" => Ok(Self::Template),
            "snapshot" => Ok(Self::Snapshot),
            other => Err(format!("unknown monitor mode '{other}'")),
        }
    }
}

impl Display for MonitorMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Template => "template",
            Self::Snapshot => "snapshot",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_from_placement() {
        let snaps: Vec<_> = (1..=3)
            .map(|h| WindowSnapshot {
                handle: WindowHandle(h),
                title: format!("w{h}"),
                rect: Rect::default(),
                process_id: 40 + h as u32,
                process_name: "app".into(),
            })
            .collect();
        let rects = [Rect::new(0, 0, 10, 10), Rect::new(10, 0, 10, 10)];
        let mut t = ExpectedStateTable::from_placement(&snaps, &rects);
        assert_eq!(t.len(), 2);
        assert_eq!(t.handles(), vec![WindowHandle(1), WindowHandle(2)]);
        let e = t.get(WindowHandle(2)).unwrap();
        assert_eq!(e.expected_rect, rects[1]);
        assert_eq!(e.owner_process_id, 42);
        assert!(!t.contains(WindowHandle(3)));
        assert!(t.remove(WindowHandle(1)).is_some());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn mode_parses_and_renders() {
        assert_eq!("Snapshot".parse::<MonitorMode>(), Ok(MonitorMode::Snapshot));
        assert_eq!(" template ".parse::<MonitorMode>(), Ok(MonitorMode::Template));
        assert!("tiled".parse::<MonitorMode>().is_err());
        assert_eq!(MonitorMode::Snapshot.to_string(), "snapshot");
    }
}

//! Window discovery: enumerate top-level windows and keep the ones matching
//! a keyword filter.
//!
//! Inclusion rule: when both title and process keywords are given a window
//! must match both; when only one set is given only that set is checked;
//! when neither is given discovery refuses to run ([`Error::NoFilter`]).
//! Keywords match as case-insensitive substrings.

use std::collections::{BTreeSet, HashMap, HashSet};

use parking_lot::Mutex;
use tracing::{debug, trace};
use winops::{WinOps, WindowHandle};

use crate::{Error, Result, UNKNOWN_PROCESS, WindowSnapshot};

/// Keyword rules selecting candidate windows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowFilter {
    /// Case-insensitive substrings; any hit in the title includes a window.
    pub title_keywords: BTreeSet<String>,
    /// Same, matched against the owning process name.
    pub process_keywords: BTreeSet<String>,
    /// Any hit in the title excludes a window, overriding inclusion.
    pub exclude_title_keywords: BTreeSet<String>,
    /// Windows never considered, typically the host application's own.
    pub exclude_handles: HashSet<WindowHandle>,
}

impl WindowFilter {
    /// A filter with no keywords. Discovery rejects it until one is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a title keyword.
    pub fn with_title(mut self, keyword: impl Into<String>) -> Self {
        self.title_keywords.insert(keyword.into());
        self
    }

    /// Add a process keyword.
    pub fn with_process(mut self, keyword: impl Into<String>) -> Self {
        self.process_keywords.insert(keyword.into());
        self
    }

    /// Add a title exclusion.
    pub fn excluding_title(mut self, keyword: impl Into<String>) -> Self {
        self.exclude_title_keywords.insert(keyword.into());
        self
    }

    /// Never match `handle`.
    pub fn excluding_handle(mut self, handle: WindowHandle) -> Self {
        self.exclude_handles.insert(handle);
        self
    }

    /// True when no inclusion keywords are set.
    pub fn is_empty(&self) -> bool {
        normalized(&self.title_keywords).is_empty() && normalized(&self.process_keywords).is_empty()
    }

    /// Lowercased, non-blank keyword sets ready for matching.
    fn compile(&self) -> Result<Compiled> {
        let compiled = Compiled {
            title: normalized(&self.title_keywords),
            process: normalized(&self.process_keywords),
            exclude: normalized(&self.exclude_title_keywords),
        };
        if compiled.title.is_empty() && compiled.process.is_empty() {
            return Err(Error::NoFilter);
        }
        Ok(compiled)
    }
}

/// Keywords after normalization.
struct Compiled {
    title: Vec<String>,
    process: Vec<String>,
    exclude: Vec<String>,
}

impl Compiled {
    fn excluded(&self, title: &str) -> bool {
        contains_any(title, &self.exclude)
    }

    fn included(&self, title: &str, process: &str) -> bool {
        let title_ok = contains_any(title, &self.title);
        let process_ok = contains_any(process, &self.process);
        match (self.title.is_empty(), self.process.is_empty()) {
            (false, false) => title_ok && process_ok,
            (false, true) => title_ok,
            (true, false) => process_ok,
            (true, true) => false,
        }
    }
}

fn normalized(set: &BTreeSet<String>) -> Vec<String> {
    set.iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let hay = haystack.to_lowercase();
    needles.iter().any(|n| hay.contains(n.as_str()))
}

/// Explicitly owned `pid → process name` cache.
///
/// Only successful lookups are cached. Callers clear it at the start of each
/// manual detection, arrangement and monitor start.
#[derive(Debug, Default)]
pub struct ProcessNameCache {
    names: Mutex<HashMap<u32, String>>,
}

impl ProcessNameCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached name for `pid`, resolving through `ops` on a miss.
    pub fn get_or_resolve(&self, ops: &dyn WinOps, pid: u32) -> String {
        if let Some(name) = self.names.lock().get(&pid) {
            return name.clone();
        }
        match ops.process_name(pid) {
            Ok(name) => {
                self.names.lock().insert(pid, name.clone());
                name
            }
            Err(e) => {
                debug!(pid, error = %e, "process name lookup failed");
                UNKNOWN_PROCESS.to_string()
            }
        }
    }

    /// Forget every cached name.
    pub fn clear(&self) {
        self.names.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.names.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Enumerate windows through `ops` and return the ones `filter` selects,
/// in enumeration order.
pub fn discover(
    ops: &dyn WinOps,
    filter: &WindowFilter,
    names: &ProcessNameCache,
) -> Result<Vec<WindowSnapshot>> {
    let rules = filter.compile()?;
    let windows = ops.list_windows().map_err(Error::Discovery)?;
    let total = windows.len();

    let mut out = Vec::new();
    for w in windows {
        if !w.visible || w.minimized || filter.exclude_handles.contains(&w.handle) {
            continue;
        }
        if rules.excluded(&w.title) {
            trace!(handle = %w.handle, title = %w.title, "excluded by title");
            continue;
        }
        let pid = match ops.window_pid(w.handle) {
            Ok(pid) => pid,
            Err(e) => {
                debug!(handle = %w.handle, error = %e, "owner pid unavailable; skipping");
                continue;
            }
        };
        let process_name = names.get_or_resolve(ops, pid);
        if !rules.included(&w.title, &process_name) {
            continue;
        }
        out.push(WindowSnapshot {
            handle: w.handle,
            title: w.title,
            rect: w.rect,
            process_id: pid,
            process_name,
        });
    }
    debug!(total, matched = out.len(), "discovery");
    Ok(out)
}

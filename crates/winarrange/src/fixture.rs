//! Desktop fixtures: a RON description of screens, windows and timed
//! changes, loaded into a [`MockWinOps`].

use std::{fs, path::Path, result, time::Duration};

use ron::{Options, extensions::Extensions};
use serde::Deserialize;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};
use winops::{MockWinOps, MockWindow, Rect, Screen, WindowHandle};

use crate::error::{Error, Result};

/// A scripted change to the desktop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum Action {
    /// The user drags or resizes a window.
    Drag { handle: WindowHandle, rect: Rect },
    /// A window closes.
    Close(WindowHandle),
    /// A new window appears.
    Open(MockWindow),
    /// The OS gives `handle` to a window of another process.
    Reuse {
        handle: WindowHandle,
        pid: u32,
        process: String,
    },
    /// A window is minimized.
    Minimize(WindowHandle),
}

impl Action {
    /// Apply this change to `ops`.
    pub fn apply(&self, ops: &MockWinOps) {
        match self {
            Self::Drag { handle, rect } => ops.set_rect(*handle, *rect),
            Self::Close(handle) => ops.remove_window(*handle),
            Self::Open(win) => ops.add_window(win.clone()),
            Self::Reuse {
                handle,
                pid,
                process,
            } => ops.set_pid(*handle, *pid, process),
            Self::Minimize(handle) => ops.set_minimized(*handle, true),
        }
    }
}

/// One timed change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Step {
    /// Milliseconds after monitoring starts.
    pub after_ms: u64,
    pub action: Action,
}

/// Screens, windows and an optional script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DesktopFixture {
    pub screens: Vec<Screen>,
    pub windows: Vec<MockWindow>,
    #[serde(default)]
    pub script: Vec<Step>,
}

impl DesktopFixture {
    /// Parse fixture text. `Option` fields may omit `Some(..)`.
    pub fn parse(text: &str) -> result::Result<Self, String> {
        Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(text)
            .map_err(|e| e.to_string())
    }

    /// Read and parse a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        let fail = |message: String| Error::Fixture {
            path: path.to_path_buf(),
            message,
        };
        let text = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let fixture = Self::parse(&text).map_err(fail)?;
        if fixture.screens.is_empty() {
            return Err(fail("at least one screen is required".into()));
        }
        debug!(
            screens = fixture.screens.len(),
            windows = fixture.windows.len(),
            steps = fixture.script.len(),
            "fixture loaded"
        );
        Ok(fixture)
    }

    /// A mock desktop holding this fixture's screens and windows.
    pub fn desktop(&self) -> MockWinOps {
        let ops = MockWinOps::new();
        ops.set_screens(self.screens.clone());
        ops.set_windows(self.windows.clone());
        ops
    }
}

/// Play `script` against `ops`, timed from now. Steps run in `after_ms`
/// order.
pub async fn play(ops: MockWinOps, mut script: Vec<Step>) {
    script.sort_by_key(|s| s.after_ms);
    let start = Instant::now();
    for step in script {
        sleep_until(start + Duration::from_millis(step.after_ms)).await;
        info!(after_ms = step.after_ms, action = ?step.action, "script");
        step.action.apply(&ops);
    }
}

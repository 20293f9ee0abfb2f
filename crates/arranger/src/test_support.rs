//! Test support utilities for arranger unit and integration tests.
//! These helpers are public so the `tests/` suite can share them.

use std::{sync::Arc, time::Duration};

use tokio::{sync::broadcast, time::timeout};
use winops::{MockWinOps, MockWindow, Rect};

use crate::{Arranger, StatusEvent, WindowFilter};

/// Process name used by [`rdp_desktop`] windows.
pub const RDP_PROCESS: &str = "mstsc.exe";

/// A 1000x700 mock desktop with `n` remote-desktop windows (handles `1..=n`,
/// pids `100 + handle`) stacked at the origin.
pub fn rdp_desktop(n: u64) -> MockWinOps {
    let ops = MockWinOps::with_screen(1000, 700);
    for h in 1..=n {
        ops.add_window(rdp_window(h));
    }
    ops
}

/// One remote-desktop window as used by [`rdp_desktop`].
pub fn rdp_window(handle: u64) -> MockWindow {
    MockWindow::new(
        handle,
        &format!("10.0.0.{handle} - Remote Desktop Connection"),
        100 + handle as u32,
        RDP_PROCESS,
        Rect::new(0, 0, 640, 480),
    )
}

/// Filter matching [`rdp_desktop`] windows.
pub fn rdp_filter() -> WindowFilter {
    WindowFilter::new()
        .with_title("remote desktop")
        .with_process("mstsc")
}

/// An [`Arranger`] driving `ops` for both windows and screens.
pub fn arranger_for(ops: &MockWinOps) -> Arranger {
    let shared = Arc::new(ops.clone());
    Arranger::new(shared.clone(), shared)
}

/// Receive events until one satisfies `pred` or `within` elapses.
pub async fn recv_until<F>(
    rx: &mut broadcast::Receiver<StatusEvent>,
    within: Duration,
    mut pred: F,
) -> Option<StatusEvent>
where
    F: FnMut(&StatusEvent) -> bool,
{
    timeout(within, async {
        loop {
            match rx.recv().await {
                Ok(ev) if pred(&ev) => return Some(ev),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}

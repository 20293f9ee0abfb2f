//! Apply target rectangles to live windows.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use winops::{Rect, WinOps, WindowHandle};

use crate::WindowSnapshot;

/// Restore `handle` if minimized, then move and resize it to `rect`.
pub fn apply_one(ops: &dyn WinOps, handle: WindowHandle, rect: Rect) -> winops::Result<()> {
    if ops.is_minimized(handle)? {
        ops.restore(handle)?;
    }
    ops.move_window(handle, rect.x, rect.y)?;
    ops.resize_window(handle, rect.w, rect.h)?;
    Ok(())
}

/// Apply `rects[i]` to `windows[i]` in order and return how many succeeded.
///
/// Failures are logged per window and never abort the batch. When `delay` is
/// non-zero the applier pauses between windows; cancelling `cancel` during a
/// pause skips the remaining windows.
pub async fn apply(
    ops: &dyn WinOps,
    windows: &[WindowSnapshot],
    rects: &[Rect],
    delay: Duration,
    cancel: &CancellationToken,
) -> usize {
    let mut applied = 0;
    for (i, (w, rect)) in windows.iter().zip(rects).enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(applied, remaining = rects.len().min(windows.len()) - i, "apply cancelled");
                    return applied;
                }
                _ = sleep(delay) => {}
            }
        }
        match apply_one(ops, w.handle, *rect) {
            Ok(()) => {
                applied += 1;
                debug!(handle = %w.handle, title = %w.title, %rect, "placed");
            }
            Err(e) => warn!(handle = %w.handle, title = %w.title, error = %e, "failed to place window"),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;
    use winops::{MockWinOps, MockWindow};

    use super::*;

    fn setup(n: u64) -> (MockWinOps, Vec<WindowSnapshot>, Vec<Rect>) {
        let ops = MockWinOps::with_screen(1000, 800);
        let mut snaps = Vec::new();
        let mut rects = Vec::new();
        for h in 1..=n {
            let r = Rect::new(0, 0, 50, 50);
            ops.add_window(MockWindow::new(h, &format!("win {h}"), h as u32, "app", r));
            snaps.push(WindowSnapshot {
                handle: WindowHandle(h),
                title: format!("win {h}"),
                rect: r,
                process_id: h as u32,
                process_name: "app".into(),
            });
            rects.push(Rect::new(h as i32 * 100, 10, 200, 150));
        }
        (ops, snaps, rects)
    }

    #[test]
    fn apply_one_restores_then_moves_then_resizes() {
        let (ops, _, _) = setup(1);
        ops.set_minimized(WindowHandle(1), true);
        apply_one(&ops, WindowHandle(1), Rect::new(5, 6, 7, 8)).unwrap();
        assert_eq!(
            ops.calls(),
            vec!["restore 0x1", "move 0x1 5 6", "resize 0x1 7 8"]
        );
        let w = ops.window(WindowHandle(1)).unwrap();
        assert!(!w.minimized);
        assert_eq!(w.rect, Rect::new(5, 6, 7, 8));
    }

    #[tokio::test]
    async fn failures_are_isolated() {
        let (ops, snaps, rects) = setup(3);
        ops.fail_handle(WindowHandle(2));
        let n = apply(&ops, &snaps, &rects, Duration::ZERO, &CancellationToken::new()).await;
        assert_eq!(n, 2);
        assert_eq!(ops.window(WindowHandle(3)).unwrap().rect, rects[2]);
        assert_eq!(ops.window(WindowHandle(2)).unwrap().rect, snaps[1].rect);
    }

    #[tokio::test]
    async fn closed_window_is_skipped() {
        let (ops, snaps, rects) = setup(2);
        ops.remove_window(WindowHandle(1));
        let n = apply(&ops, &snaps, &rects, Duration::ZERO, &CancellationToken::new()).await;
        assert_eq!(n, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_spaces_windows() {
        let (ops, snaps, rects) = setup(3);
        let start = Instant::now();
        let n = apply(&ops, &snaps, &rects, Duration::from_millis(250), &CancellationToken::new()).await;
        assert_eq!(n, 3);
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_delayed_batch() {
        let (ops, snaps, rects) = setup(4);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(1500)).await;
            trigger.cancel();
        });
        let n = apply(&ops, &snaps, &rects, Duration::from_secs(1), &cancel).await;
        assert_eq!(n, 2);
        assert!(ops.calls_for(WindowHandle(3)).is_empty());
        assert!(ops.calls_for(WindowHandle(4)).is_empty());
    }
}

use std::{iter, sync::Arc, time::Duration};

use arranger::{
    Error, GridSpec, MonitorMode, NotifyLevel, NotifyPolicy, StatusEvent, STOP_WAIT_TIMEOUT,
    test_support::{arranger_for, rdp_desktop, rdp_filter, rdp_window, recv_until},
};
use parking_lot::Mutex;
use tokio::time::{Instant, sleep};
use winops::{Rect, WindowHandle};

const INTERVAL: Duration = Duration::from_secs(1);

/// Comfortably longer than one poll interval.
const WITHIN: Duration = Duration::from_millis(1500);

fn is_corrected(ev: &StatusEvent) -> bool {
    matches!(ev, StatusEvent::Corrected { .. })
}

#[tokio::test(start_paused = true)]
async fn drag_is_corrected_within_one_interval() {
    let ops = rdp_desktop(2);
    let arr = arranger_for(&ops);
    assert_eq!(
        arr.arrange_grid(rdp_filter(), GridSpec::new(1, 2))
            .await
            .unwrap(),
        2
    );
    let expected = ops.window(WindowHandle(1)).unwrap().rect;
    arr.start_monitor(MonitorMode::Template, INTERVAL)
        .await
        .unwrap();
    assert!(arr.is_monitoring().await);

    let mut rx = arr.subscribe();
    ops.set_rect(
        WindowHandle(1),
        Rect {
            x: expected.x + 50,
            ..expected
        },
    );
    let ev = recv_until(&mut rx, WITHIN, is_corrected).await;
    assert!(matches!(
        ev,
        Some(StatusEvent::Corrected { handle, .. }) if handle == WindowHandle(1)
    ));
    assert_eq!(ops.window(WindowHandle(1)).unwrap().rect, expected);
    assert_eq!(ops.calls_for(WindowHandle(2)).len(), 2);

    arr.shutdown().await;
}

#[tokio::test]
async fn nothing_to_monitor_is_rejected() {
    let arr = arranger_for(&rdp_desktop(2));
    assert!(matches!(
        arr.start_monitor(MonitorMode::Template, INTERVAL).await,
        Err(Error::NothingToMonitor)
    ));
    assert!(!arr.is_monitoring().await);
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let ops = rdp_desktop(1);
    let arr = arranger_for(&ops);
    arr.arrange_grid(rdp_filter(), GridSpec::new(1, 1))
        .await
        .unwrap();
    assert!(matches!(
        arr.start_monitor(MonitorMode::Snapshot, Duration::ZERO)
            .await,
        Err(Error::InvalidInterval)
    ));
}

#[tokio::test(start_paused = true)]
async fn stop_is_prompt_and_reported() {
    let ops = rdp_desktop(2);
    let arr = arranger_for(&ops);
    arr.arrange_grid(rdp_filter(), GridSpec::new(1, 2))
        .await
        .unwrap();
    arr.start_monitor(MonitorMode::Template, Duration::from_secs(30))
        .await
        .unwrap();
    let mut rx = arr.subscribe();

    let start = Instant::now();
    assert!(arr.stop_monitor().await);
    assert!(start.elapsed() < STOP_WAIT_TIMEOUT);
    assert!(!arr.is_monitoring().await);
    assert_eq!(rx.try_recv().unwrap(), StatusEvent::MonitorStopped);
    assert!(!arr.stop_monitor().await);

    // Nothing polls once stopped.
    ops.set_rect(WindowHandle(1), Rect::new(300, 300, 10, 10));
    ops.clear_calls();
    sleep(Duration::from_secs(90)).await;
    assert!(ops.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failing_and_panicking_polls_do_not_kill_the_loop() {
    let ops = rdp_desktop(2);
    let arr = arranger_for(&ops);
    arr.arrange_grid(rdp_filter(), GridSpec::new(1, 2))
        .await
        .unwrap();
    arr.start_monitor(MonitorMode::Template, INTERVAL)
        .await
        .unwrap();
    let mut rx = arr.subscribe();

    ops.set_fail_list(true);
    let failed = recv_until(&mut rx, WITHIN, |e| {
        matches!(e, StatusEvent::PollFailed(_))
    })
    .await;
    assert!(failed.is_some());
    ops.set_fail_list(false);

    ops.set_panic_list(true);
    let panicked = recv_until(&mut rx, WITHIN, |e| {
        matches!(e, StatusEvent::PollFailed(m) if m.starts_with("panic"))
    })
    .await;
    assert!(panicked.is_some());
    ops.set_panic_list(false);
    assert!(arr.is_monitoring().await);

    ops.set_rect(WindowHandle(2), Rect::new(0, 0, 10, 10));
    assert!(recv_until(&mut rx, WITHIN, is_corrected).await.is_some());
    arr.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn reused_handle_is_never_moved() {
    let ops = rdp_desktop(2);
    let arr = arranger_for(&ops);
    arr.arrange_grid(rdp_filter(), GridSpec::new(1, 2))
        .await
        .unwrap();
    arr.start_monitor(MonitorMode::Snapshot, INTERVAL)
        .await
        .unwrap();
    let mut rx = arr.subscribe();

    // Window 1 closes and the OS hands its handle to another process's window.
    ops.set_pid(WindowHandle(1), 4242, "mstsc.exe");
    ops.set_rect(WindowHandle(1), Rect::new(200, 200, 300, 300));
    ops.clear_calls();

    let ev = recv_until(&mut rx, WITHIN, |e| {
        matches!(e, StatusEvent::HandleReused { .. })
    })
    .await
    .unwrap();
    assert_eq!(ev.level(), NotifyLevel::Warn);
    assert!(matches!(
        ev,
        StatusEvent::HandleReused {
            expected_pid: 101,
            actual_pid: 4242,
            ..
        }
    ));
    assert_eq!(arr.expected_len().await, 1);

    sleep(INTERVAL * 3).await;
    assert!(ops.calls_for(WindowHandle(1)).is_empty());
    assert_eq!(
        ops.window(WindowHandle(1)).unwrap().rect,
        Rect::new(200, 200, 300, 300)
    );
    arr.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn template_mode_never_moves_a_reused_handle() {
    let ops = rdp_desktop(2);
    let arr = arranger_for(&ops);
    arr.arrange_grid(rdp_filter(), GridSpec::new(1, 2))
        .await
        .unwrap();
    arr.start_monitor(MonitorMode::Template, INTERVAL)
        .await
        .unwrap();
    let mut rx = arr.subscribe();

    ops.set_pid(WindowHandle(1), 4242, "mstsc.exe");
    ops.set_rect(WindowHandle(1), Rect::new(200, 200, 300, 300));
    ops.clear_calls();

    let reused = recv_until(&mut rx, WITHIN, |e| {
        matches!(e, StatusEvent::HandleReused { .. })
    })
    .await;
    assert!(reused.is_some());
    let relayout = recv_until(&mut rx, WITHIN, |e| {
        matches!(e, StatusEvent::Relayout { .. })
    })
    .await;
    assert_eq!(
        relayout,
        Some(StatusEvent::Relayout {
            applied: 1,
            total: 1
        })
    );

    sleep(INTERVAL * 3).await;
    assert!(ops.calls_for(WindowHandle(1)).is_empty());
    assert_eq!(
        ops.window(WindowHandle(1)).unwrap().rect,
        Rect::new(200, 200, 300, 300)
    );
    assert_eq!(
        ops.window(WindowHandle(2)).unwrap().rect,
        Rect::new(0, 0, 495, 700)
    );
    arr.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn dropping_the_arranger_stops_its_monitor() {
    let ops = rdp_desktop(2);
    let arr = arranger_for(&ops);
    arr.arrange_grid(rdp_filter(), GridSpec::new(1, 2))
        .await
        .unwrap();
    arr.start_monitor(MonitorMode::Template, INTERVAL)
        .await
        .unwrap();
    drop(arr);

    ops.clear_calls();
    ops.set_rect(WindowHandle(1), Rect::new(300, 300, 10, 10));
    sleep(INTERVAL * 3).await;
    assert!(ops.calls().is_empty());
}

#[tokio::test]
async fn shut_down_arranger_refuses_work() {
    let ops = rdp_desktop(2);
    let arr = arranger_for(&ops);
    arr.arrange_grid(rdp_filter(), GridSpec::new(1, 2))
        .await
        .unwrap();
    arr.shutdown().await;
    assert!(arr.is_shut_down());
    let mut rx = arr.subscribe();

    assert!(matches!(
        arr.start_monitor(MonitorMode::Template, INTERVAL).await,
        Err(Error::ShutDown)
    ));
    assert!(matches!(
        arr.arrange_grid(rdp_filter(), GridSpec::new(1, 2)).await,
        Err(Error::ShutDown)
    ));
    assert!(!arr.is_monitoring().await);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn template_relayouts_once_per_population_change() {
    let ops = rdp_desktop(2);
    let arr = arranger_for(&ops);
    arr.arrange_grid(rdp_filter(), GridSpec::new(2, 2))
        .await
        .unwrap();
    arr.start_monitor(MonitorMode::Template, INTERVAL)
        .await
        .unwrap();
    let mut rx = arr.subscribe();

    ops.add_window(rdp_window(3));
    let ev = recv_until(&mut rx, WITHIN, |e| {
        matches!(e, StatusEvent::Relayout { .. })
    })
    .await;
    assert_eq!(
        ev,
        Some(StatusEvent::Relayout {
            applied: 3,
            total: 3
        })
    );
    assert_eq!(arr.expected_len().await, 3);
    assert_eq!(
        ops.window(WindowHandle(3)).unwrap().rect,
        Rect::new(0, 355, 495, 345)
    );

    let again = recv_until(&mut rx, INTERVAL * 5, |e| {
        matches!(e, StatusEvent::Relayout { .. })
    })
    .await;
    assert!(again.is_none());

    ops.remove_window(WindowHandle(1));
    let shrunk = recv_until(&mut rx, WITHIN, |e| {
        matches!(e, StatusEvent::Relayout { .. })
    })
    .await;
    assert_eq!(
        shrunk,
        Some(StatusEvent::Relayout {
            applied: 2,
            total: 2
        })
    );
    arr.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn snapshot_leaves_newcomers_alone() {
    let ops = rdp_desktop(2);
    let arr = arranger_for(&ops);
    arr.arrange_grid(rdp_filter(), GridSpec::new(2, 2))
        .await
        .unwrap();
    arr.start_monitor(MonitorMode::Snapshot, INTERVAL)
        .await
        .unwrap();
    let mut rx = arr.subscribe();

    ops.add_window(rdp_window(3));
    ops.remove_window(WindowHandle(2));
    let closed = recv_until(&mut rx, WITHIN, |e| {
        matches!(e, StatusEvent::WindowClosed { .. })
    })
    .await;
    assert!(closed.is_some());

    sleep(INTERVAL * 5).await;
    assert!(ops.calls_for(WindowHandle(3)).is_empty());
    assert_eq!(arr.expected_len().await, 1);
    arr.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn mode_switch_and_disable() {
    let ops = rdp_desktop(2);
    let arr = arranger_for(&ops);
    arr.arrange_grid(rdp_filter(), GridSpec::new(1, 2))
        .await
        .unwrap();
    let mut rx = arr.subscribe();

    arr.set_monitoring(true, MonitorMode::Template, INTERVAL)
        .await
        .unwrap();
    assert!(matches!(
        rx.try_recv().unwrap(),
        StatusEvent::MonitorStarted {
            mode: MonitorMode::Template,
            ..
        }
    ));

    // Same settings: no restart.
    arr.set_monitoring(true, MonitorMode::Template, INTERVAL)
        .await
        .unwrap();
    assert!(rx.try_recv().is_err());

    arr.set_monitoring(true, MonitorMode::Snapshot, INTERVAL)
        .await
        .unwrap();
    assert_eq!(arr.monitor_mode().await, Some(MonitorMode::Snapshot));
    let events: Vec<_> = iter::from_fn(|| rx.try_recv().ok()).collect();
    assert!(events.contains(&StatusEvent::ModeChanged(MonitorMode::Snapshot)));

    arr.set_monitoring(false, MonitorMode::Snapshot, INTERVAL)
        .await
        .unwrap();
    assert!(!arr.is_monitoring().await);
    assert_eq!(rx.try_recv().unwrap(), StatusEvent::MonitorStopped);
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<String>>,
}

impl arranger::Notifier for Recorder {
    fn show(
        &self,
        title: &str,
        _message: &str,
        _level: NotifyLevel,
    ) -> Result<(), arranger::NotifyError> {
        self.seen.lock().push(title.to_string());
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn corrections_reach_notifier_when_enabled() {
    let ops = rdp_desktop(2);
    let rec = Arc::new(Recorder::default());
    let policy = NotifyPolicy {
        corrections: true,
        hazards: true,
    };
    let arr = arranger_for(&ops).with_notifier(rec.clone(), policy);
    arr.arrange_grid(rdp_filter(), GridSpec::new(1, 2))
        .await
        .unwrap();
    arr.start_monitor(MonitorMode::Template, INTERVAL)
        .await
        .unwrap();
    let mut rx = arr.subscribe();
    ops.set_rect(WindowHandle(2), Rect::new(1, 1, 1, 1));
    assert!(recv_until(&mut rx, WITHIN, is_corrected).await.is_some());
    assert_eq!(*rec.seen.lock(), vec!["Window corrected".to_string()]);
    arr.shutdown().await;
}

//! Subcommand implementations.

use std::{sync::Arc, time::Duration};

use arranger::{
    ArrangeReport, ArrangeRequest, Arranger, LayoutSpec, LogNotifier, MonitorMode, NotifyPolicy,
    StatusEvent,
};
use config::{ArrangeSettings, FilterSettings, RonStore};
use tokio::{
    pin, select,
    sync::broadcast::{Receiver, error::RecvError},
    time::sleep,
};
use tracing::{debug, info, warn};
use winops::MockWinOps;

use crate::{
    cli::{ArrangeArgs, CascadeArgs, CommonArgs, FilterArgs, LayoutCmd, MonitorArgs},
    effective,
    error::Result,
    fixture::{self, Step},
};

/// Everything a command needs: the desktop, the arranger driving it and the
/// settings it was configured from.
pub struct Session {
    /// Desktop the arranger acts on.
    pub ops: MockWinOps,
    /// Arranger bound to `ops`.
    pub arranger: Arranger,
    /// Settings as loaded.
    pub settings: ArrangeSettings,
    /// Backing store for `--save`.
    pub store: RonStore,
}

impl Session {
    /// Bind an arranger to `ops`, with notifications following `settings`.
    pub fn new(
        ops: MockWinOps,
        store: RonStore,
        settings: ArrangeSettings,
        tolerance: i32,
    ) -> Self {
        let shared = Arc::new(ops.clone());
        let policy = NotifyPolicy {
            corrections: settings.notify.corrections,
            hazards: settings.notify.hazards,
        };
        let arranger = Arranger::new(shared.clone(), shared)
            .with_notifier(Arc::new(LogNotifier), policy)
            .with_tolerance(tolerance);
        Self {
            ops,
            arranger,
            settings,
            store,
        }
    }

    /// Fold `req` into the settings and write them to disk.
    fn save(&mut self, keywords: &FilterSettings, req: &ArrangeRequest) -> Result<()> {
        effective::record(&mut self.settings, keywords, req);
        self.settings.save(&mut self.store)?;
        self.store.save()?;
        info!(path = %self.store.path().display(), "settings saved");
        Ok(())
    }

    /// Build the effective request for `layout`, saving it when asked.
    fn prepare(&mut self, common: &CommonArgs, layout: LayoutSpec) -> Result<ArrangeRequest> {
        let keywords = effective::keywords(&common.filter, &self.settings.filter);
        let req = effective::request(&keywords, layout, common, &self.settings);
        if common.save {
            self.save(&keywords, &req)?;
        }
        Ok(req)
    }
}

/// List matching windows, one per line.
pub fn detect(session: &Session, args: &FilterArgs) -> Result<()> {
    let keywords = effective::keywords(args, &session.settings.filter);
    let windows = session.arranger.detect(&effective::filter(&keywords))?;
    for w in &windows {
        println!(
            "{:>8}  pid {:<6} {:<16} {}  {}",
            w.handle, w.process_id, w.process_name, w.rect, w.title
        );
    }
    println!("{} window(s)", windows.len());
    Ok(())
}

/// Arrange matching windows once. When the settings enable the monitor,
/// keep them in place for `args.monitor_for` while playing the fixture
/// script.
pub async fn arrange(session: &mut Session, args: &ArrangeArgs, script: Vec<Step>) -> Result<()> {
    let req = match &args.layout {
        LayoutCmd::Grid(g) => {
            let spec = effective::grid_spec(g, &session.settings.grid);
            session.prepare(&g.common, LayoutSpec::Grid(spec))?
        }
        LayoutCmd::Cascade(c) => {
            let spec = effective::cascade_spec(c, &session.settings.cascade);
            session.prepare(&c.common, LayoutSpec::Cascade(spec))?
        }
    };
    let kind = req.layout.kind();
    let report = match session.arranger.arrange(req).await {
        Ok(report) => report,
        Err(e) => {
            session.arranger.shutdown().await;
            return Err(e.into());
        }
    };
    print_report(kind, &report);

    match effective::follow_up(&session.settings.monitor) {
        Some((mode, interval)) => hold(session, mode, interval, args.monitor_for, script).await,
        None => {
            session.arranger.shutdown().await;
            Ok(())
        }
    }
}

/// Arrange, monitor for `args.run_for` while playing the fixture script,
/// then stop.
pub async fn monitor(session: &mut Session, args: &MonitorArgs, script: Vec<Step>) -> Result<()> {
    let layout = if args.cascade {
        LayoutSpec::Cascade(effective::cascade_spec(
            &CascadeArgs::default(),
            &session.settings.cascade,
        ))
    } else {
        LayoutSpec::Grid(effective::grid_spec(&args.grid, &session.settings.grid))
    };
    let req = session.prepare(&args.grid.common, layout)?;
    let mode = effective::monitor_mode(args.mode, session.settings.monitor.mode);
    let interval = effective::interval(args.interval, session.settings.monitor.interval_ms);

    let kind = req.layout.kind();
    let report = session.arranger.arrange(req).await?;
    print_report(kind, &report);
    hold(session, mode, interval, args.run_for, script).await
}

/// Run the monitor for `run_for`, printing status events and playing
/// `script` against the desktop, then shut the arranger down.
async fn hold(
    session: &Session,
    mode: MonitorMode,
    interval: Duration,
    run_for: Duration,
    script: Vec<Step>,
) -> Result<()> {
    let mut rx = session.arranger.subscribe();
    session.arranger.start_monitor(mode, interval).await?;
    let player = tokio::spawn(fixture::play(session.ops.clone(), script));
    info!(%mode, ?interval, ?run_for, "monitoring");

    watch(&mut rx, run_for).await;
    session.arranger.shutdown().await;
    while let Ok(ev) = rx.try_recv() {
        println!("{ev}");
    }
    player.abort();
    Ok(())
}

/// Print status events until `run_for` elapses.
async fn watch(rx: &mut Receiver<StatusEvent>, run_for: Duration) {
    let deadline = sleep(run_for);
    pin!(deadline);
    loop {
        select! {
            _ = &mut deadline => break,
            ev = rx.recv() => match ev {
                Ok(ev) => println!("{ev}"),
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "status events dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    debug!("watch finished");
}

/// One-line summary of an arrangement.
fn print_report(kind: &str, report: &ArrangeReport) {
    println!(
        "{kind}: arranged {}/{} window(s)",
        report.applied, report.matched
    );
    if report.overflow > 0 {
        println!(
            "{} window(s) did not fit and were left in place",
            report.overflow
        );
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use arranger::DEFAULT_TOLERANCE;
    use tokio::time::Instant;
    use winops::{MockWindow, Rect, WindowHandle};

    use super::*;
    use crate::{cli::GridArgs, error::Error, fixture::Action};

    fn session(dir: &Path) -> Session {
        let ops = MockWinOps::with_screen(1000, 700);
        for h in 1..=2u32 {
            ops.add_window(MockWindow::new(
                u64::from(h),
                &format!("host {h} - Remote Desktop"),
                100 + h,
                "mstsc.exe",
                Rect::default(),
            ));
        }
        let store = RonStore::load(&dir.join("settings.ron")).unwrap();
        Session::new(ops, store, ArrangeSettings::default(), DEFAULT_TOLERANCE)
    }

    fn once(layout: LayoutCmd) -> ArrangeArgs {
        ArrangeArgs {
            monitor_for: Duration::from_secs(3),
            layout,
        }
    }

    fn remote_grid() -> LayoutCmd {
        LayoutCmd::Grid(GridArgs {
            common: CommonArgs {
                filter: FilterArgs {
                    title: vec!["remote desktop".into()],
                    ..FilterArgs::default()
                },
                ..CommonArgs::default()
            },
            rows: Some(1),
            ..GridArgs::default()
        })
    }

    #[test]
    fn detect_needs_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(dir.path());
        assert!(matches!(
            detect(&s, &FilterArgs::default()),
            Err(Error::Arrange(arranger::Error::NoFilter))
        ));
    }

    #[tokio::test]
    async fn arrange_saves_effective_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        let grid = GridArgs {
            common: CommonArgs {
                filter: FilterArgs {
                    title: vec!["remote desktop".into()],
                    ..FilterArgs::default()
                },
                save: true,
                ..CommonArgs::default()
            },
            rows: Some(1),
            ..GridArgs::default()
        };
        arrange(&mut s, &once(LayoutCmd::Grid(grid)), Vec::new())
            .await
            .unwrap();
        assert_eq!(
            s.ops.window(WindowHandle(2)).unwrap().rect,
            Rect::new(505, 0, 495, 700)
        );

        let store = RonStore::load(&dir.path().join("settings.ron")).unwrap();
        let back = ArrangeSettings::load(&store).unwrap();
        assert_eq!(back.grid.rows, 1);
        assert_eq!(back.filter.title, vec!["remote desktop".to_string()]);
    }

    #[tokio::test]
    async fn arrange_without_save_leaves_settings_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        let grid = GridArgs {
            common: CommonArgs {
                filter: FilterArgs {
                    process: vec!["mstsc".into()],
                    ..FilterArgs::default()
                },
                ..CommonArgs::default()
            },
            ..GridArgs::default()
        };
        arrange(&mut s, &once(LayoutCmd::Grid(grid)), Vec::new())
            .await
            .unwrap();
        assert!(!dir.path().join("settings.ron").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn arrange_holds_windows_when_monitor_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        s.settings.monitor.enabled = true;
        s.settings.monitor.interval_ms = 1000;
        let script = vec![Step {
            after_ms: 1500,
            action: Action::Drag {
                handle: WindowHandle(1),
                rect: Rect::new(400, 300, 200, 200),
            },
        }];

        let start = Instant::now();
        arrange(&mut s, &once(remote_grid()), script).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(
            s.ops.window(WindowHandle(1)).unwrap().rect,
            Rect::new(0, 0, 495, 700)
        );
        assert!(s.arranger.is_shut_down());
        assert!(!s.arranger.is_monitoring().await);
    }

    #[tokio::test(start_paused = true)]
    async fn arrange_returns_at_once_when_monitor_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(dir.path());
        let start = Instant::now();
        arrange(&mut s, &once(remote_grid()), Vec::new())
            .await
            .unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(s.arranger.is_shut_down());
    }
}

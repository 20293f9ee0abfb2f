//! Arrangement state and the reconciliation poll.
//!
//! [`ArrangeState`] owns the last request, the expected table and the
//! baseline population. A manual arrangement replaces all three; each
//! monitor poll compares live windows against them and repairs drift.
//!
//! The per-window check always verifies the owning process before touching a
//! window: a handle whose owner changed has been recycled by the OS, and
//! moving it would move somebody else's window. Such handles are
//! quarantined: tracking stops, and later re-layouts skip them until the
//! foreign window disappears.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use winops::{Screen, WinOps, WindowHandle};

use crate::{
    BaselineHandleSet, Error, ExpectedStateTable, MonitorMode, NotificationDispatcher,
    ProcessNameCache, Result, SortRegistry, StatusEvent, WindowFilter, WindowSnapshot,
    apply::{apply, apply_one},
    discovery::discover,
    layout::{LayoutSpec, compute},
};

/// Default per-component drift tolerance in pixels.
pub const DEFAULT_TOLERANCE: i32 = 2;

/// Everything needed to repeat an arrangement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrangeRequest {
    /// Which windows take part.
    pub filter: WindowFilter,
    pub layout: LayoutSpec,
    /// Registered sort strategy name.
    pub sort: String,
    /// Pause between consecutive windows.
    pub delay: Duration,
}

impl ArrangeRequest {
    /// Request sorted by title with no delay.
    pub fn new(filter: WindowFilter, layout: LayoutSpec) -> Self {
        Self {
            filter,
            layout,
            sort: SortRegistry::DEFAULT.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Use the strategy registered as `sort`.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Pause `delay` between consecutive windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Outcome of a manual arrangement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrangeReport {
    /// Windows successfully moved into place.
    pub applied: usize,
    /// Windows that had a target rect.
    pub placed: usize,
    /// Matched windows that did not fit the layout.
    pub overflow: usize,
    /// Windows discovery matched.
    pub matched: usize,
}

/// Outcome of one monitor poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Windows applied by a template re-layout, if one ran.
    pub relayout: Option<usize>,
    /// Drifted windows pulled back.
    pub corrected: usize,
    /// Tracked windows that disappeared (snapshot mode).
    pub closed: usize,
    /// Tracked handles found owned by another process.
    pub reused: usize,
    /// Corrections the OS refused.
    pub failed: usize,
}

/// Collaborators borrowed for one arrange pass or poll.
#[derive(Clone, Copy)]
pub struct PollContext<'a> {
    /// Window facade.
    pub ops: &'a dyn WinOps,
    /// Process names for discovery.
    pub names: &'a ProcessNameCache,
    /// Strategies looked up by request name.
    pub sorts: &'a SortRegistry,
    /// Status event sink.
    pub events: &'a NotificationDispatcher,
    /// Interrupts apply delays.
    pub cancel: &'a CancellationToken,
}

/// Owned collaborators shared by the coordinator and its monitor task.
#[derive(Clone)]
pub struct Services {
    /// Desktop access.
    pub ops: Arc<dyn WinOps>,
    pub names: Arc<ProcessNameCache>,
    pub sorts: Arc<SortRegistry>,
    /// Status events from passes run by the monitor and by callers.
    pub events: NotificationDispatcher,
    /// Held for the whole of every arrange pass and poll.
    pub state: Arc<Mutex<ArrangeState>>,
}

impl Services {
    /// Borrow everything a pass needs, with `cancel` interrupting delays.
    pub fn ctx<'a>(&'a self, cancel: &'a CancellationToken) -> PollContext<'a> {
        PollContext {
            ops: self.ops.as_ref(),
            names: self.names.as_ref(),
            sorts: self.sorts.as_ref(),
            events: &self.events,
            cancel,
        }
    }
}

/// The last arrangement and the screen it was laid out on.
#[derive(Debug, Clone)]
struct Arrangement {
    request: ArrangeRequest,
    screen: Screen,
}

/// Shared arrangement state. Callers hold it behind one async mutex for the
/// whole of an arrange pass or poll.
#[derive(Debug)]
pub struct ArrangeState {
    last: Option<Arrangement>,
    expected: ExpectedStateTable,
    baseline: BaselineHandleSet,
    /// Recycled handles and the foreign pid now owning each. They are left
    /// out of every re-layout until discovery stops reporting them.
    quarantine: HashMap<WindowHandle, u32>,
    tolerance: i32,
}

impl Default for ArrangeState {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl ArrangeState {
    /// Empty state correcting drift beyond `tolerance` pixels.
    pub fn new(tolerance: i32) -> Self {
        Self {
            last: None,
            expected: ExpectedStateTable::new(),
            baseline: BaselineHandleSet::new(),
            quarantine: HashMap::new(),
            tolerance,
        }
    }

    /// Where each tracked window should be.
    pub fn expected(&self) -> &ExpectedStateTable {
        &self.expected
    }

    /// Population recorded by the last layout pass.
    pub fn baseline(&self) -> &BaselineHandleSet {
        &self.baseline
    }

    /// The request the last arrangement ran.
    pub fn request(&self) -> Option<&ArrangeRequest> {
        self.last.as_ref().map(|a| &a.request)
    }

    /// Whether `handle` was recycled by another process and is being left
    /// alone.
    pub fn is_quarantined(&self, handle: WindowHandle) -> bool {
        self.quarantine.contains_key(&handle)
    }

    /// Drift tolerance in pixels, per rect component.
    pub fn tolerance(&self) -> i32 {
        self.tolerance
    }

    /// Discover, sort, lay out and apply `request` on `screen`, then make it
    /// the state the monitor reconciles against.
    ///
    /// State is untouched on error.
    pub async fn arrange(
        &mut self,
        request: ArrangeRequest,
        screen: Screen,
        ctx: PollContext<'_>,
    ) -> Result<ArrangeReport> {
        let windows = discover(ctx.ops, &request.filter, ctx.names)?;
        if windows.is_empty() {
            return Err(Error::NoWindowsMatched);
        }
        let matched = windows.len();
        let arrangement = Arrangement { request, screen };
        let (applied, placed, overflow) = self.layout_pass(&arrangement, &windows, ctx).await?;
        self.last = Some(arrangement);
        self.quarantine.clear();
        info!(matched, placed, applied, overflow, "arranged");
        Ok(ArrangeReport {
            applied,
            placed,
            overflow,
            matched,
        })
    }

    /// Sort `windows`, place them per `arrangement`, and replace the expected
    /// table and baseline. Returns `(applied, placed, overflow)`.
    async fn layout_pass(
        &mut self,
        arrangement: &Arrangement,
        windows: &[WindowSnapshot],
        ctx: PollContext<'_>,
    ) -> Result<(usize, usize, usize)> {
        let req = &arrangement.request;
        let sorted = ctx.sorts.get_or_default(&req.sort).sort(windows);
        let plan = compute(sorted.len(), &req.layout, &arrangement.screen)?;
        let placed = plan.rects.len();
        let applied = apply(ctx.ops, &sorted[..placed], &plan.rects, req.delay, ctx.cancel).await;

        self.expected = ExpectedStateTable::from_placement(&sorted, &plan.rects);
        self.baseline = sorted.iter().map(|w| w.handle).collect();
        Ok((applied, placed, plan.overflow))
    }

    /// One reconciliation pass in `mode`.
    ///
    /// Does nothing before the first arrangement. Discovery errors propagate
    /// with state unchanged.
    pub async fn poll(&mut self, mode: MonitorMode, ctx: PollContext<'_>) -> Result<PollReport> {
        let mut report = PollReport::default();
        let Some(arrangement) = self.last.clone() else {
            return Ok(report);
        };
        let mut current = discover(ctx.ops, &arrangement.request.filter, ctx.names)?;
        self.release_quarantine(&current);
        current.retain(|w| !self.quarantine.contains_key(&w.handle));
        let by_handle: HashMap<WindowHandle, &WindowSnapshot> =
            current.iter().map(|w| (w.handle, w)).collect();

        match mode {
            MonitorMode::Template => {
                let current_handles: BaselineHandleSet = by_handle.keys().copied().collect();
                if current_handles != self.baseline {
                    debug!(
                        before = self.baseline.len(),
                        after = current_handles.len(),
                        "population changed"
                    );
                    let (applied, _, _) = self.layout_pass(&arrangement, &current, ctx).await?;
                    ctx.events.emit(StatusEvent::Relayout {
                        applied,
                        total: current.len(),
                    });
                    report.relayout = Some(applied);
                    return Ok(report);
                }
                let mut handles: Vec<_> = self.baseline.iter().copied().collect();
                handles.sort_unstable();
                for h in handles {
                    if let Some(snap) = by_handle.get(&h) {
                        self.check_window(snap, ctx, &mut report);
                    }
                }
            }
            MonitorMode::Snapshot => {
                for h in self.expected.handles() {
                    match by_handle.get(&h) {
                        Some(snap) => self.check_window(snap, ctx, &mut report),
                        None => {
                            if let Some(entry) = self.expected.remove(h) {
                                report.closed += 1;
                                ctx.events.emit(StatusEvent::WindowClosed {
                                    handle: h,
                                    title: entry.title,
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(report)
    }

    /// Forget recycled handles that discovery no longer reports.
    fn release_quarantine(&mut self, current: &[WindowSnapshot]) {
        self.quarantine.retain(|handle, pid| {
            let live = current.iter().any(|w| w.handle == *handle);
            if !live {
                debug!(%handle, pid = *pid, "recycled handle gone");
            }
            live
        });
    }

    /// Verify ownership of one tracked window, then pull it back if it
    /// drifted beyond tolerance.
    fn check_window(
        &mut self,
        snap: &WindowSnapshot,
        ctx: PollContext<'_>,
        report: &mut PollReport,
    ) {
        let Some(entry) = self.expected.get(snap.handle) else {
            return;
        };
        if snap.process_id != entry.owner_process_id {
            let expected_pid = entry.owner_process_id;
            let title = entry.title.clone();
            self.expected.remove(snap.handle);
            self.quarantine.insert(snap.handle, snap.process_id);
            report.reused += 1;
            ctx.events.emit(StatusEvent::HandleReused {
                handle: snap.handle,
                title,
                expected_pid,
                actual_pid: snap.process_id,
            });
            return;
        }
        if snap.rect.approx_eq(&entry.expected_rect, self.tolerance) {
            return;
        }
        debug!(handle = %snap.handle, from = %snap.rect, to = %entry.expected_rect, "drift");
        match apply_one(ctx.ops, snap.handle, entry.expected_rect) {
            Ok(()) => {
                report.corrected += 1;
                ctx.events.emit(StatusEvent::Corrected {
                    handle: snap.handle,
                    title: entry.title.clone(),
                });
            }
            Err(e) => {
                report.failed += 1;
                warn!(handle = %snap.handle, title = %entry.title, error = %e, "correction failed");
            }
        }
    }
}

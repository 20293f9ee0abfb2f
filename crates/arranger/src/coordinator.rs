//! The host-facing entry point.
//!
//! [`Arranger`] owns the shared state and, while monitoring, the monitor
//! task. Hosts hold an `Arranger` and a status receiver; nothing reaches
//! back into the host.

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use winops::{ScreenOps, WinOps};

use crate::{
    ArrangeReport, ArrangeRequest, ArrangeState, Error, Monitor, MonitorHandle, MonitorMode,
    NotificationDispatcher, Notifier, NotifyPolicy, ProcessNameCache, Result, Services,
    SortRegistry, StatusEvent, WindowFilter, WindowSnapshot,
    discovery::discover,
    layout::{CascadeSpec, GridSpec, LayoutSpec, pick_screen},
};

/// Capacity of the status event channel.
const EVENT_CAPACITY: usize = 256;

/// Discovers, arranges and keeps windows in place.
pub struct Arranger {
    services: Services,
    screens: Arc<dyn ScreenOps>,
    /// Parent of every monitor token; cancelled on shutdown.
    shutdown: CancellationToken,
    monitor: Mutex<Option<MonitorHandle>>,
}

impl Arranger {
    /// An arranger driving `ops` on the screens reported by `screens`, with
    /// the built-in sort strategies and no notifier.
    pub fn new(ops: Arc<dyn WinOps>, screens: Arc<dyn ScreenOps>) -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            services: Services {
                ops,
                names: Arc::new(ProcessNameCache::new()),
                sorts: Arc::new(SortRegistry::builtin()),
                events: NotificationDispatcher::new(tx),
                state: Arc::new(Mutex::new(ArrangeState::default())),
            },
            screens,
            shutdown: CancellationToken::new(),
            monitor: Mutex::new(None),
        }
    }

    /// Replace the sort registry.
    pub fn with_registry(mut self, sorts: SortRegistry) -> Self {
        self.services.sorts = Arc::new(sorts);
        self
    }

    /// Forward events allowed by `policy` to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>, policy: NotifyPolicy) -> Self {
        self.services.events = self.services.events.clone().with_notifier(notifier, policy);
        self
    }

    /// Set the drift tolerance in pixels.
    pub fn with_tolerance(mut self, tolerance: i32) -> Self {
        self.services.state = Arc::new(Mutex::new(ArrangeState::new(tolerance)));
        self
    }

    /// Status events: arrangements, corrections, hazards, monitor changes.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.services.events.subscribe()
    }

    /// Registered sort strategy names, ascending.
    pub fn sort_names(&self) -> Vec<String> {
        self.services.sorts.names()
    }

    /// List the windows `filter` currently matches, in enumeration order.
    pub fn detect(&self, filter: &WindowFilter) -> Result<Vec<WindowSnapshot>> {
        self.services.names.clear();
        discover(self.services.ops.as_ref(), filter, &self.services.names)
    }

    /// Run a full arrangement and make it the monitor's reference.
    ///
    /// Waits for any in-flight poll; the monitor sees either the old or the
    /// new state, never a mix.
    pub async fn arrange(&self, request: ArrangeRequest) -> Result<ArrangeReport> {
        self.ensure_running()?;
        let screens = self.screens.list_screens().map_err(Error::Screens)?;
        let screen = pick_screen(&screens, request.layout.screen_index())?;
        self.services.names.clear();
        debug!(layout = request.layout.kind(), sort = %request.sort, "arrange");

        let report = {
            let mut state = self.services.state.lock().await;
            state
                .arrange(request, screen, self.services.ctx(&self.shutdown))
                .await?
        };
        self.services.events.emit(StatusEvent::Arranged {
            applied: report.applied,
            total: report.matched,
        });
        Ok(report)
    }

    /// Arrange matching windows on a grid; returns the applied count.
    pub async fn arrange_grid(&self, filter: WindowFilter, spec: GridSpec) -> Result<usize> {
        let req = ArrangeRequest::new(filter, LayoutSpec::Grid(spec));
        Ok(self.arrange(req).await?.applied)
    }

    /// Cascade matching windows; returns the applied count.
    pub async fn arrange_cascade(&self, filter: WindowFilter, spec: CascadeSpec) -> Result<usize> {
        let req = ArrangeRequest::new(filter, LayoutSpec::Cascade(spec));
        Ok(self.arrange(req).await?.applied)
    }

    /// Start (or restart) the monitor from the latest arrangement.
    pub async fn start_monitor(&self, mode: MonitorMode, interval: Duration) -> Result<()> {
        let mut slot = self.monitor.lock().await;
        self.start_locked(&mut slot, mode, interval).await
    }

    /// Replace whatever occupies `slot` with a fresh monitor.
    async fn start_locked(
        &self,
        slot: &mut Option<MonitorHandle>,
        mode: MonitorMode,
        interval: Duration,
    ) -> Result<()> {
        self.ensure_running()?;
        if interval.is_zero() {
            return Err(Error::InvalidInterval);
        }
        if self.services.state.lock().await.expected().is_empty() {
            return Err(Error::NothingToMonitor);
        }
        if let Some(old) = slot.take() {
            old.stop().await;
        }
        self.services.names.clear();
        let handle = Monitor::spawn(
            self.services.clone(),
            mode,
            interval,
            self.shutdown.child_token(),
        )?;
        *slot = Some(handle);
        info!(%mode, interval_ms = interval.as_millis(), "monitor started");
        self.services
            .events
            .emit(StatusEvent::MonitorStarted { mode, interval });
        Ok(())
    }

    /// Stop the monitor if it is running. Returns whether one was running.
    pub async fn stop_monitor(&self) -> bool {
        let Some(handle) = self.monitor.lock().await.take() else {
            return false;
        };
        handle.stop().await;
        self.services.events.emit(StatusEvent::MonitorStopped);
        true
    }

    /// Bring the monitor to the requested state. Switching the mode of a
    /// running monitor restarts it and emits `ModeChanged`.
    pub async fn set_monitoring(
        &self,
        enabled: bool,
        mode: MonitorMode,
        interval: Duration,
    ) -> Result<()> {
        if !enabled {
            self.stop_monitor().await;
            return Ok(());
        }
        let mut slot = self.monitor.lock().await;
        let previous = slot
            .as_ref()
            .filter(|m| !m.is_finished())
            .map(|m| (m.mode(), m.interval()));
        if previous == Some((mode, interval)) {
            return Ok(());
        }
        self.start_locked(&mut slot, mode, interval).await?;
        if let Some((old_mode, _)) = previous
            && old_mode != mode
        {
            self.services.events.emit(StatusEvent::ModeChanged(mode));
        }
        Ok(())
    }

    /// Whether a monitor task is running.
    pub async fn is_monitoring(&self) -> bool {
        self.monitor
            .lock()
            .await
            .as_ref()
            .is_some_and(|m| !m.is_finished())
    }

    /// Mode of the running monitor, if any.
    pub async fn monitor_mode(&self) -> Option<MonitorMode> {
        self.monitor
            .lock()
            .await
            .as_ref()
            .filter(|m| !m.is_finished())
            .map(MonitorHandle::mode)
    }

    /// Number of windows the monitor would hold in place.
    pub async fn expected_len(&self) -> usize {
        self.services.state.lock().await.expected().len()
    }

    /// Stop the monitor and cancel any in-flight apply delay. Later
    /// arrangements and monitor starts fail with [`Error::ShutDown`].
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.stop_monitor().await;
    }

    /// Whether [`Arranger::shutdown`] has run.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Refuse new work after shutdown.
    fn ensure_running(&self) -> Result<()> {
        if self.is_shut_down() {
            return Err(Error::ShutDown);
        }
        Ok(())
    }
}

impl Drop for Arranger {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

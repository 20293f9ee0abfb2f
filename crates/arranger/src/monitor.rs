//! Background reconciliation loop.
//!
//! One tokio task polls on a fixed interval until its cancellation token
//! fires. Every poll runs under the shared state lock and inside
//! `catch_unwind`, so neither an error nor a panic in a single poll ends the
//! loop. Stopping cancels the token and waits a bounded time for the task.

use std::{any::Any, panic::AssertUnwindSafe, time::Duration};

use futures::FutureExt;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, trace, warn};

use crate::{Error, MonitorMode, Result, Services, StatusEvent};

/// Upper bound on how long [`MonitorHandle::stop`] waits for the task.
pub const STOP_WAIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Spawns monitor tasks.
pub struct Monitor;

impl Monitor {
    /// Start polling every `interval` in `mode`. The first poll happens one
    /// interval after start. The loop ends when `cancel` fires.
    pub fn spawn(
        services: Services,
        mode: MonitorMode,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Result<MonitorHandle> {
        if interval.is_zero() {
            return Err(Error::InvalidInterval);
        }
        let guard = cancel.clone().drop_guard();
        let handle = tokio::spawn(async move {
            debug!(%mode, interval_ms = interval.as_millis(), "monitor_start");
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                poll_once(&services, mode, &cancel).await;
            }
            debug!(%mode, "monitor_exit");
        });
        Ok(MonitorHandle {
            mode,
            interval,
            guard,
            handle,
        })
    }
}

/// Run one poll, converting errors and panics into `PollFailed` events.
async fn poll_once(services: &Services, mode: MonitorMode, cancel: &CancellationToken) {
    let pass = async {
        let mut state = services.state.lock().await;
        state.poll(mode, services.ctx(cancel)).await
    };
    match AssertUnwindSafe(pass).catch_unwind().await {
        Ok(Ok(report)) => trace!(?report, "poll"),
        Ok(Err(e)) => {
            warn!(error = %e, "poll failed");
            services.events.emit(StatusEvent::PollFailed(e.to_string()));
        }
        Err(panic) => {
            let msg = panic_message(panic.as_ref());
            error!(panic = %msg, "poll panicked; monitor continues");
            services
                .events
                .emit(StatusEvent::PollFailed(format!("panic: {msg}")));
        }
    }
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// A running monitor task. Dropping the handle cancels the loop.
pub struct MonitorHandle {
    mode: MonitorMode,
    interval: Duration,
    /// Cancels the loop's token when dropped.
    guard: DropGuard,
    handle: JoinHandle<()>,
}

impl MonitorHandle {
    /// Reconciliation mode the loop runs in.
    pub fn mode(&self) -> MonitorMode {
        self.mode
    }

    /// Time between polls.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True once the task has exited, for example after its parent token
    /// was cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the loop and wait up to [`STOP_WAIT_TIMEOUT`] for it to exit.
    /// Aborts the task on timeout. Returns whether it exited on its own.
    pub async fn stop(self) -> bool {
        let Self {
            guard, mut handle, ..
        } = self;
        drop(guard);
        match time::timeout(STOP_WAIT_TIMEOUT, &mut handle).await {
            Ok(_) => {
                trace!("monitor_stopped");
                true
            }
            Err(_) => {
                warn!(
                    timeout_ms = STOP_WAIT_TIMEOUT.as_millis(),
                    "monitor did not stop in time; aborting"
                );
                handle.abort();
                false
            }
        }
    }
}

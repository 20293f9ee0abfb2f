//! Status events and optional desktop notifications.
//!
//! Events flow one way: out of the arranger and monitor, into a broadcast
//! channel the host renders as status text, and into a [`Notifier`] when
//! the [`NotifyPolicy`] allows. Nothing here can stall or fail the monitor.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::Arc,
    time::Duration,
};

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use winops::WindowHandle;

use crate::MonitorMode;

/// Severity of a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}

/// Status-bar payloads emitted by the arranger and monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// A manual arrangement finished.
    Arranged { applied: usize, total: usize },
    /// The monitor re-laid out a changed population.
    Relayout { applied: usize, total: usize },
    /// A drifted window was moved back.
    Corrected { handle: WindowHandle, title: String },
    /// A tracked handle now belongs to another process; tracking dropped.
    HandleReused {
        handle: WindowHandle,
        title: String,
        expected_pid: u32,
        actual_pid: u32,
    },
    /// A tracked window disappeared.
    WindowClosed { handle: WindowHandle, title: String },
    /// A poll failed or panicked; the monitor keeps running.
    PollFailed(String),
    MonitorStarted { mode: MonitorMode, interval: Duration },
    MonitorStopped,
    /// The running monitor switched modes.
    ModeChanged(MonitorMode),
}

impl StatusEvent {
    pub fn level(&self) -> NotifyLevel {
        match self {
            Self::HandleReused { .. } => NotifyLevel::Warn,
            Self::PollFailed(_) => NotifyLevel::Error,
            _ => NotifyLevel::Info,
        }
    }

    /// Short heading used for desktop notifications.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Arranged { .. } => "Arranged",
            Self::Relayout { .. } => "Layout refreshed",
            Self::Corrected { .. } => "Window corrected",
            Self::HandleReused { .. } => "Window handle reused",
            Self::WindowClosed { .. } => "Window closed",
            Self::PollFailed(_) => "Monitor error",
            Self::MonitorStarted { .. } => "Monitor started",
            Self::MonitorStopped => "Monitor stopped",
            Self::ModeChanged(_) => "Monitor mode",
        }
    }
}

impl Display for StatusEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Arranged { applied, total } => write!(f, "arranged {applied}/{total} windows"),
            Self::Relayout { applied, total } => {
                write!(f, "window set changed; re-arranged {applied}/{total}")
            }
            Self::Corrected { handle, title } => write!(f, "corrected '{title}' ({handle})"),
            Self::HandleReused {
                handle,
                title,
                expected_pid,
                actual_pid,
            } => write!(
                f,
                "stopped tracking '{title}': handle {handle} now owned by pid {actual_pid} (was {expected_pid})"
            ),
            Self::WindowClosed { handle, title } => write!(f, "'{title}' ({handle}) closed"),
            Self::PollFailed(msg) => write!(f, "monitor poll failed: {msg}"),
            Self::MonitorStarted { mode, interval } => {
                write!(f, "monitoring ({mode}) every {}ms", interval.as_millis())
            }
            Self::MonitorStopped => f.write_str("monitoring stopped"),
            Self::ModeChanged(mode) => write!(f, "monitor mode: {mode}"),
        }
    }
}

/// Notification delivery failure.
#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Fire-and-forget desktop notification sink.
pub trait Notifier: Send + Sync {
    fn show(&self, title: &str, message: &str, level: NotifyLevel) -> Result<(), NotifyError>;
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn show(&self, _title: &str, _message: &str, _level: NotifyLevel) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, title: &str, message: &str, level: NotifyLevel) -> Result<(), NotifyError> {
        match level {
            NotifyLevel::Info => info!(title, message, "notification_display"),
            NotifyLevel::Warn => warn!(title, message, "notification_display"),
            NotifyLevel::Error => error!(title, message, "notification_display"),
        }
        Ok(())
    }
}

/// Which events are forwarded to the [`Notifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyPolicy {
    /// Corrections and re-layouts.
    pub corrections: bool,
    /// Handle reuse and poll failures.
    pub hazards: bool,
}

impl Default for NotifyPolicy {
    fn default() -> Self {
        Self {
            corrections: false,
            hazards: true,
        }
    }
}

impl NotifyPolicy {
    /// Whether `event` should raise a desktop notification.
    pub fn allows(&self, event: &StatusEvent) -> bool {
        match event {
            StatusEvent::Corrected { .. } | StatusEvent::Relayout { .. } => self.corrections,
            StatusEvent::HandleReused { .. } | StatusEvent::PollFailed(_) => self.hazards,
            _ => false,
        }
    }
}

/// Sends status events to subscribers and, per policy, to a notifier.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: broadcast::Sender<StatusEvent>,
    notifier: Option<Arc<dyn Notifier>>,
    policy: NotifyPolicy,
}

impl NotificationDispatcher {
    /// Dispatcher broadcasting on `tx` with no desktop notifier.
    pub fn new(tx: broadcast::Sender<StatusEvent>) -> Self {
        Self {
            tx,
            notifier: None,
            policy: NotifyPolicy::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>, policy: NotifyPolicy) -> Self {
        self.notifier = Some(notifier);
        self.policy = policy;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.tx.subscribe()
    }

    /// Log, broadcast and maybe notify. Never fails.
    pub fn emit(&self, event: StatusEvent) {
        match event.level() {
            NotifyLevel::Info => info!(status = %event, "status"),
            NotifyLevel::Warn => warn!(status = %event, "status"),
            NotifyLevel::Error => error!(status = %event, "status"),
        }
        if let Some(n) = &self.notifier
            && self.policy.allows(&event)
            && let Err(e) = n.show(event.title(), &event.to_string(), event.level())
        {
            warn!(error = %e, "notifier failed");
        }
        // No subscribers is fine.
        self.tx.send(event).ok();
    }
}

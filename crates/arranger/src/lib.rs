//! arranger: discover, arrange and keep external windows in place.
//!
//! A filtered set of top-level windows is sorted by a named strategy, laid
//! out on a grid or as a cascade, and then optionally held there by a
//! background monitor. The monitor runs in one of two modes:
//!
//! - [`MonitorMode::Template`] re-lays out whenever the matched population
//!   changes, and otherwise pulls drifted windows back.
//! - [`MonitorMode::Snapshot`] only pulls previously arranged windows back
//!   and ignores newcomers.
//!
//! Window handles can be recycled by the OS. Before touching a tracked
//! window the monitor checks that its owning process is unchanged; a
//! mismatch drops tracking for that handle and emits a warning event.
//!
//! All OS access goes through the [`winops::WinOps`] and
//! [`winops::ScreenOps`] traits supplied by the host.

mod apply;
mod coordinator;
mod discovery;
mod error;
mod monitor;
mod notify;
mod reconcile;
mod snapshot;
mod sort;
mod state;

pub mod layout;
/// Test helpers shared by unit and integration tests.
pub mod test_support;

pub use apply::{apply, apply_one};
pub use coordinator::Arranger;
pub use discovery::{ProcessNameCache, WindowFilter, discover};
pub use error::{Error, Result};
pub use layout::{CascadeSpec, Direction, GridSpec, LayoutPlan, LayoutSpec, Margin};
pub use monitor::{Monitor, MonitorHandle, STOP_WAIT_TIMEOUT};
pub use notify::{
    LogNotifier, NotificationDispatcher, Notifier, NotifyError, NotifyLevel, NotifyPolicy,
    NullNotifier, StatusEvent,
};
pub use reconcile::{
    ArrangeReport, ArrangeRequest, ArrangeState, DEFAULT_TOLERANCE, PollContext, PollReport,
    Services,
};
pub use snapshot::{UNKNOWN_PROCESS, WindowSnapshot};
pub use sort::{
    ByPosition, DefaultByTitle, NumericByExtractedDigits, SortRegistry, SortStrategy,
    StrategyCtor, digit_key,
};
pub use state::{BaselineHandleSet, ExpectedStateEntry, ExpectedStateTable, MonitorMode};

//! winops: window and screen facade for winarrange.
//!
//! The arranger never talks to a windowing system directly. Hosts supply an
//! implementation of [`WinOps`] (enumerate windows, resolve owners, move and
//! resize) and [`ScreenOps`] (enumerate displays). Every call may fail on its
//! own with a recoverable [`Error`].
//!
//! [`MockWinOps`] implements both traits over an in-memory desktop and is
//! used by tests and by the CLI's desktop fixtures.

mod error;
mod geom;
mod mock;
mod ops;
mod screen;
mod window;

pub use error::{Error, Result};
pub use geom::Rect;
pub use mock::{MockWindow, MockWinOps};
pub use ops::{ScreenOps, WinOps};
pub use screen::Screen;
pub use window::{WindowHandle, WindowInfo};

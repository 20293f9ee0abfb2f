//! Persisted settings for winarrange: filter keywords, layout parameters,
//! monitor mode and interval.
//!
//! Values live in a string-keyed [`ConfigService`] grouped by section. The
//! typed [`ArrangeSettings`] view is read when an arrangement or monitor
//! starts; nothing here is polled.

use std::{
    env,
    path::{Path, PathBuf},
};

mod error;
mod loader;
mod settings;
mod store;

#[cfg(test)]
mod test_settings;

pub use error::Error;
pub use loader::{RonStore, parse};
pub use settings::{
    ArrangeSettings, CascadeSettings, DirectionSetting, FilterSettings, GridSettings,
    ModeSetting, MonitorSettings, NotifySettings, section, split_keywords,
};
pub use store::{ConfigService, MemoryStore, Sections};

/// Determine the preferred settings path (`~/.winarrange/settings.ron`).
pub fn default_settings_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".winarrange");
    p.push("settings.ron");
    p
}

/// Resolve the effective settings path: `explicit` when provided, else the default.
pub fn resolve_settings_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_settings_path)
}

//! Typed view over the persisted settings.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::{ConfigService, Error};

/// Section names used in the settings store.
pub mod section {
    /// Keyword lists.
    pub const FILTER: &str = "filter";
    /// Sort strategy and per-move delay.
    pub const ARRANGE: &str = "arrange";
    /// Background monitor.
    pub const MONITOR: &str = "monitor";
    /// Grid geometry.
    pub const GRID: &str = "grid";
    /// Cascade offsets.
    pub const CASCADE: &str = "cascade";
    /// Notification toggles.
    pub const NOTIFY: &str = "notify";
}

/// Reconciliation mode as stored in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeSetting {
    /// Re-lay out whenever the matched population changes.
    #[default]
    Template,
    /// Only keep previously arranged windows in place.
    Snapshot,
}

impl FromStr for ModeSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" => Ok(Self::Template),
            "snapshot" => Ok(Self::Snapshot),
            other => Err(format!("unknown monitor mode '{other}'")),
        }
    }
}

impl Display for ModeSetting {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Template => "template",
            Self::Snapshot => "snapshot",
        })
    }
}

/// Grid fill order as stored in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionSetting {
    /// Fill each row before moving down.
    #[default]
    RowMajor,
    /// Fill each column before moving right.
    ColumnMajor,
}

impl FromStr for DirectionSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "row" | "rows" | "row-major" => Ok(Self::RowMajor),
            "column" | "col" | "columns" | "column-major" => Ok(Self::ColumnMajor),
            other => Err(format!("unknown grid direction '{other}'")),
        }
    }
}

impl Display for DirectionSetting {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::RowMajor => "row",
            Self::ColumnMajor => "column",
        })
    }
}

/// Keyword filter used to pick candidate windows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSettings {
    /// A window matches when its title contains any of these.
    pub title: Vec<String>,
    /// Or when its process name contains any of these.
    pub process: Vec<String>,
    /// Titles containing any of these never match.
    pub exclude_title: Vec<String>,
}

/// Background monitor parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Keep windows in place after a one-off `arrange`.
    pub enabled: bool,
    pub mode: ModeSetting,
    /// Time between polls.
    pub interval_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: ModeSetting::Template,
            interval_ms: 3000,
        }
    }
}

/// Grid layout parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSettings {
    pub rows: u32,
    pub cols: u32,
    /// Margins are insets from the screen's work area, in pixels.
    pub margin_top: i32,
    pub margin_bottom: i32,
    pub margin_left: i32,
    pub margin_right: i32,
    /// Gap between neighbouring columns.
    pub spacing_h: i32,
    /// Gap between neighbouring rows.
    pub spacing_v: i32,
    pub direction: DirectionSetting,
    /// Index into the screen list; out of range falls back to the primary.
    pub screen: usize,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            rows: 2,
            cols: 2,
            margin_top: 0,
            margin_bottom: 0,
            margin_left: 0,
            margin_right: 0,
            spacing_h: 10,
            spacing_v: 10,
            direction: DirectionSetting::RowMajor,
            screen: 0,
        }
    }
}

/// Cascade layout parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeSettings {
    /// Step from one window to the next; negative values step left or up.
    pub x_offset: i32,
    pub y_offset: i32,
    pub screen: usize,
}

impl Default for CascadeSettings {
    fn default() -> Self {
        Self {
            x_offset: 30,
            y_offset: 30,
            screen: 0,
        }
    }
}

/// Which status events also raise desktop notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifySettings {
    /// Position corrections made by the monitor.
    pub corrections: bool,
    /// Closed windows and recycled handles.
    pub hazards: bool,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            corrections: false,
            hazards: true,
        }
    }
}

/// Everything the arranger reads from settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrangeSettings {
    pub filter: FilterSettings,
    /// Registered sort strategy name.
    pub sort: String,
    /// Pause between consecutive window moves, in milliseconds.
    pub delay_ms: u64,
    pub monitor: MonitorSettings,
    pub grid: GridSettings,
    pub cascade: CascadeSettings,
    pub notify: NotifySettings,
}

impl Default for ArrangeSettings {
    fn default() -> Self {
        Self {
            filter: FilterSettings::default(),
            sort: "title".to_string(),
            delay_ms: 0,
            monitor: MonitorSettings::default(),
            grid: GridSettings::default(),
            cascade: CascadeSettings::default(),
            notify: NotifySettings::default(),
        }
    }
}

impl ArrangeSettings {
    /// Read settings, taking defaults for absent keys.
    pub fn load(store: &dyn ConfigService) -> Result<Self, Error> {
        use section::*;
        let d = Self::default();
        let r = Reader(store);
        Ok(Self {
            filter: FilterSettings {
                title: r.list(FILTER, "title"),
                process: r.list(FILTER, "process"),
                exclude_title: r.list(FILTER, "exclude_title"),
            },
            sort: r.string(ARRANGE, "sort", &d.sort),
            delay_ms: r.parse(ARRANGE, "delay_ms", d.delay_ms)?,
            monitor: MonitorSettings {
                enabled: r.flag(MONITOR, "enabled", d.monitor.enabled)?,
                mode: r.parse(MONITOR, "mode", d.monitor.mode)?,
                interval_ms: r.parse(MONITOR, "interval_ms", d.monitor.interval_ms)?,
            },
            grid: GridSettings {
                rows: r.parse(GRID, "rows", d.grid.rows)?,
                cols: r.parse(GRID, "cols", d.grid.cols)?,
                margin_top: r.parse(GRID, "margin_top", d.grid.margin_top)?,
                margin_bottom: r.parse(GRID, "margin_bottom", d.grid.margin_bottom)?,
                margin_left: r.parse(GRID, "margin_left", d.grid.margin_left)?,
                margin_right: r.parse(GRID, "margin_right", d.grid.margin_right)?,
                spacing_h: r.parse(GRID, "spacing_h", d.grid.spacing_h)?,
                spacing_v: r.parse(GRID, "spacing_v", d.grid.spacing_v)?,
                direction: r.parse(GRID, "direction", d.grid.direction)?,
                screen: r.parse(GRID, "screen", d.grid.screen)?,
            },
            cascade: CascadeSettings {
                x_offset: r.parse(CASCADE, "x_offset", d.cascade.x_offset)?,
                y_offset: r.parse(CASCADE, "y_offset", d.cascade.y_offset)?,
                screen: r.parse(CASCADE, "screen", d.cascade.screen)?,
            },
            notify: NotifySettings {
                corrections: r.flag(NOTIFY, "corrections", d.notify.corrections)?,
                hazards: r.flag(NOTIFY, "hazards", d.notify.hazards)?,
            },
        })
    }

    /// Write every value back into `store`.
    pub fn save(&self, store: &mut dyn ConfigService) -> Result<(), Error> {
        use section::*;
        let entries = [
            (FILTER, "title", self.filter.title.join(", ")),
            (FILTER, "process", self.filter.process.join(", ")),
            (FILTER, "exclude_title", self.filter.exclude_title.join(", ")),
            (ARRANGE, "sort", self.sort.clone()),
            (ARRANGE, "delay_ms", self.delay_ms.to_string()),
            (MONITOR, "enabled", self.monitor.enabled.to_string()),
            (MONITOR, "mode", self.monitor.mode.to_string()),
            (MONITOR, "interval_ms", self.monitor.interval_ms.to_string()),
            (GRID, "rows", self.grid.rows.to_string()),
            (GRID, "cols", self.grid.cols.to_string()),
            (GRID, "margin_top", self.grid.margin_top.to_string()),
            (GRID, "margin_bottom", self.grid.margin_bottom.to_string()),
            (GRID, "margin_left", self.grid.margin_left.to_string()),
            (GRID, "margin_right", self.grid.margin_right.to_string()),
            (GRID, "spacing_h", self.grid.spacing_h.to_string()),
            (GRID, "spacing_v", self.grid.spacing_v.to_string()),
            (GRID, "direction", self.grid.direction.to_string()),
            (GRID, "screen", self.grid.screen.to_string()),
            (CASCADE, "x_offset", self.cascade.x_offset.to_string()),
            (CASCADE, "y_offset", self.cascade.y_offset.to_string()),
            (CASCADE, "screen", self.cascade.screen.to_string()),
            (NOTIFY, "corrections", self.notify.corrections.to_string()),
            (NOTIFY, "hazards", self.notify.hazards.to_string()),
        ];
        for (sec, key, value) in &entries {
            store.set(sec, key, value)?;
        }
        Ok(())
    }
}

/// Typed accessors over a [`ConfigService`].
struct Reader<'a>(&'a dyn ConfigService);

impl Reader<'_> {
    fn string(&self, section: &str, key: &str, default: &str) -> String {
        let v = self.0.get(section, key, default);
        if v.trim().is_empty() {
            default.to_string()
        } else {
            v.trim().to_string()
        }
    }

    /// Comma-separated keyword list; blanks are dropped.
    fn list(&self, section: &str, key: &str) -> Vec<String> {
        split_keywords(&self.0.get(section, key, ""))
    }

    fn parse<T>(&self, section: &str, key: &str, default: T) -> Result<T, Error>
    where
        T: FromStr + Display,
        T::Err: Display,
    {
        let raw = self.0.get(section, key, &default.to_string());
        if raw.trim().is_empty() {
            return Ok(default);
        }
        raw.trim()
            .parse()
            .map_err(|e| Error::invalid(section, key, format!("'{}': {}", raw.trim(), e)))
    }

    fn flag(&self, section: &str, key: &str, default: bool) -> Result<bool, Error> {
        let raw = self.0.get(section, key, &default.to_string());
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(Error::invalid(
                section,
                key,
                format!("'{other}' is not a boolean"),
            )),
        }
    }
}

/// Split a comma-separated keyword list, trimming and dropping blanks.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

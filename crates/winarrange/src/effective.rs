//! Merge command-line arguments over persisted settings.
//!
//! Command-line values win; anything left unset comes from the settings
//! file, which in turn falls back to built-in defaults.

use std::time::Duration;

use arranger::{
    ArrangeRequest, CascadeSpec, Direction, GridSpec, LayoutSpec, Margin, MonitorMode,
    WindowFilter,
};
use config::{
    ArrangeSettings, CascadeSettings, DirectionSetting, FilterSettings, GridSettings, ModeSetting,
    MonitorSettings,
};

use crate::cli::{CascadeArgs, CommonArgs, FilterArgs, GridArgs, ModeArg};

/// Keyword lists, each taken from the command line when given there.
pub fn keywords(args: &FilterArgs, saved: &FilterSettings) -> FilterSettings {
    let pick = |cli: &[String], saved: &[String]| {
        if cli.is_empty() {
            saved.to_vec()
        } else {
            cli.to_vec()
        }
    };
    FilterSettings {
        title: pick(&args.title, &saved.title),
        process: pick(&args.process, &saved.process),
        exclude_title: pick(&args.exclude, &saved.exclude_title),
    }
}

/// Build a discovery filter from keyword lists.
pub fn filter(keywords: &FilterSettings) -> WindowFilter {
    let f = keywords
        .title
        .iter()
        .fold(WindowFilter::new(), |f, k| f.with_title(k.as_str()));
    let f = keywords
        .process
        .iter()
        .fold(f, |f, k| f.with_process(k.as_str()));
    keywords
        .exclude_title
        .iter()
        .fold(f, |f, k| f.excluding_title(k.as_str()))
}

/// Layout fill order for a stored direction.
pub fn direction(d: DirectionSetting) -> Direction {
    match d {
        DirectionSetting::RowMajor => Direction::RowMajor,
        DirectionSetting::ColumnMajor => Direction::ColumnMajor,
    }
}

/// Monitor mode for a stored mode.
pub fn mode(m: ModeSetting) -> MonitorMode {
    match m {
        ModeSetting::Template => MonitorMode::Template,
        ModeSetting::Snapshot => MonitorMode::Snapshot,
    }
}

/// Monitor mode from the command line, else from settings.
pub fn monitor_mode(arg: Option<ModeArg>, saved: ModeSetting) -> MonitorMode {
    match arg {
        Some(ModeArg::Template) => MonitorMode::Template,
        Some(ModeArg::Snapshot) => MonitorMode::Snapshot,
        None => mode(saved),
    }
}

/// Poll interval from the command line, else from settings.
pub fn interval(arg: Option<Duration>, saved_ms: u64) -> Duration {
    arg.unwrap_or(Duration::from_millis(saved_ms))
}

/// Mode and interval for monitoring after a one-off arrangement, when the
/// settings enable it.
pub fn follow_up(saved: &MonitorSettings) -> Option<(MonitorMode, Duration)> {
    saved
        .enabled
        .then(|| (mode(saved.mode), interval(None, saved.interval_ms)))
}

/// Grid parameters, each from the command line when given there.
pub fn grid_spec(args: &GridArgs, saved: &GridSettings) -> GridSpec {
    let margin = args.margin.map(Margin::uniform).unwrap_or(Margin {
        top: saved.margin_top,
        bottom: saved.margin_bottom,
        left: saved.margin_left,
        right: saved.margin_right,
    });
    GridSpec {
        rows: args.rows.unwrap_or(saved.rows),
        cols: args.cols.unwrap_or(saved.cols),
        margin,
        spacing_h: args.spacing.unwrap_or(saved.spacing_h),
        spacing_v: args.spacing.unwrap_or(saved.spacing_v),
        direction: if args.column_major {
            Direction::ColumnMajor
        } else {
            direction(saved.direction)
        },
        screen: args.screen.unwrap_or(saved.screen),
    }
}

/// Cascade parameters, each from the command line when given there.
pub fn cascade_spec(args: &CascadeArgs, saved: &CascadeSettings) -> CascadeSpec {
    CascadeSpec {
        x_offset: args.x_offset.unwrap_or(saved.x_offset),
        y_offset: args.y_offset.unwrap_or(saved.y_offset),
        screen: args.screen.unwrap_or(saved.screen),
    }
}

/// The full arrangement request for `layout`.
pub fn request(
    keywords: &FilterSettings,
    layout: LayoutSpec,
    common: &CommonArgs,
    saved: &ArrangeSettings,
) -> ArrangeRequest {
    let sort = common.sort.clone().unwrap_or_else(|| saved.sort.clone());
    let delay = common
        .delay
        .unwrap_or(Duration::from_millis(saved.delay_ms));
    ArrangeRequest::new(filter(keywords), layout)
        .with_sort(sort)
        .with_delay(delay)
}

/// Fold an effective request back into `settings` so it can be saved.
pub fn record(settings: &mut ArrangeSettings, keywords: &FilterSettings, req: &ArrangeRequest) {
    settings.filter = keywords.clone();
    settings.sort = req.sort.clone();
    settings.delay_ms = u64::try_from(req.delay.as_millis()).unwrap_or(u64::MAX);
    match req.layout {
        LayoutSpec::Grid(g) => {
            let s = &mut settings.grid;
            s.rows = g.rows;
            s.cols = g.cols;
            s.margin_top = g.margin.top;
            s.margin_bottom = g.margin.bottom;
            s.margin_left = g.margin.left;
            s.margin_right = g.margin.right;
            s.spacing_h = g.spacing_h;
            s.spacing_v = g.spacing_v;
            s.direction = match g.direction {
                Direction::RowMajor => DirectionSetting::RowMajor,
                Direction::ColumnMajor => DirectionSetting::ColumnMajor,
            };
            s.screen = g.screen;
        }
        LayoutSpec::Cascade(c) => {
            settings.cascade = CascadeSettings {
                x_offset: c.x_offset,
                y_offset: c.y_offset,
                screen: c.screen,
            };
        }
    }
}

//! Command-line interface definitions for winarrange.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};
use logging::LogArgs;

/// Command-line interface for the `winarrange` binary.
#[derive(Parser, Debug)]
#[command(
    name = "winarrange",
    about = "Arrange windows on a grid or cascade and keep them there",
    version
)]
pub struct Cli {
    /// Logging controls shared across winarrange binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Desktop fixture (RON) describing screens, windows and scripted changes.
    #[arg(long, value_name = "PATH")]
    pub desktop: PathBuf,

    /// Settings file (RON). Defaults to ~/.winarrange/settings.ron.
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the windows the filter matches.
    Detect(FilterArgs),
    /// Arrange matching windows once.
    Arrange(ArrangeArgs),
    /// Arrange, then keep windows in place for a while.
    Monitor(MonitorArgs),
}

/// Keyword filter. Empty lists fall back to the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Title keyword (case-insensitive substring); repeatable.
    #[arg(long = "title", value_name = "KEYWORD")]
    pub title: Vec<String>,

    /// Process name keyword; repeatable.
    #[arg(long = "process", value_name = "KEYWORD")]
    pub process: Vec<String>,

    /// Skip windows whose title contains this keyword; repeatable.
    #[arg(long = "exclude", value_name = "KEYWORD")]
    pub exclude: Vec<String>,
}

/// Options shared by every arranging command.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Window filter.
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Sort strategy name (title, numeric, position).
    #[arg(long, value_name = "NAME")]
    pub sort: Option<String>,

    /// Pause between windows, e.g. `200ms`.
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub delay: Option<Duration>,

    /// Write the effective filter and layout back to the settings file.
    #[arg(long)]
    pub save: bool,
}

/// Arguments for the `arrange` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ArrangeArgs {
    /// How long to keep windows in place afterwards when the settings
    /// enable the monitor.
    #[arg(
        long,
        global = true,
        value_parser = humantime::parse_duration,
        default_value = "10s",
        value_name = "DURATION"
    )]
    pub monitor_for: Duration,

    /// Layout to apply.
    #[command(subcommand)]
    pub layout: LayoutCmd,
}

/// Layout choice for `arrange`.
#[derive(Subcommand, Debug, Clone)]
pub enum LayoutCmd {
    /// Tile windows on a grid.
    Grid(GridArgs),
    /// Cascade windows from the top-left corner.
    Cascade(CascadeArgs),
}

/// Grid parameters. Unset values come from the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct GridArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of rows.
    #[arg(long)]
    pub rows: Option<u32>,

    /// Number of columns.
    #[arg(long)]
    pub cols: Option<u32>,

    /// Gap between cells, both directions.
    #[arg(long)]
    pub spacing: Option<i32>,

    /// Inset from every screen edge.
    #[arg(long)]
    pub margin: Option<i32>,

    /// Fill columns first instead of rows.
    #[arg(long)]
    pub column_major: bool,

    /// Screen index; out of range uses the primary screen.
    #[arg(long)]
    pub screen: Option<usize>,
}

/// Cascade parameters. Unset values come from the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct CascadeArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Horizontal step between windows.
    #[arg(long, allow_hyphen_values = true)]
    pub x_offset: Option<i32>,

    /// Vertical step between windows.
    #[arg(long, allow_hyphen_values = true)]
    pub y_offset: Option<i32>,

    /// Screen index; out of range uses the primary screen.
    #[arg(long)]
    pub screen: Option<usize>,
}

/// Reconciliation mode on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Re-lay out when the window set changes.
    Template,
    /// Only hold arranged windows in place.
    Snapshot,
}

/// Arguments for the `monitor` subcommand.
#[derive(Args, Debug, Clone)]
pub struct MonitorArgs {
    /// Grid parameters used for the initial arrangement.
    #[command(flatten)]
    pub grid: GridArgs,

    /// Cascade instead of grid, using the cascade settings.
    #[arg(long)]
    pub cascade: bool,

    /// Reconciliation mode; defaults to the settings file.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Poll interval, e.g. `3s`; defaults to the settings file.
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub interval: Option<Duration>,

    /// How long to keep monitoring before exiting.
    #[arg(
        long = "for",
        value_parser = humantime::parse_duration,
        default_value = "10s",
        value_name = "DURATION"
    )]
    pub run_for: Duration,

    /// Drift tolerance in pixels.
    #[arg(long, default_value_t = arranger::DEFAULT_TOLERANCE)]
    pub tolerance: i32,
}

//! Pure layout computation: grid and cascade placement on a screen.
//!
//! Nothing here touches a window. Given a window count, layout parameters and
//! a screen, each function returns the target rectangle for every window that
//! fits, in placement order.

use tracing::warn;
use winops::{Rect, Screen};

use crate::{Error, Result};

/// Smallest grid cell edge, in pixels.
pub const MIN_CELL: i32 = 100;
/// Largest accepted row or column count.
pub const MAX_GRID_DIM: u32 = 1024;
/// Top-left inset of the first cascaded window, on both axes.
pub const CASCADE_ORIGIN: i32 = 20;
/// Minimum cascade window size.
pub const CASCADE_MIN: (i32, i32) = (300, 200);

/// Grid fill order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Fill each row left to right before moving down.
    #[default]
    RowMajor,
    /// Fill each column top to bottom before moving right.
    ColumnMajor,
}

/// Insets from the screen edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Margin {
    /// Pixels kept clear at the top; the other edges work the same way.
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl Margin {
    /// Same inset on every edge.
    pub fn uniform(v: i32) -> Self {
        Self {
            top: v,
            bottom: v,
            left: v,
            right: v,
        }
    }
}

/// Grid layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    /// Row count, 1 to [`MAX_GRID_DIM`].
    pub rows: u32,
    /// Column count, 1 to [`MAX_GRID_DIM`].
    pub cols: u32,
    pub margin: Margin,
    /// Horizontal gap between columns.
    pub spacing_h: i32,
    /// Vertical gap between rows.
    pub spacing_v: i32,
    pub direction: Direction,
    /// Index into the screen list; out of range falls back to the primary.
    pub screen: usize,
}

impl GridSpec {
    /// A `rows` by `cols` grid with no margin and 10px spacing.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            margin: Margin::default(),
            spacing_h: 10,
            spacing_v: 10,
            direction: Direction::RowMajor,
            screen: 0,
        }
    }

    /// Number of cells.
    pub fn capacity(&self) -> usize {
        (self.rows as usize).saturating_mul(self.cols as usize)
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::new(2, 2)
    }
}

/// Cascade layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeSpec {
    /// Horizontal step between consecutive windows.
    pub x_offset: i32,
    /// Vertical step between consecutive windows.
    pub y_offset: i32,
    /// Index into the screen list; out of range falls back to the primary.
    pub screen: usize,
}

impl Default for CascadeSpec {
    fn default() -> Self {
        Self {
            x_offset: 30,
            y_offset: 30,
            screen: 0,
        }
    }
}

/// A layout choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSpec {
    /// Tile windows in rows and columns.
    Grid(GridSpec),
    /// Stack windows with a fixed offset.
    Cascade(CascadeSpec),
}

impl LayoutSpec {
    /// Requested screen index.
    pub fn screen_index(&self) -> usize {
        match self {
            Self::Grid(g) => g.screen,
            Self::Cascade(c) => c.screen,
        }
    }

    /// Short name for logs and status text.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Grid(_) => "grid",
            Self::Cascade(_) => "cascade",
        }
    }
}

/// Target rectangles in placement order plus the number of windows that did
/// not fit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutPlan {
    pub rects: Vec<Rect>,
    /// Windows left in place because the layout had no room.
    pub overflow: usize,
}

/// Place up to `rows * cols` windows on a grid.
///
/// Rows and columns must each be between 1 and [`MAX_GRID_DIM`]. Cell sizes
/// are clamped to [`MIN_CELL`]; a grid whose cells would land outside the
/// `i32` coordinate space is rejected.
pub fn compute_grid(count: usize, spec: &GridSpec, screen: &Screen) -> Result<LayoutPlan> {
    let dims = 1..=MAX_GRID_DIM;
    if !dims.contains(&spec.rows) || !dims.contains(&spec.cols) {
        return Err(Error::InvalidLayout(format!(
            "grid rows and columns must be between 1 and {MAX_GRID_DIM}, got {}x{}",
            spec.rows, spec.cols
        )));
    }
    let rows = i64::from(spec.rows);
    let cols = i64::from(spec.cols);
    let m = spec.margin;
    let (spacing_h, spacing_v) = (i64::from(spec.spacing_h), i64::from(spec.spacing_v));

    let avail_w = i64::from(screen.width) - i64::from(m.left) - i64::from(m.right)
        - (cols - 1) * spacing_h;
    let avail_h = i64::from(screen.height) - i64::from(m.top) - i64::from(m.bottom)
        - (rows - 1) * spacing_v;
    let cell_w = (avail_w / cols).max(i64::from(MIN_CELL));
    let cell_h = (avail_h / rows).max(i64::from(MIN_CELL));
    let origin_x = i64::from(screen.x) + i64::from(m.left);
    let origin_y = i64::from(screen.y) + i64::from(m.top);

    let placed = count.min(spec.capacity());
    let mut rects = Vec::with_capacity(placed);
    for i in 0..placed as i64 {
        let (row, col) = match spec.direction {
            Direction::RowMajor => (i / cols, i % cols),
            Direction::ColumnMajor => (i % rows, i / rows),
        };
        let coords = [
            origin_x + col * (cell_w + spacing_h),
            origin_y + row * (cell_h + spacing_v),
            cell_w,
            cell_h,
        ]
        .map(i32::try_from);
        let [Ok(x), Ok(y), Ok(w), Ok(h)] = coords else {
            return Err(Error::InvalidLayout(format!(
                "grid cell {i} does not fit in screen coordinates"
            )));
        };
        rects.push(Rect::new(x, y, w, h));
    }

    Ok(LayoutPlan {
        rects,
        overflow: count - placed,
    })
}

/// Cascade window size for one axis: half the screen, at least `min`, at
/// most 80% of the screen.
fn cascade_extent(bound: i32, min: i32) -> i32 {
    (bound / 2).max(min).min(bound * 4 / 5)
}

/// Position on one axis for the `i`th cascaded window, wrapped so the window
/// stays within `[0, bound)`.
fn cascade_axis(i: usize, offset: i32, bound: i32, extent: i32) -> i32 {
    let hi = i64::from(bound - extent);
    let lo = i64::from(CASCADE_ORIGIN).min(hi).max(0);
    let span = (hi - lo + 1).max(1);
    let step = (i as i64).saturating_mul(i64::from(offset));
    let pos = lo + (i64::from(CASCADE_ORIGIN) - lo + step).rem_euclid(span);
    pos as i32
}

/// Cascade `count` windows from the top-left corner of the screen.
pub fn compute_cascade(count: usize, spec: &CascadeSpec, screen: &Screen) -> LayoutPlan {
    let w = cascade_extent(screen.width, CASCADE_MIN.0);
    let h = cascade_extent(screen.height, CASCADE_MIN.1);
    let rects = (0..count)
        .map(|i| {
            Rect::new(
                screen.x + cascade_axis(i, spec.x_offset, screen.width, w),
                screen.y + cascade_axis(i, spec.y_offset, screen.height, h),
                w,
                h,
            )
        })
        .collect();
    LayoutPlan { rects, overflow: 0 }
}

/// Compute the plan for any layout.
pub fn compute(count: usize, spec: &LayoutSpec, screen: &Screen) -> Result<LayoutPlan> {
    match spec {
        LayoutSpec::Grid(g) => compute_grid(count, g, screen),
        LayoutSpec::Cascade(c) => Ok(compute_cascade(count, c, screen)),
    }
}

/// Choose the screen at `index`, falling back to the primary screen (then
/// the first one) when the index is out of range.
pub fn pick_screen(screens: &[Screen], index: usize) -> Result<Screen> {
    if let Some(s) = screens.get(index) {
        return Ok(*s);
    }
    let fallback = screens
        .iter()
        .find(|s| s.is_primary)
        .or_else(|| screens.first())
        .copied()
        .ok_or(Error::NoScreens)?;
    warn!(
        index,
        available = screens.len(),
        "screen index out of range; using primary"
    );
    Ok(fallback)
}

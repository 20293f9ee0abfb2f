// Integer screen-pixel geometry shared by the facade and the layout engine.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in global screen pixels, origin at the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Rect {
    /// Construct a rectangle from origin and size.
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }
    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// True when every component of `self` is within `tol` pixels of `other`.
    pub fn approx_eq(&self, other: &Self, tol: i32) -> bool {
        approx_eq(self.x, other.x, tol)
            && approx_eq(self.y, other.y, tol)
            && approx_eq(self.w, other.w, tol)
            && approx_eq(self.h, other.h, tol)
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Self) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}+{}+{}", self.w, self.h, self.x, self.y)
    }
}

#[inline]
fn approx_eq(a: i32, b: i32, tol: i32) -> bool {
    (a - b).abs() <= tol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.left(), 10);
        assert_eq!(r.top(), 20);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
    }

    #[test]
    fn approx_eq_is_per_component() {
        let r = Rect::new(100, 100, 500, 400);
        assert!(r.approx_eq(&Rect::new(102, 98, 501, 399), 2));
        assert!(!r.approx_eq(&Rect::new(103, 100, 500, 400), 2));
        assert!(!r.approx_eq(&Rect::new(100, 100, 500, 397), 2));
    }

    #[test]
    fn contains_is_inclusive() {
        let screen = Rect::new(0, 0, 1000, 800);
        assert!(screen.contains(&Rect::new(0, 0, 1000, 800)));
        assert!(screen.contains(&Rect::new(500, 400, 500, 400)));
        assert!(!screen.contains(&Rect::new(501, 400, 500, 400)));
        assert!(!screen.contains(&Rect::new(-1, 0, 10, 10)));
    }

    #[test]
    fn display_geometry_string() {
        assert_eq!(Rect::new(5, 6, 300, 200).to_string(), "300x200+5+6");
    }
}

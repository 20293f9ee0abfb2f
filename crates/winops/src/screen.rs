//! Display geometry reported by [`crate::ScreenOps`].

use serde::{Deserialize, Serialize};

use crate::Rect;

/// One display in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub is_primary: bool,
}

impl Screen {
    /// The display as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

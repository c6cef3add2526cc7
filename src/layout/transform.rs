//! Edge transforms
//!
//! Layout math runs in a canonical frame: `x` runs along the dock edge from
//! the screen's left (or top) side, `y` is the distance from the edge into
//! the screen. These helpers map points and rectangles between that frame
//! and screen coordinates for each [`DockEdge`].

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Screen edge the dock is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockEdge {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

/// Where items sit along the edge in panel mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAlignment {
    Start,
    #[default]
    Center,
    End,
}

impl DockEdge {
    pub fn is_horizontal(self) -> bool {
        matches!(self, DockEdge::Top | DockEdge::Bottom)
    }

    /// Length of the screen along the edge
    pub fn main_length(self, screen: &Rect) -> f32 {
        if self.is_horizontal() {
            screen.width
        } else {
            screen.height
        }
    }

    /// Screen point to canonical frame
    pub fn to_canonical(self, screen: &Rect, p: Point) -> Point {
        match self {
            DockEdge::Bottom => Point::new(p.x - screen.x, screen.bottom() - p.y),
            DockEdge::Top => Point::new(p.x - screen.x, p.y - screen.y),
            DockEdge::Left => Point::new(p.y - screen.y, p.x - screen.x),
            DockEdge::Right => Point::new(p.y - screen.y, screen.right() - p.x),
        }
    }

    /// Canonical point to screen
    pub fn to_screen(self, screen: &Rect, p: Point) -> Point {
        match self {
            DockEdge::Bottom => Point::new(screen.x + p.x, screen.bottom() - p.y),
            DockEdge::Top => Point::new(screen.x + p.x, screen.y + p.y),
            DockEdge::Left => Point::new(screen.x + p.y, screen.y + p.x),
            DockEdge::Right => Point::new(screen.right() - p.y, screen.y + p.x),
        }
    }

    /// Canonical rectangle to screen
    ///
    /// `r.y` is the near side (closest to the edge), `r.height` the depth.
    pub fn rect_to_screen(self, screen: &Rect, r: &Rect) -> Rect {
        match self {
            DockEdge::Bottom => Rect::new(screen.x + r.x, screen.bottom() - r.y - r.height, r.width, r.height),
            DockEdge::Top => Rect::new(screen.x + r.x, screen.y + r.y, r.width, r.height),
            DockEdge::Left => Rect::new(screen.x + r.y, screen.y + r.x, r.height, r.width),
            DockEdge::Right => Rect::new(screen.right() - r.y - r.height, screen.y + r.x, r.height, r.width),
        }
    }
}

//! # Geometry Primitives
//!
//! Everything in the engine is an axis-aligned rectangle in page pixel space.
//! A part image, a parts list, a callout, a page number, the page itself —
//! all of them reduce to a `Rect` plus a `Margins` before the placement
//! machinery ever sees them. Coordinates grow rightward and downward, with
//! the page origin at the top-left corner.

use serde::{Deserialize, Serialize};

/// A point in page pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle: position of the top-left corner plus extents.
///
/// Extents are kept non-negative by construction; the engine never produces
/// a rectangle with a negative width or height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// A rectangle with the given extents at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Move the rectangle so its top-left corner sits at `p`.
    pub fn at(&self, p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            ..*self
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Strict interior overlap. Rectangles that merely share an edge do not
    /// intersect, which is what the packer and the badge collision test want.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Grow outward by the given margins.
    pub fn expand(&self, m: &Margins) -> Rect {
        Rect {
            x: self.x - m.left,
            y: self.y - m.top,
            width: self.width + m.horizontal(),
            height: self.height + m.vertical(),
        }
    }

    /// Shrink inward by the given margins. Extents clamp at zero.
    pub fn inset(&self, m: &Margins) -> Rect {
        Rect::new(
            self.x + m.left,
            self.y + m.top,
            self.width - m.horizontal(),
            self.height - m.vertical(),
        )
    }
}

/// Per-edge values used for margins around every placed element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Margins {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

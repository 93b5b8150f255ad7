//! # Relative Placement
//!
//! Every element on a page is positioned *relative to* some other element's
//! bounding box: the page number hangs off the page edge, a callout hangs off
//! the assembly image, an instance badge hangs off its callout. The full
//! vocabulary is a 5×5 grid of anchors around and inside a reference box:
//!
//! - 9 **inside** anchors — the cells of a 3×3 grid within the reference's
//!   content area (its box inset by its margins);
//! - 12 **outside edge** anchors — one of the four edges, with a justification
//!   running *along* that edge;
//! - 4 **outside corner** anchors — diagonal placement past a corner.
//!
//! Offsets are stored as **fractions of the reference box**, not pixels. When
//! a user drags an element and the reference is later resized (a part list
//! regenerated at a different scale, say), the element keeps the same relative
//! position instead of drifting by a stale pixel amount.
//!
//! `place_relative` is a pure function: it reads the reference and the
//! dependent's extents and produces a position, nothing else. Two dependents
//! that request the same anchor with no offset will overlap; the composer
//! pre-empts that with a deterministic registration order rather than any
//! automatic de-confliction.

use serde::{Deserialize, Serialize};

use crate::geometry::{Margins, Point, Rect};

/// One of the 9 cells of the 3×3 grid inside a reference box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

/// An edge of the reference box, for outside placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Justification along an outside edge: `Start` is left on a horizontal edge
/// and top on a vertical edge; `End` is right/bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Justify {
    Start,
    #[default]
    Center,
    End,
}

/// A corner of the reference box, for diagonal outside placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

/// Where a dependent box goes relative to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Anchor {
    /// One of the 9 positions inside the reference's content area.
    Inside { cell: Cell },
    /// Fully outside one edge, justified along it.
    OutsideEdge { edge: Edge, justify: Justify },
    /// Fully outside, past one corner diagonally.
    OutsideCorner { corner: Corner },
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::Inside { cell: Cell::Center }
    }
}

/// A declarative placement directive attached to an element.
///
/// `relative_to` names the reference element by id; `None` means the page
/// itself. The offset pair is in fractions of the reference box's extents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSpec {
    #[serde(default)]
    pub anchor: Anchor,
    #[serde(default)]
    pub relative_to: Option<String>,
    #[serde(default)]
    pub offset: Offset,
}

impl PlacementSpec {
    pub fn inside(cell: Cell) -> Self {
        Self {
            anchor: Anchor::Inside { cell },
            ..Default::default()
        }
    }

    pub fn outside(edge: Edge, justify: Justify) -> Self {
        Self {
            anchor: Anchor::OutsideEdge { edge, justify },
            ..Default::default()
        }
    }

    pub fn relative_to(mut self, id: &str) -> Self {
        self.relative_to = Some(id.to_string());
        self
    }
}

/// A drag offset as a fraction of the reference box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Compute the absolute position of a dependent box.
///
/// `reference` is the already-positioned reference box with its margins;
/// `dependent` supplies only extents and margins (its position is ignored).
/// Inside anchors place within the reference's content area. Outside anchors
/// leave a gap equal to the larger of the two facing margins, the same
/// pairwise rule the packer uses between columns.
pub fn place_relative(
    reference: &Rect,
    reference_margins: &Margins,
    spec: &PlacementSpec,
    dependent: &Rect,
    dependent_margins: &Margins,
) -> Point {
    let w = dependent.width;
    let h = dependent.height;

    let base = match spec.anchor {
        Anchor::Inside { cell } => {
            let content = reference.inset(reference_margins);
            let x = match cell {
                Cell::TopLeft | Cell::Left | Cell::BottomLeft => content.x,
                Cell::Top | Cell::Center | Cell::Bottom => content.center_x() - w / 2.0,
                Cell::TopRight | Cell::Right | Cell::BottomRight => content.right() - w,
            };
            let y = match cell {
                Cell::TopLeft | Cell::Top | Cell::TopRight => content.y,
                Cell::Left | Cell::Center | Cell::Right => content.center_y() - h / 2.0,
                Cell::BottomLeft | Cell::Bottom | Cell::BottomRight => content.bottom() - h,
            };
            Point::new(x, y)
        }

        Anchor::OutsideEdge { edge, justify } => {
            let gap_top = reference_margins.top.max(dependent_margins.bottom);
            let gap_bottom = reference_margins.bottom.max(dependent_margins.top);
            let gap_left = reference_margins.left.max(dependent_margins.right);
            let gap_right = reference_margins.right.max(dependent_margins.left);
            match edge {
                Edge::Top => Point::new(
                    justify_along(reference.x, reference.width, w, justify),
                    reference.y - gap_top - h,
                ),
                Edge::Bottom => Point::new(
                    justify_along(reference.x, reference.width, w, justify),
                    reference.bottom() + gap_bottom,
                ),
                Edge::Left => Point::new(
                    reference.x - gap_left - w,
                    justify_along(reference.y, reference.height, h, justify),
                ),
                Edge::Right => Point::new(
                    reference.right() + gap_right,
                    justify_along(reference.y, reference.height, h, justify),
                ),
            }
        }

        Anchor::OutsideCorner { corner } => {
            let gap_x = reference_margins
                .horizontal()
                .max(dependent_margins.horizontal())
                / 2.0;
            let gap_y = reference_margins
                .vertical()
                .max(dependent_margins.vertical())
                / 2.0;
            match corner {
                Corner::TopLeft => {
                    Point::new(reference.x - gap_x - w, reference.y - gap_y - h)
                }
                Corner::TopRight => {
                    Point::new(reference.right() + gap_x, reference.y - gap_y - h)
                }
                Corner::BottomRight => {
                    Point::new(reference.right() + gap_x, reference.bottom() + gap_y)
                }
                Corner::BottomLeft => {
                    Point::new(reference.x - gap_x - w, reference.bottom() + gap_y)
                }
            }
        }
    };

    Point::new(
        base.x + spec.offset.x * reference.width,
        base.y + spec.offset.y * reference.height,
    )
}

fn justify_along(start: f64, span: f64, extent: f64, justify: Justify) -> f64 {
    match justify {
        Justify::Start => start,
        Justify::Center => start + (span - extent) / 2.0,
        Justify::End => start + span - extent,
    }
}

/// Union of a reference box and a set of already-positioned dependents.
///
/// Lets a container grow to cover a callout that was placed outside its
/// assembly image: the step's bounding box is re-derived from everything
/// placed so far rather than tracked incrementally.
pub fn bounding(reference: &Rect, placed: &[Rect]) -> Rect {
    placed.iter().fold(*reference, |acc, r| acc.union(r))
}

//! # Silhouette Edge Profiles
//!
//! A rendered part image is mostly transparent pixels: a 1×4 slope viewed at
//! the standard angle fills maybe a third of its bounding box. Packing by
//! bounding box alone wastes all of that space. Instead, each image is
//! reduced to a per-scanline record of where the opaque pixels start and end,
//! and the packer uses those records to slide one part up into the notch of
//! the part above it.
//!
//! This module is the only consumer of raw pixel data in the whole engine.
//! Everything downstream sees extents and profiles, never buffers.

use crate::error::LayoutError;

/// The opaque extent of one scanline: `left` is the first opaque pixel,
/// `right` is one past the last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub left: f64,
    pub right: f64,
}

/// Per-scanline left/right opaque extents of a rendered image.
///
/// Invariant: exactly one entry per image row, `None` for fully transparent
/// rows. Decoration rows (instance count, annotation) appended by the parts
/// list keep the invariant against the part's *decorated* height.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeProfiles {
    rows: Vec<Option<Span>>,
}

impl EdgeProfiles {
    /// Scan an RGBA buffer (row-major, 4 bytes per pixel) for the opaque
    /// extent of each row. A pixel counts as opaque when its alpha is
    /// non-zero.
    pub fn from_rgba(id: &str, width: u32, height: u32, data: &[u8]) -> Result<Self, LayoutError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(LayoutError::BadImageData {
                id: id.to_string(),
                width,
                height,
            });
        }

        let w = width as usize;
        let rows = (0..height as usize)
            .map(|row| {
                let base = row * w * 4;
                let mut first = None;
                let mut last = 0usize;
                for col in 0..w {
                    if data[base + col * 4 + 3] != 0 {
                        if first.is_none() {
                            first = Some(col);
                        }
                        last = col;
                    }
                }
                first.map(|f| Span {
                    left: f as f64,
                    right: (last + 1) as f64,
                })
            })
            .collect();

        Ok(Self { rows })
    }

    /// A profile that treats every row as fully opaque. Used for parts whose
    /// pixel data never reached us (placeholder boxes) and for decoration
    /// sub-boxes, which are always drawn as solid rectangles.
    pub fn rectangular(width: f64, height: usize) -> Self {
        Self {
            rows: vec![
                Some(Span {
                    left: 0.0,
                    right: width,
                });
                height
            ],
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, i: usize) -> Option<Span> {
        self.rows.get(i).copied().flatten()
    }

    /// Append `count` fully opaque rows of the given width at the bottom.
    /// Keeps the one-entry-per-row invariant when a decoration box is stacked
    /// under the part image.
    pub fn extend_solid(&mut self, width: f64, count: usize) {
        self.rows.extend(
            std::iter::repeat(Some(Span {
                left: 0.0,
                right: width,
            }))
            .take(count),
        );
    }
}

/// How far the lower of two left-aligned parts can slide up along the upper
/// part's right edge without any scanline collision.
///
/// For a candidate overlap of `v` rows, the bottom `v` scanlines of `upper`
/// are matched against the top `v` scanlines of `lower`; every matched pair
/// where both rows carry opaque pixels must keep at least `margin` pixels
/// between the upper row's right extent and the lower row's left extent.
/// The largest feasible `v` is returned, in pixels. Two rectangular profiles
/// always yield zero.
pub fn interlock_offset(upper: &EdgeProfiles, lower: &EdgeProfiles, margin: f64) -> f64 {
    let max_v = upper.height().min(lower.height());
    let mut best = 0usize;

    'candidate: for v in 1..=max_v {
        for i in 0..v {
            let upper_row = upper.row(upper.height() - v + i);
            let lower_row = lower.row(i);
            if let (Some(u), Some(l)) = (upper_row, lower_row) {
                if u.right + margin > l.left {
                    continue 'candidate;
                }
            }
        }
        best = v;
    }

    best as f64
}

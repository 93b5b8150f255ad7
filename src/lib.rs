//! # Brickpage
//!
//! A page layout engine for LEGO building instructions.
//!
//! Instruction generators tend to grow their layout logic inside the
//! renderer: elements find each other through global registries, placement
//! falls back through chains of if/else per element type, and draw order is
//! recomputed by scanning the scene for collisions. This keeps working right
//! up until a hidden step number or a deleted callout leaves a dangling
//! reference and the page comes out scrambled.
//!
//! Brickpage does the opposite: **placement is data.** Every element on a
//! page declares where it sits relative to one other element, the whole page
//! becomes an explicit dependency graph, and one resolver pass turns the
//! graph into absolute positions. Broken references are repaired in one
//! place, cycles are an error instead of a hang, and draw order falls out of
//! graph depth.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]      — Layout job: pages, steps, callouts, parts, directives
//!       ↓
//!   [pli]        — Parts-list packing: silhouettes, columns, constraints
//!   [step]       — Step sizing: CSI + satellites via a local graph
//!   [callout]    — Callout sizing, instance badge fitting
//!       ↓
//!   [page]       — Page composer over the placement graph
//!       ↓
//!   Composed JSON — absolute boxes for whatever draws them
//! ```
//!
//! The engine is renderer-agnostic: it consumes measured boxes (text and
//! images arrive as widths and heights) and produces positioned boxes.

pub mod callout;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod model;
pub mod page;
pub mod placement;
pub mod pli;
pub mod profile;
pub mod step;

pub use error::LayoutError;
pub use model::LayoutJob;
pub use page::{compose_document, ComposedDocument, ComposedPage};

/// Compose a layout job.
///
/// This is the primary entry point. Pages that fail to lay out are reported
/// in the result's `errors` rather than failing the whole document.
pub fn compose(job: &LayoutJob) -> ComposedDocument {
    page::compose_document(job)
}

/// Compose a layout job described as JSON, returning the composed layout as
/// JSON.
pub fn compose_json(json: &str) -> Result<String, LayoutError> {
    let job: LayoutJob = serde_json::from_str(json).map_err(LayoutError::parse)?;
    let composed = compose(&job);
    Ok(serde_json::to_string_pretty(&composed)?)
}

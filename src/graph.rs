//! # Placement Dependency Graph
//!
//! The composer never places an element directly. It registers every element
//! of a page into this graph — extents, margins, and a placement directive
//! naming a reference element — and the graph resolves all positions in one
//! pass: dangling references are repaired, the nodes are topologically
//! sorted, and each is placed with [`crate::placement::place_relative`]
//! against its already-resolved reference.
//!
//! Two rules that used to be scattered through per-element conditionals are
//! single generic steps here:
//!
//! - **broken reference repair**: a directive naming an element that is
//!   hidden or absent on this page is redirected to the page root instead of
//!   being special-cased at every call site;
//! - **z-order**: an element's z value is derived from its depth in the
//!   graph (things placed relative to X draw above X) plus a small
//!   user-adjustable offset, instead of being re-derived from on-screen
//!   collision scans.
//!
//! Nodes registered at the same depth resolve in registration order, which
//! is also the tie-break for elements that request the same anchor: the
//! later one overlaps the earlier one, deterministically.

use std::collections::HashMap;

use log::warn;

use crate::error::LayoutError;
use crate::geometry::{Margins, Rect};
use crate::placement::{place_relative, PlacementSpec};

/// Spacing between z bands of consecutive graph depths, leaving room for
/// user offsets within a band.
const Z_DEPTH_BAND: i32 = 16;

#[derive(Debug, Clone)]
struct GraphNode {
    id: String,
    rect: Rect,
    margins: Margins,
    /// `None` for pre-positioned nodes (the page root, packed groups).
    spec: Option<PlacementSpec>,
    z_offset: i32,
}

/// A resolved element: absolute position plus draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedElement {
    pub id: String,
    pub rect: Rect,
    pub margins: Margins,
    pub depth: u32,
    pub z: i32,
}

/// A page's placement graph under construction.
#[derive(Debug)]
pub struct PlacementGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    root: String,
}

impl PlacementGraph {
    /// Start a graph rooted at an already-positioned box, normally the page.
    pub fn new(root_id: &str, rect: Rect, margins: Margins) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            root: root_id.to_string(),
        };
        graph.push(GraphNode {
            id: root_id.to_string(),
            rect,
            margins,
            spec: None,
            z_offset: 0,
        });
        graph
    }

    /// Register an element to be placed by the resolver.
    pub fn add(&mut self, id: &str, width: f64, height: f64, margins: Margins, spec: PlacementSpec) {
        self.push(GraphNode {
            id: id.to_string(),
            rect: Rect::sized(width, height),
            margins,
            spec: Some(spec),
            z_offset: 0,
        });
    }

    /// Register an element whose position was computed elsewhere (a packed
    /// step group, a tucked badge). It still serves as a reference for
    /// others.
    pub fn add_fixed(&mut self, id: &str, rect: Rect, margins: Margins) {
        self.push(GraphNode {
            id: id.to_string(),
            rect,
            margins,
            spec: None,
            z_offset: 0,
        });
    }

    /// Bring-to-front / send-to-back adjustment within an element's depth
    /// band.
    pub fn set_z_offset(&mut self, id: &str, offset: i32) {
        if let Some(&i) = self.index.get(id) {
            self.nodes[i].z_offset = offset.clamp(-(Z_DEPTH_BAND - 1), Z_DEPTH_BAND - 1);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn push(&mut self, node: GraphNode) {
        if let Some(&i) = self.index.get(&node.id) {
            // Re-registration replaces; last writer wins, like the source's
            // per-pass rebuild.
            self.nodes[i] = node;
            return;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Resolve every node to an absolute position.
    ///
    /// Edges naming an unknown reference are repaired to the root first.
    /// Nodes are then processed in passes, registration order within each
    /// pass; a node resolves once its reference has resolved. Anything left
    /// after the passes stop making progress sits on a cycle.
    pub fn resolve(&self) -> Result<Vec<PlacedElement>, LayoutError> {
        self.resolve_impl(false)
    }

    /// Like [`resolve`](Self::resolve), but an unknown reference is an
    /// [`LayoutError::UnknownReference`] instead of being repaired to the
    /// root. For callers validating user-authored placement data.
    pub fn resolve_strict(&self) -> Result<Vec<PlacedElement>, LayoutError> {
        self.resolve_impl(true)
    }

    fn resolve_impl(&self, strict: bool) -> Result<Vec<PlacedElement>, LayoutError> {
        let mut reference: Vec<usize> = Vec::with_capacity(self.nodes.len());
        let root_index = self.index[&self.root];
        for node in &self.nodes {
            let target = match node.spec.as_ref().and_then(|s| s.relative_to.as_ref()) {
                Some(id) => match self.index.get(id) {
                    Some(&i) => i,
                    None if strict => {
                        return Err(LayoutError::UnknownReference {
                            id: node.id.clone(),
                            reference: id.clone(),
                        });
                    }
                    None => {
                        warn!(
                            "`{}` is placed relative to unknown `{}`; using `{}`",
                            node.id, id, self.root
                        );
                        root_index
                    }
                },
                // A directive without a reference is page-relative.
                None => root_index,
            };
            reference.push(target);
        }

        let mut placed: Vec<Option<PlacedElement>> = vec![None; self.nodes.len()];
        let mut remaining = self.nodes.len();

        // Fixed nodes resolve immediately at depth 0.
        for (i, node) in self.nodes.iter().enumerate() {
            if node.spec.is_none() {
                placed[i] = Some(PlacedElement {
                    id: node.id.clone(),
                    rect: node.rect,
                    margins: node.margins,
                    depth: 0,
                    z: node.z_offset,
                });
                remaining -= 1;
            }
        }

        while remaining > 0 {
            let mut progressed = false;
            for i in 0..self.nodes.len() {
                if placed[i].is_some() {
                    continue;
                }
                let r = reference[i];
                let Some(reference_placed) = placed[r].clone() else {
                    continue;
                };
                let node = &self.nodes[i];
                let spec = node.spec.as_ref().expect("unresolved node has a spec");
                let position = place_relative(
                    &reference_placed.rect,
                    &reference_placed.margins,
                    spec,
                    &node.rect,
                    &node.margins,
                );
                let depth = reference_placed.depth + 1;
                placed[i] = Some(PlacedElement {
                    id: node.id.clone(),
                    rect: node.rect.at(position),
                    margins: node.margins,
                    depth,
                    z: depth as i32 * Z_DEPTH_BAND + node.z_offset,
                });
                remaining -= 1;
                progressed = true;
            }
            if !progressed {
                let stuck = self
                    .nodes
                    .iter()
                    .enumerate()
                    .find(|(i, _)| placed[*i].is_none())
                    .map(|(_, n)| n.id.clone())
                    .unwrap_or_default();
                return Err(LayoutError::CyclicPlacement { id: stuck });
            }
        }

        Ok(placed.into_iter().map(|p| p.expect("all resolved")).collect())
    }
}

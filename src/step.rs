//! # Step Sizing and Range Packing
//!
//! A step is the assembly image (CSI) with its satellites: step number,
//! per-step parts list, submodel preview, rotate icon, callouts. Sizing a
//! step is a miniature composition: each satellite is registered into a
//! placement graph rooted at the CSI, the graph resolves, and the step's
//! extents are the bounding union of everything placed. An element whose
//! directive names a hidden satellite (a suppressed step number, usually)
//! falls back to the CSI through the graph's dangling-edge repair; there is
//! no per-element conditional chain for that anymore.
//!
//! Ranges of steps (step groups, callout interiors) are packed by
//! `pack_steps`: plain greedy partitioning of whole-step boxes into columns
//! or rows, the bounding-box cousin of the silhouette packer in
//! [`crate::pli`].

use crate::callout::size_callout;
use crate::error::LayoutError;
use crate::geometry::{Margins, Point, Rect};
use crate::graph::PlacementGraph;
use crate::model::{FlowDirection, Step};
use crate::page::{ComposedElement, ElementKind};
use crate::placement::{Corner, Edge, Justify, PlacementSpec};
use crate::pli::{build_parts, size_parts, sort_parts, ImageStore};

/// A fully sized step: extents plus its composed content tree, positions
/// relative to the step origin.
#[derive(Debug, Clone)]
pub struct SizedStep {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    children: Vec<ComposedElement>,
}

impl SizedStep {
    /// Wrap the step's children under a single `Step` element.
    pub fn into_tree(self) -> ComposedElement {
        let mut root = ComposedElement::leaf(&self.id, ElementKind::Step, Rect::sized(self.width, self.height));
        root.children = self.children;
        root
    }
}

/// Conventional placement for satellites whose directive was left at its
/// default: the document side only writes a directive when the user moved
/// something.
fn default_spec(spec: &PlacementSpec, fallback: PlacementSpec) -> PlacementSpec {
    if *spec == PlacementSpec::default() {
        fallback
    } else {
        spec.clone()
    }
}

/// Size one step.
///
/// The CSI sits at the graph root; satellites place themselves around it.
/// Defaults: step number past the top-left corner, parts list along the top
/// edge, submodel preview past the top-right corner, rotate icon under the
/// bottom edge, callouts along the left edge.
pub fn size_step(
    step: &Step,
    images: &ImageStore,
    resolution: f64,
    avail_width: f64,
    avail_height: f64,
) -> Result<SizedStep, LayoutError> {
    let csi_id = step.csi.id.as_str();
    let mut graph = PlacementGraph::new(
        csi_id,
        Rect::sized(step.csi.width, step.csi.height),
        step.csi.margins,
    );

    let step_number = step.step_number.as_ref().map(|n| {
        let spec = default_spec(
            &n.placement,
            PlacementSpec {
                anchor: crate::placement::Anchor::OutsideCorner {
                    corner: Corner::TopLeft,
                },
                relative_to: Some(csi_id.to_string()),
                ..Default::default()
            },
        );
        graph.add(&n.id, n.width, n.height, n.margins, spec);
        n.id.clone()
    });

    let pli = step.pli.as_ref().map(|list| {
        let mut parts = build_parts(&list.parts, images);
        sort_parts(&mut parts, &list.sort, false);
        let packing = size_parts(&parts, list.constraint, avail_width, avail_height, resolution);
        let spec = default_spec(
            &list.placement,
            PlacementSpec::outside(Edge::Top, Justify::Start).relative_to(csi_id),
        );
        graph.add(&list.id, packing.width, packing.height, list.margins, spec);
        (list.id.clone(), parts, packing)
    });

    if let Some(sub) = &step.submodel {
        let spec = default_spec(
            &sub.placement,
            PlacementSpec {
                anchor: crate::placement::Anchor::OutsideCorner {
                    corner: Corner::TopRight,
                },
                relative_to: Some(csi_id.to_string()),
                ..Default::default()
            },
        );
        graph.add(&sub.id, sub.width, sub.height, sub.margins, spec);
    }

    if let Some(icon) = &step.rotate_icon {
        let spec = default_spec(
            &icon.placement,
            PlacementSpec::outside(Edge::Bottom, Justify::Center).relative_to(csi_id),
        );
        graph.add(&icon.id, icon.width, icon.height, icon.margins, spec);
    }

    let mut callouts = Vec::with_capacity(step.callouts.len());
    for c in &step.callouts {
        let sized = size_callout(c, images, resolution, avail_width, avail_height)?;
        let spec = default_spec(
            &sized.placement,
            PlacementSpec::outside(Edge::Left, Justify::Start).relative_to(csi_id),
        );
        graph.add(&sized.id, sized.width, sized.height, sized.margins, spec);
        callouts.push(sized);
    }

    // User directives can tie satellites into a knot; that fails the step
    // (and with it the page) rather than producing a half-placed layout.
    let placed = graph.resolve()?;

    let bound = placed
        .iter()
        .map(|p| p.rect)
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(|| Rect::sized(step.csi.width, step.csi.height));

    let mut children: Vec<ComposedElement> = Vec::new();
    for p in &placed {
        let rect = p.rect.translate(-bound.x, -bound.y);
        let before = children.len();
        if p.id == csi_id {
            children.push(ComposedElement::leaf(&p.id, ElementKind::Csi, rect));
        } else if Some(&p.id) == step_number.as_ref() {
            children.push(ComposedElement::leaf(&p.id, ElementKind::StepNumber, rect));
        } else if let Some((pli_id, parts, packing)) = pli.as_ref().filter(|(id, _, _)| *id == p.id)
        {
            children.push(crate::page::pli_element(pli_id, parts, packing, rect));
        } else if let Some(sized) = callouts.iter().find(|c| c.id == p.id) {
            let mut el =
                ComposedElement::leaf(&sized.id, ElementKind::Callout, rect);
            el.children = sized.children.clone();
            for child in &mut el.children {
                crate::page::offset_tree(child, rect.x, rect.y);
            }
            children.push(el);
        } else if step.submodel.as_ref().map(|s| &s.id) == Some(&p.id) {
            children.push(ComposedElement::leaf(&p.id, ElementKind::Submodel, rect));
        } else if step.rotate_icon.as_ref().map(|s| &s.id) == Some(&p.id) {
            children.push(ComposedElement::leaf(&p.id, ElementKind::RotateIcon, rect));
        }
        if let Some(el) = children.get_mut(before) {
            el.z = p.z;
        }
    }

    Ok(SizedStep {
        id: step.id.clone(),
        width: bound.width,
        height: bound.height,
        margins: step.margins,
        children,
    })
}

/// Pack sized steps into columns (vertical flow) or rows (horizontal flow).
///
/// Greedy, at least one step per column/row so an oversized step can never
/// stall the packing. Gaps use the pairwise larger-margin rule. Returns the
/// step origins plus overall extents.
pub fn pack_steps(
    steps: &[SizedStep],
    direction: FlowDirection,
    limit: f64,
) -> (Vec<Point>, f64, f64) {
    let mut positions = Vec::with_capacity(steps.len());
    let mut total_w = 0.0f64;
    let mut total_h = 0.0f64;

    match direction {
        FlowDirection::Vertical => {
            let mut col_x = 0.0f64;
            let mut col_w = 0.0f64;
            let mut col_right_margin = 0.0f64;
            let mut y = 0.0f64;
            let mut prev_bottom_margin = 0.0f64;
            for (i, step) in steps.iter().enumerate() {
                let gap = prev_bottom_margin.max(step.margins.top);
                let next_y = if y == 0.0 { 0.0 } else { y + gap };
                if i > 0 && next_y + step.height > limit {
                    // Close the column.
                    col_x += col_w
                        + col_right_margin.max(step.margins.left);
                    col_w = 0.0;
                    col_right_margin = 0.0;
                    positions.push(Point::new(col_x, 0.0));
                    y = step.height;
                } else {
                    positions.push(Point::new(col_x, next_y));
                    y = next_y + step.height;
                }
                col_w = col_w.max(step.width);
                col_right_margin = col_right_margin.max(step.margins.right);
                prev_bottom_margin = step.margins.bottom;
                total_w = total_w.max(col_x + col_w);
                total_h = total_h.max(y);
            }
        }
        FlowDirection::Horizontal => {
            let mut row_y = 0.0f64;
            let mut row_h = 0.0f64;
            let mut row_bottom_margin = 0.0f64;
            let mut x = 0.0f64;
            let mut prev_right_margin = 0.0f64;
            for (i, step) in steps.iter().enumerate() {
                let gap = prev_right_margin.max(step.margins.left);
                let next_x = if x == 0.0 { 0.0 } else { x + gap };
                if i > 0 && next_x + step.width > limit {
                    row_y += row_h + row_bottom_margin.max(step.margins.top);
                    row_h = 0.0;
                    row_bottom_margin = 0.0;
                    x = 0.0;
                    positions.push(Point::new(0.0, row_y));
                    x = step.width;
                } else {
                    positions.push(Point::new(next_x, row_y));
                    x = next_x + step.width;
                }
                row_h = row_h.max(step.height);
                row_bottom_margin = row_bottom_margin.max(step.margins.bottom);
                prev_right_margin = step.margins.right;
                total_h = total_h.max(row_y + row_h);
                total_w = total_w.max(x);
            }
        }
    }

    (positions, total_w, total_h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementBox, PartEntry, PartList, SizeConstraint};

    fn sized(id: &str, w: f64, h: f64, m: f64) -> SizedStep {
        SizedStep {
            id: id.to_string(),
            width: w,
            height: h,
            margins: Margins::uniform(m),
            children: vec![],
        }
    }

    #[test]
    fn test_vertical_pack_breaks_columns_at_limit() {
        let steps = vec![
            sized("a", 100.0, 90.0, 0.0),
            sized("b", 100.0, 90.0, 0.0),
            sized("c", 100.0, 90.0, 0.0),
        ];
        let (pos, w, h) = pack_steps(&steps, FlowDirection::Vertical, 200.0);
        assert_eq!(pos[0], Point::new(0.0, 0.0));
        assert_eq!(pos[1], Point::new(0.0, 90.0));
        assert_eq!(pos[2], Point::new(100.0, 0.0));
        assert_eq!(w, 200.0);
        assert_eq!(h, 180.0);
    }

    #[test]
    fn test_horizontal_pack_breaks_rows_at_limit() {
        let steps = vec![
            sized("a", 90.0, 50.0, 0.0),
            sized("b", 90.0, 50.0, 0.0),
            sized("c", 90.0, 50.0, 0.0),
        ];
        let (pos, w, h) = pack_steps(&steps, FlowDirection::Horizontal, 200.0);
        assert_eq!(pos[2], Point::new(0.0, 50.0));
        assert_eq!(w, 180.0);
        assert_eq!(h, 100.0);
    }

    #[test]
    fn test_oversized_step_gets_its_own_column() {
        let steps = vec![sized("a", 50.0, 400.0, 0.0), sized("b", 50.0, 60.0, 0.0)];
        let (pos, _, h) = pack_steps(&steps, FlowDirection::Vertical, 100.0);
        assert_eq!(pos[0], Point::new(0.0, 0.0));
        assert_eq!(pos[1].x, 50.0);
        assert_eq!(h, 400.0);
    }

    #[test]
    fn test_step_bounds_cover_all_satellites() {
        let mut step = Step::new("s1", 300.0, 200.0);
        step.step_number = Some(ElementBox::new("s1.num", 20.0, 16.0));
        step.pli = Some(PartList {
            id: "s1.pli".to_string(),
            parts: vec![PartEntry::new("3001", "4", 60.0, 40.0)],
            constraint: SizeConstraint::Height { max: 100.0 },
            sort: vec![],
            placement: PlacementSpec::default(),
            margins: Margins::uniform(4.0),
        });
        let sized = size_step(&step, &ImageStore::default(), 96.0, 800.0, 1000.0).unwrap();
        // Everything shifted into positive space.
        assert!(sized.width >= 300.0);
        assert!(sized.height >= 200.0 + 40.0);
        let tree = sized.into_tree();
        for child in &tree.children {
            assert!(child.x >= -1e-9, "{} at negative x", child.id);
            assert!(child.y >= -1e-9, "{} at negative y", child.id);
        }
    }

    #[test]
    fn test_hidden_step_number_redirects_dependents_to_csi() {
        // The rotate icon explicitly targets the step number; with the step
        // number suppressed the directive repairs to the CSI root.
        let mut step = Step::new("s1", 300.0, 200.0);
        step.rotate_icon = Some(
            ElementBox::new("s1.rot", 24.0, 24.0).with_placement(
                PlacementSpec::outside(Edge::Bottom, Justify::Center).relative_to("s1.num"),
            ),
        );
        let sized = size_step(&step, &ImageStore::default(), 96.0, 800.0, 1000.0).unwrap();
        let tree = sized.into_tree();
        let csi = tree.children.iter().find(|c| c.kind == ElementKind::Csi).unwrap();
        let rot = tree
            .children
            .iter()
            .find(|c| c.kind == ElementKind::RotateIcon)
            .unwrap();
        assert!(rot.y >= csi.y + csi.height);
    }
}

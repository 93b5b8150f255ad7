//! # Page Composition
//!
//! The top of the engine: one call per page turns the declarative input
//! model into a tree of positioned boxes. Every top-level element of the
//! page — header, footer, page number, the step or step group, cover
//! attributes, inserts — is registered into a [`PlacementGraph`] rooted at
//! the page box and resolved in one pass. Content that has internal
//! structure (steps, callouts, parts lists) is sized first by the lower
//! layers and enters the graph as a single opaque box; its subtree is
//! spliced into the output afterwards.
//!
//! All coordinates in the composed tree are page-absolute. `z` orders
//! siblings that overlap; elements list in registration order otherwise.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::Rect;
use crate::graph::PlacementGraph;
use crate::model::{
    AttributeKind, FlowDirection, Insert, LayoutJob, Page, PageConfig, PageContent, PageKind,
    SizeConstraint, StepGroup,
};
use crate::placement::{Cell, Edge, Justify, PlacementSpec};
use crate::pli::{build_parts, pack_parts, size_parts, sort_parts, ImageStore, Packing, PliPart};
use crate::step::{pack_steps, size_step, SizedStep};

/// Reserved id of the page box every graph is rooted at.
pub const PAGE_ROOT: &str = "page";

/// What a composed box is, for renderers and for collision queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    PageHeader,
    PageFooter,
    PageNumber,
    Attribute,
    TextInsert,
    PixmapInsert,
    Bom,
    PagePointer,
    InstanceBadge,
    Step,
    StepGroup,
    Csi,
    StepNumber,
    Pli,
    PliPart,
    PartImage,
    Annotation,
    InstanceCount,
    Callout,
    CalloutBadge,
    Submodel,
    RotateIcon,
}

/// One positioned box of the output, page-absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedElement {
    pub id: String,
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,

    /// Draw order among overlapping siblings; higher draws later.
    #[serde(default)]
    pub z: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComposedElement>,
}

impl ComposedElement {
    pub fn leaf(id: &str, kind: ElementKind, rect: Rect) -> Self {
        Self {
            id: id.to_string(),
            kind,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            z: 0,
            children: Vec::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// True if this element or any descendant of the given kind intersects
    /// the rect.
    pub fn any_of_kind_intersects(&self, kind: ElementKind, rect: &Rect) -> bool {
        if self.kind == kind && self.rect().intersects(rect) {
            return true;
        }
        self.children
            .iter()
            .any(|c| c.any_of_kind_intersects(kind, rect))
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&ComposedElement> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

/// Shift an element and its whole subtree.
pub fn offset_tree(el: &mut ComposedElement, dx: f64, dy: f64) {
    el.x += dx;
    el.y += dy;
    for child in &mut el.children {
        offset_tree(child, dx, dy);
    }
}

/// Build the output subtree of a packed parts list.
pub fn pli_element(id: &str, parts: &[PliPart], packing: &Packing, rect: Rect) -> ComposedElement {
    let mut root = ComposedElement::leaf(id, ElementKind::Pli, rect);
    for packed in &packing.parts {
        let part = &parts[packed.index];
        let at = packed.rect.translate(rect.x, rect.y);
        let part_id = format!("{id}.{}", part.key);
        let mut el = ComposedElement::leaf(&part_id, ElementKind::PliPart, at);
        el.children.push(ComposedElement::leaf(
            &format!("{part_id}.image"),
            ElementKind::PartImage,
            part.image_rect.translate(at.x, at.y),
        ));
        if let Some(r) = part.annotation_rect {
            el.children.push(ComposedElement::leaf(
                &format!("{part_id}.annotation"),
                ElementKind::Annotation,
                r.translate(at.x, at.y),
            ));
        }
        if let Some(r) = part.instance_count_rect {
            el.children.push(ComposedElement::leaf(
                &format!("{part_id}.count"),
                ElementKind::InstanceCount,
                r.translate(at.x, at.y),
            ));
        }
        root.children.push(el);
    }
    root
}

/// One fully composed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedPage {
    pub number: u32,
    pub kind: PageKind,
    pub width: f64,
    pub height: f64,
    pub elements: Vec<ComposedElement>,
}

/// A page that failed to compose, reported in the output instead of
/// aborting the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageError {
    pub page: u32,
    pub error: String,
}

/// The composed document: every page that laid out, plus the failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedDocument {
    pub pages: Vec<ComposedPage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<PageError>,
}

/// Front cover attribute chain, in placement order.
const FRONT_COVER_CHAIN: [AttributeKind; 6] = [
    AttributeKind::Title,
    AttributeKind::ModelName,
    AttributeKind::Author,
    AttributeKind::Parts,
    AttributeKind::ModelDescription,
    AttributeKind::PublishDescription,
];

/// Back cover attribute chain.
const BACK_COVER_CHAIN: [AttributeKind; 7] = [
    AttributeKind::Title,
    AttributeKind::Author,
    AttributeKind::Copyright,
    AttributeKind::Url,
    AttributeKind::Email,
    AttributeKind::Disclaimer,
    AttributeKind::Plug,
];

/// How a graph node's subtree is reconstituted after the resolve.
enum Pending {
    Leaf(ElementKind),
    Step(SizedStep),
    Group {
        steps: Vec<SizedStep>,
        positions: Vec<crate::geometry::Point>,
    },
    Bom {
        parts: Vec<PliPart>,
        packing: Packing,
    },
}

fn default_spec(spec: &PlacementSpec, fallback: PlacementSpec) -> PlacementSpec {
    if *spec == PlacementSpec::default() {
        fallback
    } else {
        spec.clone()
    }
}

/// Compose one page.
///
/// Registration order doubles as the same-anchor tie-break: header and
/// footer go in first, then the page number, the main content, cover
/// attributes and finally the inserts.
pub fn compose_page(
    page: &Page,
    config: &PageConfig,
    images: &ImageStore,
    resolution: f64,
) -> Result<ComposedPage, LayoutError> {
    let page_rect = Rect::sized(config.width, config.height);
    let content = page_rect.inset(&config.margins);

    let mut graph = PlacementGraph::new(PAGE_ROOT, page_rect, config.margins);
    let mut pending: HashMap<String, Pending> = HashMap::new();

    if let Some(header) = &page.header {
        let spec = default_spec(&header.placement, PlacementSpec::inside(Cell::Top));
        graph.add(&header.id, header.width, header.height, header.margins, spec);
        pending.insert(header.id.clone(), Pending::Leaf(ElementKind::PageHeader));
    }
    if let Some(footer) = &page.footer {
        let spec = default_spec(&footer.placement, PlacementSpec::inside(Cell::Bottom));
        graph.add(&footer.id, footer.width, footer.height, footer.margins, spec);
        pending.insert(footer.id.clone(), Pending::Leaf(ElementKind::PageFooter));
    }
    if let Some(number) = &page.page_number {
        let spec = default_spec(&number.placement, PlacementSpec::inside(Cell::BottomRight));
        graph.add(&number.id, number.width, number.height, number.margins, spec);
        pending.insert(number.id.clone(), Pending::Leaf(ElementKind::PageNumber));
    }

    match &page.content {
        PageContent::Empty => {}
        PageContent::Step { step } => {
            let sized = size_step(step, images, resolution, content.width, content.height)?;
            graph.add(
                &step.id,
                sized.width,
                sized.height,
                step.margins,
                PlacementSpec::inside(Cell::Center),
            );
            pending.insert(step.id.clone(), Pending::Step(sized));
        }
        PageContent::StepGroup { group } => {
            register_group(group, images, resolution, &content, &mut graph, &mut pending)?;
        }
    }

    if matches!(page.kind, PageKind::FrontCover | PageKind::BackCover) {
        register_cover_chain(page, &mut graph, &mut pending);
    }

    for insert in &page.inserts {
        match insert {
            Insert::Text { element } => {
                graph.add(
                    &element.id,
                    element.width,
                    element.height,
                    element.margins,
                    element.placement.clone(),
                );
                pending.insert(element.id.clone(), Pending::Leaf(ElementKind::TextInsert));
            }
            Insert::Pixmap { element } => {
                graph.add(
                    &element.id,
                    element.width,
                    element.height,
                    element.margins,
                    element.placement.clone(),
                );
                pending.insert(element.id.clone(), Pending::Leaf(ElementKind::PixmapInsert));
            }
            Insert::Bom { list, slice } => {
                let mut parts = build_parts(&list.parts, images);
                // Slices of a split list must share one global order, so
                // only the primary key participates.
                sort_parts(&mut parts, &list.sort, true);
                let slices = bom_slices(&parts, content.width, content.height);
                let Some(range) = slices.get(*slice as usize) else {
                    warn!(
                        "page {}: BOM slice {} of `{}` is out of range ({} slices)",
                        page.number,
                        slice,
                        list.id,
                        slices.len()
                    );
                    continue;
                };
                let chunk: Vec<PliPart> = parts[range.clone()].to_vec();
                let packing = size_parts(
                    &chunk,
                    SizeConstraint::Height {
                        max: content.height,
                    },
                    content.width,
                    content.height,
                    resolution,
                );
                let spec = default_spec(&list.placement, PlacementSpec::inside(Cell::Center));
                graph.add(&list.id, packing.width, packing.height, list.margins, spec);
                pending.insert(
                    list.id.clone(),
                    Pending::Bom {
                        parts: chunk,
                        packing,
                    },
                );
            }
        }
    }

    let placed = graph.resolve()?;

    let mut elements = Vec::with_capacity(placed.len());
    for p in placed {
        if p.id == PAGE_ROOT {
            continue;
        }
        let Some(entry) = pending.remove(&p.id) else {
            continue;
        };
        let mut el = match entry {
            Pending::Leaf(kind) => ComposedElement::leaf(&p.id, kind, p.rect),
            Pending::Step(sized) => {
                let mut tree = sized.into_tree();
                offset_tree(&mut tree, p.rect.x, p.rect.y);
                tree
            }
            Pending::Group { steps, positions } => {
                let mut root = ComposedElement::leaf(&p.id, ElementKind::StepGroup, p.rect);
                for (step, at) in steps.into_iter().zip(positions) {
                    let mut tree = step.into_tree();
                    offset_tree(&mut tree, p.rect.x + at.x, p.rect.y + at.y);
                    root.children.push(tree);
                }
                root
            }
            Pending::Bom { parts, packing } => {
                let mut el = pli_element(&p.id, &parts, &packing, p.rect);
                el.kind = ElementKind::Bom;
                el
            }
        };
        el.z = p.z;
        elements.push(el);
    }

    Ok(ComposedPage {
        number: page.number,
        kind: page.kind,
        width: config.width,
        height: config.height,
        elements,
    })
}

fn register_group(
    group: &StepGroup,
    images: &ImageStore,
    resolution: f64,
    content: &Rect,
    graph: &mut PlacementGraph,
    pending: &mut HashMap<String, Pending>,
) -> Result<(), LayoutError> {
    if group.steps.is_empty() {
        return Err(LayoutError::MalformedTree(format!(
            "step group `{}` contains no steps",
            group.id
        )));
    }
    let sized = group
        .steps
        .iter()
        .map(|s| size_step(s, images, resolution, content.width, content.height))
        .collect::<Result<Vec<_>, _>>()?;
    let limit = match group.direction {
        FlowDirection::Vertical => content.height,
        FlowDirection::Horizontal => content.width,
    };
    let (positions, width, height) = pack_steps(&sized, group.direction, limit.max(1.0));

    let spec = default_spec(&group.placement, PlacementSpec::inside(Cell::Center));
    graph.add(&group.id, width, height, group.margins, spec);
    pending.insert(
        group.id.clone(),
        Pending::Group {
            steps: sized,
            positions,
        },
    );

    for pointer in &group.page_pointers {
        let spec = default_spec(&pointer.placement, PlacementSpec::inside(Cell::Right));
        graph.add(
            &pointer.id,
            pointer.width,
            pointer.height,
            pointer.margins,
            spec,
        );
        pending.insert(pointer.id.clone(), Pending::Leaf(ElementKind::PagePointer));
    }

    if group.instances > 1 {
        if let Some(badge) = &group.badge {
            let spec = default_spec(
                &badge.placement,
                PlacementSpec::inside(Cell::BottomRight).relative_to(&group.id),
            );
            graph.add(&badge.id, badge.width, badge.height, badge.margins, spec);
            pending.insert(badge.id.clone(), Pending::Leaf(ElementKind::InstanceBadge));
        }
    }
    Ok(())
}

/// Register the cover attributes.
///
/// Chained kinds hang off the previous visible chain member, top to bottom;
/// the first one anchors in the page's top band. A hidden attribute drops
/// out of the chain entirely, so its successor links to the one above it. An
/// overridden attribute uses its own directive as written (a dangling
/// reference in it repairs to the page, the graph's generic rule) and still
/// anchors its successor.
fn register_cover_chain(
    page: &Page,
    graph: &mut PlacementGraph,
    pending: &mut HashMap<String, Pending>,
) {
    let chain: &[AttributeKind] = match page.kind {
        PageKind::FrontCover => &FRONT_COVER_CHAIN,
        PageKind::BackCover => &BACK_COVER_CHAIN,
        PageKind::Content => return,
    };

    let mut prev: Option<String> = None;
    for kind in chain {
        let Some(attr) = page.attributes.iter().find(|a| a.kind == *kind) else {
            continue;
        };
        if attr.hidden {
            continue;
        }
        let el = &attr.element;
        let spec = if attr.placement_override {
            el.placement.clone()
        } else {
            match &prev {
                None => PlacementSpec::inside(Cell::Top),
                Some(p) => PlacementSpec::outside(Edge::Bottom, Justify::Center).relative_to(p),
            }
        };
        graph.add(&el.id, el.width, el.height, el.margins, spec);
        pending.insert(el.id.clone(), Pending::Leaf(ElementKind::Attribute));
        prev = Some(el.id.clone());
    }

    // Attributes outside this cover's chain still show, on their own terms.
    for attr in &page.attributes {
        if attr.hidden || chain.contains(&attr.kind) {
            continue;
        }
        let el = &attr.element;
        graph.add(&el.id, el.width, el.height, el.margins, el.placement.clone());
        pending.insert(el.id.clone(), Pending::Leaf(ElementKind::Attribute));
    }
}

/// Partition a sorted BOM into page-sized slices.
///
/// Each slice is the longest prefix of the remainder whose packing fits the
/// content area; an entry too large for a page still gets a slice of its
/// own, oversized, rather than stalling the split.
fn bom_slices(parts: &[PliPart], avail_width: f64, avail_height: f64) -> Vec<std::ops::Range<usize>> {
    let mut slices = Vec::new();
    let mut start = 0;
    while start < parts.len() {
        let mut good = start + 1;
        let mut end = start + 1;
        while end <= parts.len() {
            match pack_parts(&parts[start..end], avail_width, avail_height) {
                Ok(p) if p.width <= avail_width => {
                    good = end;
                    end += 1;
                }
                _ => break,
            }
        }
        slices.push(start..good);
        start = good;
    }
    slices
}

/// Compose every page of a job.
///
/// A page that fails to lay out is logged and reported in the output's
/// `errors`; the rest of the document still composes.
pub fn compose_document(job: &LayoutJob) -> ComposedDocument {
    let images = ImageStore::from_entries(&job.images);
    let mut pages = Vec::with_capacity(job.pages.len());
    let mut errors = Vec::new();

    for page in &job.pages {
        match compose_page(page, &job.page, &images, job.resolution) {
            Ok(composed) => pages.push(composed),
            Err(err) => {
                warn!("page {} failed to compose: {err}", page.number);
                errors.push(PageError {
                    page: page.number,
                    error: err.to_string(),
                });
            }
        }
    }

    ComposedDocument { pages, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Margins;
    use crate::model::{
        CoverAttribute, ElementBox, PartEntry, PartList, Step,
    };
    use crate::placement::Anchor;

    fn page_config() -> PageConfig {
        PageConfig {
            width: 800.0,
            height: 1000.0,
            margins: Margins::uniform(20.0),
        }
    }

    fn content_page(number: u32) -> Page {
        Page {
            number,
            kind: PageKind::Content,
            header: None,
            footer: None,
            page_number: None,
            content: PageContent::Empty,
            attributes: vec![],
            inserts: vec![],
        }
    }

    fn find<'a>(page: &'a ComposedPage, id: &str) -> &'a ComposedElement {
        page.elements
            .iter()
            .find_map(|e| e.find(id))
            .unwrap_or_else(|| panic!("no element `{id}`"))
    }

    #[test]
    fn test_header_footer_and_page_number_defaults() {
        let mut page = content_page(1);
        page.header = Some(ElementBox::new("hdr", 760.0, 30.0));
        page.footer = Some(ElementBox::new("ftr", 760.0, 30.0));
        page.page_number = Some(ElementBox::new("num", 20.0, 16.0));

        let composed =
            compose_page(&page, &page_config(), &ImageStore::default(), 96.0).unwrap();

        let hdr = find(&composed, "hdr");
        assert_eq!(hdr.y, 20.0);
        assert_eq!(hdr.x, 20.0);
        let ftr = find(&composed, "ftr");
        assert_eq!(ftr.y, 1000.0 - 20.0 - 30.0);
        let num = find(&composed, "num");
        assert_eq!(num.x, 800.0 - 20.0 - 20.0);
        assert_eq!(num.y, 1000.0 - 20.0 - 16.0);
    }

    #[test]
    fn test_single_step_page_centers_and_splices() {
        let mut page = content_page(4);
        let mut step = Step::new("s4", 300.0, 200.0);
        step.pli = Some(PartList {
            id: "s4.pli".to_string(),
            parts: vec![PartEntry::new("3001", "4", 60.0, 40.0)],
            constraint: SizeConstraint::Height { max: 200.0 },
            sort: vec![],
            placement: PlacementSpec::default(),
            margins: Margins::uniform(4.0),
        });
        page.content = PageContent::Step { step };

        let composed =
            compose_page(&page, &page_config(), &ImageStore::default(), 96.0).unwrap();

        let step_el = find(&composed, "s4");
        assert_eq!(step_el.kind, ElementKind::Step);
        // Centered in the content area.
        let cx = step_el.x + step_el.width / 2.0;
        assert!((cx - 400.0).abs() < 1e-6);
        // The spliced subtree is page-absolute.
        let csi = find(&composed, "s4.csi");
        assert!(csi.x >= step_el.x && csi.y >= step_el.y);
        let pli = find(&composed, "s4.pli");
        assert_eq!(pli.kind, ElementKind::Pli);
        assert!(pli.rect().bottom() <= csi.y + 1e-6);
    }

    #[test]
    fn test_front_cover_chain_stacks_below_title() {
        let mut page = content_page(1);
        page.kind = PageKind::FrontCover;
        page.attributes = vec![
            CoverAttribute {
                kind: AttributeKind::Author,
                element: ElementBox::new("author", 200.0, 20.0),
                placement_override: false,
                hidden: false,
            },
            CoverAttribute {
                kind: AttributeKind::Title,
                element: ElementBox::new("title", 400.0, 40.0),
                placement_override: false,
                hidden: false,
            },
        ];

        let composed =
            compose_page(&page, &page_config(), &ImageStore::default(), 96.0).unwrap();

        let title = find(&composed, "title");
        let author = find(&composed, "author");
        assert_eq!(title.y, 20.0);
        assert!(author.y >= title.y + title.height);
        // Chained below the title, centered on it.
        let title_cx = title.x + title.width / 2.0;
        let author_cx = author.x + author.width / 2.0;
        assert!((title_cx - author_cx).abs() < 1e-6);
    }

    #[test]
    fn test_hidden_chain_member_relinks_successor() {
        let mut page = content_page(30);
        page.kind = PageKind::BackCover;
        let attr = |kind, id: &str, hidden| CoverAttribute {
            kind,
            element: ElementBox::new(id, 200.0, 20.0),
            placement_override: false,
            hidden,
        };
        page.attributes = vec![
            attr(AttributeKind::Title, "title", false),
            attr(AttributeKind::Author, "author", true),
            attr(AttributeKind::Copyright, "copyright", false),
        ];

        let composed =
            compose_page(&page, &page_config(), &ImageStore::default(), 96.0).unwrap();

        assert!(composed.elements.iter().all(|e| e.id != "author"));
        let title = find(&composed, "title");
        let copyright = find(&composed, "copyright");
        // Directly below the title, the hidden author dropped out.
        assert_eq!(copyright.y, title.y + title.height);
    }

    #[test]
    fn test_overridden_attribute_with_dangling_reference_repairs_to_page() {
        let mut page = content_page(30);
        page.kind = PageKind::BackCover;
        page.attributes = vec![CoverAttribute {
            kind: AttributeKind::Plug,
            element: ElementBox::new("plug", 100.0, 20.0).with_placement(PlacementSpec {
                anchor: Anchor::Inside { cell: Cell::BottomLeft },
                relative_to: Some("gone".to_string()),
                ..Default::default()
            }),
            placement_override: true,
            hidden: false,
        }];

        let composed =
            compose_page(&page, &page_config(), &ImageStore::default(), 96.0).unwrap();
        let plug = find(&composed, "plug");
        // Repaired to the page: bottom-left of the content area.
        assert_eq!(plug.x, 20.0);
        assert_eq!(plug.y, 1000.0 - 20.0 - 20.0);
    }

    #[test]
    fn test_group_page_packs_steps_and_places_badge() {
        let mut page = content_page(7);
        let mut group = StepGroup::new(
            "g7",
            vec![Step::new("s1", 200.0, 150.0), Step::new("s2", 200.0, 150.0)],
        );
        group.instances = 3;
        group.badge = Some(ElementBox::new("g7.badge", 30.0, 14.0));
        page.content = PageContent::StepGroup { group };

        let composed =
            compose_page(&page, &page_config(), &ImageStore::default(), 96.0).unwrap();

        let group_el = find(&composed, "g7");
        assert_eq!(group_el.kind, ElementKind::StepGroup);
        assert_eq!(group_el.children.len(), 2);
        let s1 = find(&composed, "s1");
        let s2 = find(&composed, "s2");
        assert!(s2.y >= s1.y + s1.height || s2.x >= s1.x + s1.width);

        let badge = find(&composed, "g7.badge");
        assert_eq!(badge.kind, ElementKind::InstanceBadge);
        // Inside the group's bottom-right corner, inset by the group margin.
        let group_rect = group_el.rect();
        assert!((badge.rect().right() - (group_rect.right() - 4.0)).abs() < 1e-6);
    }

    #[test]
    fn test_bom_slices_split_where_packing_overflows() {
        let parts: Vec<PliPart> = (0..6)
            .map(|i| {
                let mut p = build_parts(
                    &[PartEntry::new(&format!("p{i}"), "0", 90.0, 180.0)],
                    &ImageStore::default(),
                )
                .remove(0);
                p.margins = Margins::default();
                p
            })
            .collect();
        // Content 200 wide, 200 tall: each column holds one 180-tall part,
        // two 90-wide columns fit per page.
        let slices = bom_slices(&parts, 200.0, 200.0);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0], 0..2);
        assert_eq!(slices[2], 4..6);
    }

    #[test]
    fn test_bom_insert_composes_requested_slice() {
        let mut page = content_page(90);
        page.inserts = vec![Insert::Bom {
            list: PartList {
                id: "bom".to_string(),
                parts: (0..4)
                    .map(|i| PartEntry::new(&format!("p{i}"), "0", 300.0, 700.0))
                    .collect(),
                constraint: SizeConstraint::Area,
                sort: vec![],
                placement: PlacementSpec::default(),
                margins: Margins::default(),
            },
            slice: 1,
        }];

        let composed =
            compose_page(&page, &page_config(), &ImageStore::default(), 96.0).unwrap();
        let bom = find(&composed, "bom");
        assert_eq!(bom.kind, ElementKind::Bom);
        assert!(!bom.children.is_empty());
        assert!(bom.width <= 760.0 + 1e-6);
    }

    #[test]
    fn test_text_insert_places_by_its_own_spec() {
        let mut page = content_page(2);
        page.inserts = vec![Insert::Text {
            element: ElementBox::new("note", 100.0, 40.0)
                .with_placement(PlacementSpec::inside(Cell::TopRight)),
        }];
        let composed =
            compose_page(&page, &page_config(), &ImageStore::default(), 96.0).unwrap();
        let note = find(&composed, "note");
        assert_eq!(note.kind, ElementKind::TextInsert);
        assert_eq!(note.x, 800.0 - 20.0 - 100.0);
        assert_eq!(note.y, 20.0);
    }

    #[test]
    fn test_document_reports_bad_page_and_continues() {
        let mut bad = content_page(2);
        // Two inserts placed relative to each other: a cycle.
        bad.inserts = vec![
            Insert::Text {
                element: ElementBox::new("a", 10.0, 10.0).with_placement(
                    PlacementSpec::inside(Cell::Center).relative_to("b"),
                ),
            },
            Insert::Text {
                element: ElementBox::new("b", 10.0, 10.0).with_placement(
                    PlacementSpec::inside(Cell::Center).relative_to("a"),
                ),
            },
        ];
        let job = LayoutJob {
            page: page_config(),
            pages: vec![content_page(1), bad, content_page(3)],
            images: vec![],
            resolution: 96.0,
        };

        let doc = compose_document(&job);
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.errors.len(), 1);
        assert_eq!(doc.errors[0].page, 2);
    }
}

//! # Layout Job Model
//!
//! The input representation for the engine. A job is a list of pages, each
//! carrying a tree of logical elements: steps, step groups, callouts, parts
//! lists, cover attributes and free-floating inserts. This is designed to be
//! produced by the document-editing side of an instruction generator — the
//! part that parses models and renders images — which hands over *measured
//! boxes only*: every piece of text and every rendered image arrives here
//! reduced to a width and height in pixels.
//!
//! Step content is a closed sum (`PageContent`, with steps owning callouts
//! owning steps). There is no runtime tag-and-cast discovery anywhere: a node
//! that is not the expected variant is unrepresentable, not a crash.

use serde::{Deserialize, Serialize};

use crate::geometry::Margins;
use crate::placement::PlacementSpec;

/// A complete layout job ready for composition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutJob {
    /// Page setup shared by every page in the job.
    #[serde(default)]
    pub page: PageConfig,

    /// The pages to compose, in document order.
    #[serde(default)]
    pub pages: Vec<Page>,

    /// Rendered image pixel data, referenced by id from part entries. Only
    /// the alpha channel is ever read, to extract silhouette edge profiles.
    /// Entries are optional: a part without one packs by bounding box.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageEntry>,

    /// Pixels per inch of the rendered images. Drives the step size of the
    /// area and square constraint searches.
    #[serde(default = "default_resolution")]
    pub resolution: f64,
}

fn default_resolution() -> f64 {
    96.0
}

/// Page dimensions and margins, in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub margins: Margins,
}

impl Default for PageConfig {
    fn default() -> Self {
        // US Letter at 96 DPI.
        Self {
            width: 816.0,
            height: 1056.0,
            margins: Margins::uniform(24.0),
        }
    }
}

/// RGBA pixel data for one rendered image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub id: String,
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA bytes, 4 per pixel.
    pub rgba: Vec<u8>,
}

/// One page of the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Ordinal shown in the page number box, 1-based.
    pub number: u32,

    #[serde(default)]
    pub kind: PageKind,

    /// Page header, placed before anything else on the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<ElementBox>,

    /// Page footer, placed right after the header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<ElementBox>,

    /// Page number box. Absent on cover pages by convention, but nothing
    /// enforces that here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<ElementBox>,

    /// The page's main content.
    #[serde(default)]
    pub content: PageContent,

    /// Cover text blocks (title, author, ...). Only consulted on cover
    /// pages; each carries its measured extents and an optional placement
    /// override.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<CoverAttribute>,

    /// Free-floating inserts: text blocks, pictures, a bill of materials.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inserts: Vec<Insert>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    #[default]
    Content,
    FrontCover,
    BackCover,
}

/// The main content of a page: nothing (covers), a single step, or a group
/// of steps sharing the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageContent {
    #[default]
    Empty,
    Step {
        step: Step,
    },
    StepGroup {
        group: StepGroup,
    },
}

/// A generic measured element: extents, margins and a placement directive.
///
/// Headers, footers, page numbers, submodel icons, rotate icons, page
/// pointers and cover attributes are all just one of these as far as the
/// engine cares.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBox {
    pub id: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub placement: PlacementSpec,
}

impl ElementBox {
    pub fn new(id: &str, width: f64, height: f64) -> Self {
        Self {
            id: id.to_string(),
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_placement(mut self, placement: PlacementSpec) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }
}

/// One building step: the assembly image plus its satellites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,

    /// Step number text box. Hidden step numbers make elements placed
    /// relative to them fall back along the redirection chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_number: Option<ElementBox>,

    /// The construction step image (the rendered assembly).
    pub csi: ElementBox,

    /// Per-step parts list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pli: Option<PartList>,

    /// Submodel preview icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submodel: Option<ElementBox>,

    /// Rotate-model icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_icon: Option<ElementBox>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub callouts: Vec<Callout>,

    #[serde(default)]
    pub margins: Margins,
}

impl Step {
    pub fn new(id: &str, csi_width: f64, csi_height: f64) -> Self {
        Self {
            id: id.to_string(),
            step_number: None,
            csi: ElementBox::new(&format!("{id}.csi"), csi_width, csi_height),
            pli: None,
            submodel: None,
            rotate_icon: None,
            callouts: Vec::new(),
            margins: Margins::uniform(4.0),
        }
    }
}

/// Several steps sharing a page, packed into ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepGroup {
    pub id: String,
    pub steps: Vec<Step>,

    /// Whether step ranges stack vertically into columns or horizontally
    /// into rows.
    #[serde(default)]
    pub direction: FlowDirection,

    /// How many times the grouped submodel is built; the badge is shown when
    /// greater than one.
    #[serde(default = "default_instances")]
    pub instances: u32,

    /// Measured "Nx" badge text box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<ElementBox>,

    /// Arrows pointing to continuation pages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page_pointers: Vec<ElementBox>,

    #[serde(default)]
    pub placement: PlacementSpec,

    #[serde(default)]
    pub margins: Margins,
}

impl StepGroup {
    pub fn new(id: &str, steps: Vec<Step>) -> Self {
        Self {
            id: id.to_string(),
            steps,
            direction: FlowDirection::Vertical,
            instances: 1,
            badge: None,
            page_pointers: Vec::new(),
            placement: PlacementSpec::default(),
            margins: Margins::uniform(4.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowDirection {
    #[default]
    Vertical,
    Horizontal,
}

fn default_instances() -> u32 {
    1
}

/// A callout: a nested sub-sequence of steps for a submodel, drawn as an
/// inset box with a border.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Callout {
    pub id: String,
    pub steps: Vec<Step>,

    #[serde(default = "default_instances")]
    pub instances: u32,

    /// Measured extents of the "Nx" badge text, used when `instances > 1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<ElementBox>,

    #[serde(default)]
    pub direction: FlowDirection,

    #[serde(default = "default_border")]
    pub border_thickness: f64,

    #[serde(default)]
    pub margins: Margins,

    #[serde(default)]
    pub placement: PlacementSpec,
}

fn default_border() -> f64 {
    1.0
}

impl Callout {
    pub fn new(id: &str, steps: Vec<Step>) -> Self {
        Self {
            id: id.to_string(),
            steps,
            instances: 1,
            badge: None,
            direction: FlowDirection::Vertical,
            border_thickness: 1.0,
            margins: Margins::uniform(4.0),
            placement: PlacementSpec::default(),
        }
    }
}

/// A parts list: the distinct part/color pairs of a step (or of the whole
/// model, for a BOM) with instance counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartList {
    pub id: String,
    pub parts: Vec<PartEntry>,

    #[serde(default)]
    pub constraint: SizeConstraint,

    #[serde(default)]
    pub sort: Vec<SortKey>,

    #[serde(default)]
    pub placement: PlacementSpec,

    #[serde(default)]
    pub margins: Margins,
}

/// How a parts list is allowed to grow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SizeConstraint {
    /// Columns may not exceed this height.
    Height { max: f64 },
    /// Total packed width may not exceed this.
    Width { max: f64 },
    /// Exactly this many columns.
    Columns { count: u32 },
    /// Minimize total area.
    Area,
    /// Minimize |width − height|.
    Square,
}

impl Default for SizeConstraint {
    fn default() -> Self {
        SizeConstraint::Area
    }
}

/// One part entry of a parts list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartEntry {
    pub part_id: String,
    pub color_id: String,

    #[serde(default = "default_instances")]
    pub instances: u32,

    /// Rendered part image extents, with an optional reference into
    /// `LayoutJob::images` for silhouette data. `None` extents degrade to a
    /// placeholder box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,

    /// Measured "Nx" instance-count text box, stacked bottom-left under the
    /// image unless suppressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_count: Option<DecorationBox>,

    /// Styled annotation box (part size, element id...), stacked above the
    /// instance count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<DecorationBox>,

    #[serde(default)]
    pub margins: Margins,

    #[serde(default)]
    pub sort: SortValues,
}

impl PartEntry {
    pub fn new(part_id: &str, color_id: &str, width: f64, height: f64) -> Self {
        Self {
            part_id: part_id.to_string(),
            color_id: color_id.to_string(),
            instances: 1,
            image: Some(ImageRef {
                width,
                height,
                data: None,
            }),
            instance_count: None,
            annotation: None,
            margins: Margins::uniform(4.0),
            sort: SortValues::default(),
        }
    }
}

/// Extents of a rendered image plus an optional pixel-data reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub width: f64,
    pub height: f64,
    /// Id of an `ImageEntry` carrying the RGBA buffer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// A measured decoration sub-box (instance count text or annotation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationBox {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub style: AnnotationStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationStyle {
    #[default]
    None,
    Circle,
    Square,
    Rectangle,
}

/// Values a parts list can be sorted by.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortValues {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: String,
    /// Part footprint used for size ordering, conventionally width × height.
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub element: String,
}

/// One sort criterion with its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Category,
    Color,
    Size,
    Element,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// A cover page text block with its role in the attribute chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverAttribute {
    pub kind: AttributeKind,
    #[serde(rename = "box")]
    pub element: ElementBox,
    /// When set, the default chain link is broken and the element's own
    /// placement directive is used as-is.
    #[serde(default)]
    pub placement_override: bool,
    #[serde(default)]
    pub hidden: bool,
}

/// Roles in the front/back cover placement chains, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    Title,
    ModelName,
    Author,
    Parts,
    ModelDescription,
    PublishDescription,
    Copyright,
    Url,
    Email,
    Disclaimer,
    Plug,
}

/// A free-floating page insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Insert {
    /// A measured text block.
    Text {
        #[serde(rename = "box")]
        element: ElementBox,
    },
    /// A picture with known extents.
    Pixmap {
        #[serde(rename = "box")]
        element: ElementBox,
    },
    /// A bill of materials: a parts list spanning the whole model, possibly
    /// one slice of a list split across pages.
    Bom {
        list: PartList,
        /// Which slice of the split BOM this is, 0-based.
        #[serde(default)]
        slice: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_job_deserializes() {
        let job: LayoutJob = serde_json::from_str(r#"{ "pages": [] }"#).unwrap();
        assert_eq!(job.resolution, 96.0);
        assert_eq!(job.page.width, 816.0);
    }

    #[test]
    fn test_step_page_round_trips() {
        let page = Page {
            number: 3,
            kind: PageKind::Content,
            header: Some(ElementBox::new("pageHeader", 768.0, 30.0)),
            footer: None,
            page_number: Some(ElementBox::new("pageNumber", 20.0, 16.0)),
            content: PageContent::Step {
                step: Step::new("step3", 400.0, 300.0),
            },
            attributes: vec![],
            inserts: vec![],
        };
        let json = serde_json::to_string(&page).unwrap();
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(back.number, 3);
        match back.content {
            PageContent::Step { step } => assert_eq!(step.id, "step3"),
            _ => panic!("expected single-step content"),
        }
    }

    #[test]
    fn test_constraint_tags() {
        let c: SizeConstraint =
            serde_json::from_str(r#"{ "type": "Height", "max": 500 }"#).unwrap();
        assert_eq!(c, SizeConstraint::Height { max: 500.0 });
        let c: SizeConstraint = serde_json::from_str(r#"{ "type": "Square" }"#).unwrap();
        assert_eq!(c, SizeConstraint::Square);
    }
}

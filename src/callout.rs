//! # Callout Sizing
//!
//! A callout is an inset box holding the steps of a submodel, bordered and
//! margined, with a pointer back to where the submodel is used (the pointer
//! itself is presentation-side and not sized here). When the submodel is
//! built more than once, an instance badge ("3x") rides in the callout's
//! bottom-right corner — unless something already occupies that corner, in
//! which case the callout grows just enough to give the badge a clean strip
//! of its own.

use log::debug;

use crate::error::LayoutError;
use crate::geometry::{Margins, Rect};
use crate::model::{Callout, FlowDirection};
use crate::page::{offset_tree, ComposedElement, ElementKind};
use crate::pli::ImageStore;
use crate::placement::PlacementSpec;
use crate::step::{pack_steps, size_step};

/// A fully sized callout: extents, composed content tree (positions relative
/// to the callout origin) and the badge box, if any.
#[derive(Debug, Clone)]
pub struct SizedCallout {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub placement: PlacementSpec,
    pub badge: Option<Rect>,
    /// The callout's content tree, one child per step plus the badge.
    pub children: Vec<ComposedElement>,
}

/// Size a callout from its steps.
///
/// The step range is packed by the same range packer used for page-level
/// step groups, then wrapped in border and margins on all sides. With more
/// than one instance the badge is fitted afterwards; see
/// [`fit_instance_badge`].
pub fn size_callout(
    callout: &Callout,
    images: &ImageStore,
    resolution: f64,
    avail_width: f64,
    avail_height: f64,
) -> Result<SizedCallout, LayoutError> {
    if callout.steps.is_empty() {
        return Err(LayoutError::MalformedTree(format!(
            "callout `{}` contains no steps",
            callout.id
        )));
    }
    let sized = callout
        .steps
        .iter()
        .map(|s| size_step(s, images, resolution, avail_width, avail_height))
        .collect::<Result<Vec<_>, _>>()?;

    let inner_limit = match callout.direction {
        FlowDirection::Vertical => {
            avail_height - 2.0 * callout.border_thickness - callout.margins.vertical()
        }
        FlowDirection::Horizontal => {
            avail_width - 2.0 * callout.border_thickness - callout.margins.horizontal()
        }
    };
    let (positions, content_w, content_h) = pack_steps(&sized, callout.direction, inner_limit.max(1.0));

    let inset = callout.border_thickness;
    let origin_x = callout.margins.left + inset;
    let origin_y = callout.margins.top + inset;
    let mut width = content_w + callout.margins.horizontal() + 2.0 * inset;
    let mut height = content_h + callout.margins.vertical() + 2.0 * inset;

    let mut children: Vec<ComposedElement> = sized
        .into_iter()
        .zip(positions)
        .map(|(step, at)| {
            let mut tree = step.into_tree();
            offset_tree(&mut tree, origin_x + at.x, origin_y + at.y);
            tree
        })
        .collect();

    let badge = if callout.instances > 1 {
        callout.badge.as_ref().map(|badge_box| {
            let rect = fit_instance_badge(
                badge_box.width,
                badge_box.height,
                &badge_box.margins,
                &callout.margins,
                inset,
                &mut width,
                &mut height,
                &children,
            );
            children.push(ComposedElement::leaf(
                &badge_box.id,
                ElementKind::CalloutBadge,
                rect,
            ));
            rect
        })
    } else {
        None
    };

    Ok(SizedCallout {
        id: callout.id.clone(),
        width,
        height,
        margins: callout.margins,
        placement: callout.placement.clone(),
        badge,
        children,
    })
}

/// Obstacle kinds the badge must not cover, in the order they are tested.
const BADGE_OBSTACLES: [ElementKind; 4] = [
    ElementKind::Csi,
    ElementKind::Pli,
    ElementKind::StepNumber,
    ElementKind::Callout,
];

/// Find a home for the instance badge.
///
/// First candidate is the callout's bottom-right corner, inside border and
/// margins. If that collides with any step's assembly image, parts list,
/// step number or nested callout, the callout is enlarged instead: either a
/// right-hand strip as wide as the badge or a bottom strip as tall as it,
/// whichever adds less area, and the badge lands in that strip. `width` and
/// `height` are updated in place when the callout grows.
#[allow(clippy::too_many_arguments)]
fn fit_instance_badge(
    badge_w: f64,
    badge_h: f64,
    badge_margins: &Margins,
    callout_margins: &Margins,
    inset: f64,
    width: &mut f64,
    height: &mut f64,
    children: &[ComposedElement],
) -> Rect {
    let corner = Rect::new(
        *width - callout_margins.right - inset - badge_w,
        *height - callout_margins.bottom - inset - badge_h,
        badge_w,
        badge_h,
    );
    let padded = corner.expand(badge_margins);

    let collides = BADGE_OBSTACLES.iter().any(|kind| {
        children
            .iter()
            .any(|c| c.any_of_kind_intersects(*kind, &padded))
    });
    if !collides {
        return corner;
    }

    let strip_w = badge_w + badge_margins.horizontal();
    let strip_h = badge_h + badge_margins.vertical();
    let right_area = strip_w * *height;
    let bottom_area = strip_h * *width;

    if right_area <= bottom_area {
        let x = *width - callout_margins.right - inset + badge_margins.left;
        *width += strip_w;
        debug!("badge collides; growing callout {strip_w:.0}px to the right");
        Rect::new(
            x,
            *height - callout_margins.bottom - inset - badge_h,
            badge_w,
            badge_h,
        )
    } else {
        let y = *height - callout_margins.bottom - inset + badge_margins.top;
        *height += strip_h;
        debug!("badge collides; growing callout {strip_h:.0}px at the bottom");
        Rect::new(
            *width - callout_margins.right - inset - badge_w,
            y,
            badge_w,
            badge_h,
        )
    }
}

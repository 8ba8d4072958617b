//! Outer boundary, cutout collection and boolean subtraction for one layer.

use kbplate_core::{CaseType, KeyboardConfig, LayerName, LayerOptions};
use kbplate_geometry::primitives::{circle, polygon, rect_from_corners, rectangle};
use kbplate_geometry::{Bounds, GeometryError, GeometryKernel, PlineSource, Polyline, Region};
use tracing::{debug, warn};

use crate::placement::PositionedFootprint;

/// How far edge-open cutouts (USB, poker slots) extend past the boundary they open.
const EDGE_OVERCUT: f64 = 1.0;

/// Poker-compatible mounting holes, mm from the plate center with y down.
pub const POKER_HOLES: [(f64, f64); 6] = [
    (-139.0, 9.2),
    (-117.3, -19.4),
    (-14.3, 0.0),
    (48.0, 37.9),
    (117.55, -19.4),
    (139.0, 9.2),
];
const POKER_SLOT: (f64, f64) = (3.5, 5.0);
const POKER_SLOT_Y: f64 = 9.2;

/// Distance of a foot's square hole below its round hole.
const FOOT_SQUARE_DROP: f64 = 60.0;

/// Plate-space rectangles shared by every layer of one build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateFrame {
    /// Bounding box of all key outlines.
    pub keys: Bounds,
    /// `keys` grown by the margin; the plate before any oversize.
    pub base: Bounds,
    /// `keys` grown by half the pcb padding; the cutout region reported to callers.
    pub inner: Bounds,
}

impl PlateFrame {
    pub fn new<'a>(
        config: &KeyboardConfig,
        key_outlines: impl IntoIterator<Item = &'a Polyline<f64>>,
    ) -> Option<Self> {
        let keys = Bounds::of_all(key_outlines)?;
        let [mx, my] = config.margin();
        Some(Self {
            keys,
            base: keys.expand(mx, my),
            inner: keys.expand(config.pcb_padding[0] / 2.0, config.pcb_padding[1] / 2.0),
        })
    }

    /// Outer boundary of a layer grown by `oversize` in total (half per side).
    pub fn outer(&self, oversize: f64) -> Bounds {
        self.base.expand(oversize / 2.0, oversize / 2.0)
    }

    /// Plate-space point for a position given in mm from the base plate's top-left corner.
    pub fn from_top_left(&self, x: f64, y: f64) -> (f64, f64) {
        (self.base.min_x + x, self.base.max_y - y)
    }

    /// Plate-space point for a position given in mm from the base plate's center, y down.
    pub fn from_center(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.base.center();
        (cx + x, cy - y)
    }
}

/// A layer after subtraction, before kerf and corner treatment.
#[derive(Debug, Clone)]
pub struct RawPlate {
    pub outer: Polyline<f64>,
    pub holes: Vec<Polyline<f64>>,
}

/// Side holes for a sandwich case: `(x, y)` counts excluding the four corners.
///
/// Free holes go one at a time to the side with the larger gap; ties go to the longer side.
pub fn sandwich_distribution(count: u32, width: f64, height: f64) -> (u32, u32) {
    let free = count.saturating_sub(4) / 2;
    let (mut nx, mut ny) = (0u32, 0u32);
    for _ in 0..free {
        let gx = width / f64::from(nx + 1);
        let gy = height / f64::from(ny + 1);
        if gx == gy {
            if width >= height {
                nx += 1;
            } else {
                ny += 1;
            }
        } else if gx > gy {
            nx += 1;
        } else {
            ny += 1;
        }
    }
    (nx, ny)
}

/// Apply per-key kerf overrides and flatten positioned footprints into cut contours.
///
/// Finishing offsets every hole by the keyboard kerf; a key with its own kerf is pre-shrunk by
/// the difference so its holes end up compensated by exactly its own value.
pub fn key_cutouts<K: GeometryKernel>(
    kernel: &K,
    placed: &[PositionedFootprint],
    kerf: f64,
) -> Result<Vec<Polyline<f64>>, GeometryError> {
    let mut out = Vec::new();
    for p in placed {
        let delta = p.kerf.map_or(0.0, |k| (k - kerf) / 2.0);
        for contour in p.footprint.contours() {
            if delta == 0.0 {
                out.push(contour.clone());
                continue;
            }
            let mut adjusted = kernel.offset(contour, -delta);
            if adjusted.len() != 1 {
                return Err(GeometryError::OffsetFailed {
                    what: "key cutout",
                    distance: -delta,
                    pieces: adjusted.len(),
                });
            }
            out.append(&mut adjusted);
        }
    }
    Ok(out)
}

pub struct Assembler<'a, K> {
    kernel: &'a K,
    config: &'a KeyboardConfig,
    frame: PlateFrame,
}

impl<'a, K: GeometryKernel> Assembler<'a, K> {
    pub fn new(kernel: &'a K, config: &'a KeyboardConfig, frame: PlateFrame) -> Self {
        Self {
            kernel,
            config,
            frame,
        }
    }

    pub fn frame(&self) -> &PlateFrame {
        &self.frame
    }

    fn screw_radius(&self) -> f64 {
        self.config.case.screw_radius
    }

    /// Screw holes around the base plate, inset `2r - 0.5` from each edge.
    pub fn sandwich_holes(&self) -> Vec<Polyline<f64>> {
        let b = self.frame.base;
        let (w, h) = (b.width(), b.height());
        let r = self.screw_radius();
        let d = 2.0 * r;
        let inset = d - 0.5;
        let (nx, ny) = sandwich_distribution(self.config.case.screw_count, w, h);
        let x_gap = (w - 2.0 * d + 1.0) / f64::from(nx + 1);
        let y_gap = (h - 2.0 * d + 1.0) / f64::from(ny + 1);

        let mut pts = vec![
            (inset, inset),
            (w - inset, inset),
            (w - inset, h - inset),
            (inset, h - inset),
        ];
        for k in 1..=nx {
            let x = inset + f64::from(k) * x_gap;
            pts.push((x, inset));
            pts.push((x, h - inset));
        }
        for k in 1..=ny {
            let y = inset + f64::from(k) * y_gap;
            pts.push((inset, y));
            pts.push((w - inset, y));
        }
        pts.into_iter()
            .map(|(x, y)| circle(self.frame.from_top_left(x, y), r))
            .collect()
    }

    /// The 60% "poker" mounting pattern plus its two edge slots.
    pub fn poker_holes(&self, oversize: f64) -> Vec<Polyline<f64>> {
        let r = self.screw_radius();
        let mut out: Vec<Polyline<f64>> = POKER_HOLES
            .iter()
            .map(|&(x, y)| circle(self.frame.from_center(x, y), r))
            .collect();

        // Open to the base edge; on an oversized layer the slot stays closed.
        let overcut = if oversize > 0.0 { 0.0 } else { EDGE_OVERCUT };
        let half_w = self.frame.base.width() / 2.0;
        let (sw, sh) = POKER_SLOT;
        for side in [-1.0, 1.0] {
            let (x_edge, y) = self.frame.from_center(side * half_w, POKER_SLOT_Y);
            let x_in = x_edge - side * sw;
            let x_out = x_edge + side * overcut;
            out.push(rect_from_corners((x_in, y - sh / 2.0), (x_out, y + sh / 2.0)));
        }
        out
    }

    pub fn case_holes(&self, layer: LayerName, oversize: f64) -> Vec<Polyline<f64>> {
        if layer == LayerName::Simple {
            return Vec::new();
        }
        match self.config.case.case_type {
            CaseType::None => Vec::new(),
            CaseType::Sandwich => self.sandwich_holes(),
            CaseType::Poker => self.poker_holes(oversize),
        }
    }

    /// A round hole per foot and a square hole below it.
    pub fn foot_holes(&self) -> Vec<Polyline<f64>> {
        let case = &self.config.case;
        let mut out = Vec::with_capacity(case.feet.len() * 2);
        for &[x, y] in &case.feet {
            let (px, py) = self.frame.from_top_left(x, y);
            out.push(circle((px, py), case.foot_hole_diameter / 2.0));
            let s = case.foot_hole_square;
            out.push(rectangle((px, py - FOOT_SQUARE_DROP), (s, s), 0.0));
        }
        out
    }

    /// Trapezoid through the top edge; `bottom` layers also get a channel for the connector.
    pub fn usb_cutout(&self, layer: LayerName, oversize: f64) -> Vec<Polyline<f64>> {
        let usb = &self.config.usb;
        let margin = self.config.margin()[1];
        if margin <= 0.0 {
            warn!(layer = %layer, "no top margin, skipping usb cutout");
            return Vec::new();
        }
        let (cx, _) = self.frame.base.center();
        let cx = cx + usb.offset;
        let y_edge = self.frame.base.max_y + oversize / 2.0;
        let y_in = self.frame.base.max_y - margin;
        let (hi, ho) = (usb.inner_width / 2.0, usb.outer_width / 2.0);

        let mut out = vec![polygon(&[
            (cx - hi, y_in),
            (cx + hi, y_in),
            (cx + ho, y_edge),
            (cx + ho, y_edge + EDGE_OVERCUT),
            (cx - ho, y_edge + EDGE_OVERCUT),
            (cx - ho, y_edge),
        ])];
        if layer == LayerName::Bottom {
            out.push(rect_from_corners(
                (cx - hi, y_in - usb.height),
                (cx + hi, y_in),
            ));
        }
        out
    }

    pub fn user_holes(&self, options: &LayerOptions) -> Vec<Polyline<f64>> {
        options
            .holes
            .iter()
            .map(|h| circle(self.frame.from_top_left(h.x, h.y), h.radius))
            .collect()
    }

    pub fn cavity(&self) -> Polyline<f64> {
        let i = self.frame.inner;
        rect_from_corners((i.min_x, i.min_y), (i.max_x, i.max_y))
    }

    /// Everything the layer cuts, before merging.
    pub fn layer_cutouts(
        &self,
        layer: LayerName,
        options: &LayerOptions,
        key_cutouts: &[Polyline<f64>],
    ) -> Vec<Polyline<f64>> {
        let mut cutouts: Vec<Polyline<f64>> = key_cutouts.to_vec();
        cutouts.extend(self.case_holes(layer, options.oversize));
        if layer == LayerName::Middle {
            cutouts.extend(self.foot_holes());
        }
        if options.include_usb_cutout {
            cutouts.extend(self.usb_cutout(layer, options.oversize));
        }
        if options.cavity {
            cutouts.push(self.cavity());
        }
        cutouts.extend(self.user_holes(options));
        cutouts
    }

    /// Outer rectangle minus the merged cutouts.
    pub fn assemble(
        &self,
        layer: LayerName,
        options: &LayerOptions,
        key_cutouts: &[Polyline<f64>],
    ) -> Result<RawPlate, GeometryError> {
        let ob = self.frame.outer(options.oversize);
        let outer = rect_from_corners((ob.min_x, ob.min_y), (ob.max_x, ob.max_y));
        let cutouts = self.layer_cutouts(layer, options, key_cutouts);
        debug!(layer = %layer, cutouts = cutouts.len(), "assembling");

        let merged = self.kernel.union(cutouts);
        if !merged.neg.is_empty() {
            return Err(GeometryError::Islands {
                count: merged.neg.len(),
            });
        }

        let (kept, dropped): (Vec<_>, Vec<_>) = merged
            .pos
            .into_iter()
            .partition(|c| Bounds::of(c).is_some_and(|b| b.intersects(&ob)));
        if !dropped.is_empty() {
            warn!(layer = %layer, count = dropped.len(), "dropping cutouts outside the plate");
        }

        let plate = self
            .kernel
            .difference(&Region::from_pos(vec![outer]), &kept);
        let mut pos = plate.pos;
        let outer = match (pos.pop(), pos.len()) {
            (None, _) => return Err(GeometryError::BoundaryConsumed),
            (Some(o), 0) => o,
            (Some(_), n) => return Err(GeometryError::BoundarySplit { pieces: n + 1 }),
        };
        if outer.area().abs() <= f64::EPSILON {
            return Err(GeometryError::BoundaryConsumed);
        }

        if self.kernel.self_intersects(&outer) {
            return Err(GeometryError::SelfIntersection { index: 0 });
        }
        if let Some(i) = plate.neg.iter().position(|h| self.kernel.self_intersects(h)) {
            return Err(GeometryError::SelfIntersection { index: i + 1 });
        }

        Ok(RawPlate {
            outer,
            holes: plate.neg,
        })
    }
}

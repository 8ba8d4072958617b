use std::f64::consts::PI;

use cavalier_contours::polyline::{
    BooleanOp, BooleanResultInfo, PlineOffsetOptions, PlineOrientation, PlineSource, PlineVertex,
    Polyline,
};
use tracing::trace;

use crate::bounds::Bounds;
use crate::region::{simplify, Region};

/// Vertices closer than this to a bounding-box corner count as lying on it.
const CORNER_EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerStyle {
    /// Tangent circular arc.
    Round,
    /// Straight chamfer.
    Bevel,
}

/// The boolean/offset operations plate synthesis needs.
///
/// Implementations must be deterministic: identical input contours give identical output
/// contours, in the same order.
pub trait GeometryKernel {
    /// Union of closed contours. Enclosed holes end up in the region's `neg` set.
    fn union(&self, contours: Vec<Polyline<f64>>) -> Region;

    /// Subtract `cutters` from `region`.
    fn difference(&self, region: &Region, cutters: &[Polyline<f64>]) -> Region;

    /// Grow (`distance > 0`) or shrink (`distance < 0`) the area enclosed by `contour`,
    /// independent of its winding. Returns every resulting contour; an empty result means the
    /// contour collapsed.
    fn offset(&self, contour: &Polyline<f64>, distance: f64) -> Vec<Polyline<f64>>;

    /// Replace the contour's rectangular corners (straight, perpendicular edges meeting on a
    /// bounding-box corner) with an arc or chamfer. The setback is clamped to half of each
    /// adjacent edge.
    fn treat_corners(
        &self,
        contour: &Polyline<f64>,
        radius: f64,
        style: CornerStyle,
    ) -> Polyline<f64>;

    /// Whether `inner` lies strictly inside `outer`.
    fn contains(&self, outer: &Polyline<f64>, inner: &Polyline<f64>) -> bool;

    fn self_intersects(&self, contour: &Polyline<f64>) -> bool;
}

/// [`GeometryKernel`] backed by `cavalier_contours`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CavcKernel;

impl GeometryKernel for CavcKernel {
    fn union(&self, contours: Vec<Polyline<f64>>) -> Region {
        trace!(count = contours.len(), "union");
        Region::union_all(contours)
    }

    fn difference(&self, region: &Region, cutters: &[Polyline<f64>]) -> Region {
        trace!(count = cutters.len(), "difference");
        let mut out = region.clone();
        out.subtract_all(cutters);
        out
    }

    fn offset(&self, contour: &Polyline<f64>, distance: f64) -> Vec<Polyline<f64>> {
        if distance == 0.0 {
            return vec![contour.clone()];
        }
        let opts = PlineOffsetOptions {
            handle_self_intersects: true,
            ..Default::default()
        };
        let signed = signed_offset_for(contour, distance);
        let out: Vec<Polyline<f64>> = contour.parallel_offset_opt(signed, &opts);
        out.into_iter()
            .filter(|p| p.vertex_count() >= 2)
            .map(simplify)
            .collect()
    }

    fn treat_corners(
        &self,
        contour: &Polyline<f64>,
        radius: f64,
        style: CornerStyle,
    ) -> Polyline<f64> {
        let n = contour.vertex_count();
        if radius <= 0.0 || n < 3 {
            return contour.clone();
        }
        let Some(bb) = Bounds::of(contour) else {
            return contour.clone();
        };

        let verts = &contour.vertex_data;
        let mut out = Polyline::new_closed();
        for i in 0..n {
            let prev = verts[(i + n - 1) % n];
            let cur = verts[i];
            let next = verts[(i + 1) % n];

            let on_corner = ((cur.x - bb.min_x).abs() < CORNER_EPS
                || (cur.x - bb.max_x).abs() < CORNER_EPS)
                && ((cur.y - bb.min_y).abs() < CORNER_EPS
                    || (cur.y - bb.max_y).abs() < CORNER_EPS);
            let straight = prev.bulge == 0.0 && cur.bulge == 0.0;

            let din = (prev.x - cur.x, prev.y - cur.y);
            let dout = (next.x - cur.x, next.y - cur.y);
            let lin = din.0.hypot(din.1);
            let lout = dout.0.hypot(dout.1);
            let square = lin > 0.0
                && lout > 0.0
                && (din.0 * dout.0 + din.1 * dout.1).abs() <= 1e-9 * lin * lout;

            if !(on_corner && straight && square) {
                out.vertex_data.push(cur);
                continue;
            }

            let r = radius.min(lin / 2.0).min(lout / 2.0);
            let p_in = (cur.x + din.0 / lin * r, cur.y + din.1 / lin * r);
            let p_out = (cur.x + dout.0 / lout * r, cur.y + dout.1 / lout * r);
            let bulge = match style {
                CornerStyle::Round => {
                    let turn = (cur.x - prev.x) * (next.y - cur.y)
                        - (cur.y - prev.y) * (next.x - cur.x);
                    (PI / 8.0).tan() * turn.signum()
                }
                CornerStyle::Bevel => 0.0,
            };
            out.vertex_data.push(PlineVertex::new(p_in.0, p_in.1, bulge));
            out.vertex_data.push(PlineVertex::new(p_out.0, p_out.1, cur.bulge));
        }
        simplify(out)
    }

    fn contains(&self, outer: &Polyline<f64>, inner: &Polyline<f64>) -> bool {
        let res = outer.boolean(inner, BooleanOp::Not);
        matches!(res.result_info, BooleanResultInfo::Pline2InsidePline1)
    }

    fn self_intersects(&self, contour: &Polyline<f64>) -> bool {
        chords_cross(contour)
    }
}

/// Offset distance in cavalier's convention (positive = left of travel) that grows the
/// enclosed area by `grow`.
fn signed_offset_for(pline: &Polyline<f64>, grow: f64) -> f64 {
    match pline.orientation() {
        // CCW: interior is on the left.
        PlineOrientation::CounterClockwise | PlineOrientation::Open => -grow,
        PlineOrientation::Clockwise => grow,
    }
}

/// Proper crossings between non-adjacent segments, with arcs approximated by their chords.
fn chords_cross(pl: &Polyline<f64>) -> bool {
    let n = pl.vertex_count();
    if n < 4 {
        return false;
    }
    let v = &pl.vertex_data;
    let seg = |i: usize| ((v[i].x, v[i].y), (v[(i + 1) % n].x, v[(i + 1) % n].y));
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (a, b) = seg(i);
            let (c, d) = seg(j);
            if segments_cross(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

fn segments_cross(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> bool {
    let orient = |p: (f64, f64), q: (f64, f64), r: (f64, f64)| {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    };
    let eps = 1e-12;
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);
    ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
}

use cavalier_contours::polyline::PlineSource;

use crate::transform::Transform;
use crate::{PlineVertex, Polyline};

pub fn circle(center: (f64, f64), radius: f64) -> Polyline<f64> {
    let (cx, cy) = center;
    let mut pl = Polyline::new_closed();

    // Two half-circle arcs.
    pl.vertex_data.push(PlineVertex::new(cx - radius, cy, 1.0));
    pl.vertex_data.push(PlineVertex::new(cx + radius, cy, 1.0));
    pl
}

/// Axis-aligned rectangle around `center`, optionally rotated about it.
pub fn rectangle(center: (f64, f64), size: (f64, f64), rotation_deg: f64) -> Polyline<f64> {
    let (cx, cy) = center;
    let hw = size.0 / 2.0;
    let hh = size.1 / 2.0;
    let pl = polygon(&[
        (cx - hw, cy - hh),
        (cx + hw, cy - hh),
        (cx + hw, cy + hh),
        (cx - hw, cy + hh),
    ]);
    if rotation_deg == 0.0 {
        pl
    } else {
        Transform::rotate_about(rotation_deg, [cx, cy]).apply_pline(&pl)
    }
}

/// Rectangle spanning two opposite corners.
pub fn rect_from_corners(a: (f64, f64), b: (f64, f64)) -> Polyline<f64> {
    let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
    let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
    polygon(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
}

pub fn polygon(vertices: &[(f64, f64)]) -> Polyline<f64> {
    let mut pl = Polyline::new_closed();
    for &(x, y) in vertices {
        pl.vertex_data.push(PlineVertex::new(x, y, 0.0));
    }
    pl
}

/// Polygon mirrored across both axes from a list of points in one quadrant.
///
/// `quadrant` is the part of the outline with `x >= 0, y >= 0`, walked from the x axis side to the
/// y axis side. The result visits the chain, its x-mirror reversed, the xy-mirror and the y-mirror
/// reversed. Points lying on an axis are deduplicated.
pub fn symmetric_polygon(quadrant: &[(f64, f64)]) -> Polyline<f64> {
    let mut pts: Vec<(f64, f64)> = Vec::with_capacity(quadrant.len() * 4);
    pts.extend(quadrant.iter().copied());
    pts.extend(quadrant.iter().rev().map(|&(x, y)| (-x, y)));
    pts.extend(quadrant.iter().map(|&(x, y)| (-x, -y)));
    pts.extend(quadrant.iter().rev().map(|&(x, y)| (x, -y)));
    pts.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9);
    if pts.len() > 1 {
        let (first, last) = (pts[0], pts[pts.len() - 1]);
        if (first.0 - last.0).abs() < 1e-9 && (first.1 - last.1).abs() < 1e-9 {
            pts.pop();
        }
    }
    polygon(&pts)
}

pub fn is_valid_closed_polyline(pl: &Polyline<f64>) -> bool {
    pl.is_closed() && pl.vertex_count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rectangle_area_and_orientation() {
        let r = rectangle((5.0, 5.0), (4.0, 2.0), 0.0);
        assert_abs_diff_eq!(r.area(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn rotated_rectangle_keeps_area() {
        let r = rectangle((0.0, 0.0), (4.0, 2.0), 33.0);
        assert_abs_diff_eq!(r.area().abs(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn circle_area() {
        let c = circle((0.0, 0.0), 2.0);
        assert_abs_diff_eq!(c.area(), std::f64::consts::PI * 4.0, epsilon = 1e-9);
    }

    #[test]
    fn symmetric_polygon_closes_a_cross() {
        // Quarter of a plus sign, from the +x arm to the +y arm.
        let pl = symmetric_polygon(&[(3.0, 1.0), (1.0, 1.0), (1.0, 3.0)]);
        assert_eq!(pl.vertex_count(), 12);
        assert_abs_diff_eq!(pl.area().abs(), 20.0, epsilon = 1e-9);
    }
}

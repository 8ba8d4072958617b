//! Plate contours to DXF entities.

use cavalier_contours::core::math::Vector2;
use cavalier_contours::polyline::{seg_arc_radius_and_center, PlineSource, PlineVertex};
use kbplate_geometry::Polyline;

use crate::dxf::{Arc, Circle, Dxf, Entity, Line, Point2};

const EPS: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DxfGeomError {
    #[error("contour #{index} must be closed with at least 2 vertices")]
    InvalidContour { index: usize },
}

/// All contours of a plate, outer first.
pub fn dxf_from_contours<'a>(
    contours: impl IntoIterator<Item = &'a Polyline<f64>>,
) -> Result<Dxf, DxfGeomError> {
    let mut entities = Vec::new();
    for (index, pl) in contours.into_iter().enumerate() {
        entities.extend(entities_from_polyline(pl).ok_or(DxfGeomError::InvalidContour { index })?);
    }
    Ok(Dxf { entities })
}

/// One LINE per straight segment and one ARC per bulge segment; a contour that is a single
/// full circle becomes a CIRCLE. Returns `None` for open or degenerate contours.
pub fn entities_from_polyline(pline: &Polyline<f64>) -> Option<Vec<Entity>> {
    let n = pline.vertex_count();
    if !pline.is_closed() || n < 2 {
        return None;
    }

    let mut out: Vec<Entity> = Vec::with_capacity(n);
    for i in 0..n {
        let v1 = pline.at(i);
        let v2 = pline.at((i + 1) % n);

        if v1.bulge_is_zero() {
            out.push(Entity::Line(Line {
                start: Point2 { x: v1.x, y: v1.y },
                end: Point2 { x: v2.x, y: v2.y },
            }));
            continue;
        }

        let (radius, center) = seg_arc_radius_and_center(v1, v2);
        let (start, end) = arc_angles(v1, v2, center);
        let arc = Arc {
            center: Point2 {
                x: center.x,
                y: center.y,
            },
            radius,
            start_angle_deg: start,
            end_angle_deg: end,
        };

        if let Some(Entity::Arc(prev)) = out.last_mut() {
            if continues(prev, &arc) {
                prev.end_angle_deg = arc.end_angle_deg;
                continue;
            }
        }
        out.push(Entity::Arc(arc));
    }

    if let [Entity::Arc(a)] = out.as_slice() {
        if angles_meet(a.start_angle_deg, a.end_angle_deg) {
            return Some(vec![Entity::Circle(Circle {
                center: a.center,
                radius: a.radius,
            })]);
        }
    }
    // Two half circles that did not merge because they run clockwise.
    if let [Entity::Arc(a), Entity::Arc(b)] = out.as_slice() {
        if same_circle(a, b)
            && angles_meet(a.end_angle_deg, b.start_angle_deg)
            && angles_meet(b.end_angle_deg, a.start_angle_deg)
        {
            return Some(vec![Entity::Circle(Circle {
                center: a.center,
                radius: a.radius,
            })]);
        }
    }
    Some(out)
}

/// DXF arcs always run counter-clockwise, so a clockwise segment swaps its endpoints.
fn arc_angles(v1: PlineVertex<f64>, v2: PlineVertex<f64>, center: Vector2<f64>) -> (f64, f64) {
    let a1 = angle_deg(center, v1.pos());
    let a2 = angle_deg(center, v2.pos());
    if v1.bulge_is_neg() {
        (a2, a1)
    } else {
        (a1, a2)
    }
}

/// Degrees in `[0, 360)`.
fn angle_deg(center: Vector2<f64>, p: Vector2<f64>) -> f64 {
    let a = (p.y - center.y).atan2(p.x - center.x).to_degrees().rem_euclid(360.0);
    if a >= 360.0 - 1e-9 {
        0.0
    } else {
        a
    }
}

fn same_circle(a: &Arc, b: &Arc) -> bool {
    (a.center.x - b.center.x).abs() <= EPS
        && (a.center.y - b.center.y).abs() <= EPS
        && (a.radius - b.radius).abs() <= EPS
}

fn continues(prev: &Arc, next: &Arc) -> bool {
    same_circle(prev, next) && angles_meet(prev.end_angle_deg, next.start_angle_deg)
}

/// Equal modulo a full turn.
fn angles_meet(a: f64, b: f64) -> bool {
    let d = (a - b).rem_euclid(360.0);
    d <= EPS || d >= 360.0 - EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use kbplate_geometry::primitives::{circle, rectangle};
    use kbplate_geometry::PlineSourceMut;

    #[test]
    fn rectangle_is_four_lines() {
        let entities = entities_from_polyline(&rectangle((0.0, 0.0), (14.0, 14.0), 0.0)).unwrap();
        assert_eq!(entities.len(), 4);
        assert!(entities.iter().all(|e| matches!(e, Entity::Line(_))));
    }

    #[test]
    fn circles_become_circle_entities_either_way() {
        let ccw = circle((3.0, 4.0), 1.5);
        let mut cw = ccw.clone();
        cw.invert_direction_mut();
        for pl in [ccw, cw] {
            let entities = entities_from_polyline(&pl).unwrap();
            let [Entity::Circle(c)] = entities.as_slice() else {
                panic!("expected a circle, got {entities:?}");
            };
            assert_abs_diff_eq!(c.radius, 1.5, epsilon = 1e-9);
            assert_abs_diff_eq!(c.center.x, 3.0, epsilon = 1e-9);
            assert_abs_diff_eq!(c.center.y, 4.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn quarter_arc_angles_are_counter_clockwise() {
        let mut pl = Polyline::new_closed();
        pl.add(1.0, 0.0, (std::f64::consts::PI / 8.0).tan());
        pl.add(0.0, 1.0, 0.0);
        pl.add(0.0, 0.0, 0.0);
        let entities = entities_from_polyline(&pl).unwrap();
        let Entity::Arc(a) = entities[0] else {
            panic!("expected an arc");
        };
        assert_abs_diff_eq!(a.start_angle_deg, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.end_angle_deg, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.radius, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn open_contours_are_rejected() {
        let mut pl = Polyline::new();
        pl.add(0.0, 0.0, 0.0);
        pl.add(1.0, 0.0, 0.0);
        assert!(entities_from_polyline(&pl).is_none());
        assert_eq!(
            dxf_from_contours([&pl]).unwrap_err(),
            DxfGeomError::InvalidContour { index: 0 }
        );
    }
}

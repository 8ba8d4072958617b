//! Single-path SVG with millimetre dimensions.

use std::fmt::Write as _;

use cavalier_contours::polyline::{seg_arc_radius_and_center, PlineSource};
use kbplate_geometry::{Bounds, Polyline};
use kbplate_plate::FinishedPlate;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SvgError {
    #[error("SVG export needs a plate with a non-empty outline")]
    Empty,
    #[error("contour #{index} is not closed")]
    OpenContour { index: usize },
}

/// Every contour of the plate as one `evenodd` path, y flipped to SVG's downward axis and the
/// bounding box moved to the origin.
pub fn svg_from_plate(plate: &FinishedPlate) -> Result<String, SvgError> {
    svg_from_contours(plate.contours(), plate.bounds)
}

pub fn svg_from_contours<'a>(
    contours: impl IntoIterator<Item = &'a Polyline<f64>>,
    bounds: Bounds,
) -> Result<String, SvgError> {
    let (width, height) = (bounds.width(), bounds.height());
    if !(width > 0.0 && height > 0.0) {
        return Err(SvgError::Empty);
    }
    let tx = |x: f64, y: f64| (x - bounds.min_x, bounds.max_y - y);

    let mut path = String::new();
    for (index, pl) in contours.into_iter().enumerate() {
        if !pl.is_closed() {
            return Err(SvgError::OpenContour { index });
        }
        push_subpath(&mut path, &contour_path(pl, tx));
    }
    if path.is_empty() {
        return Err(SvgError::Empty);
    }

    Ok(format!(
        "<svg width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\" xmlns=\"http://www.w3.org/2000/svg\"><g stroke-linecap=\"round\" fill-rule=\"evenodd\" stroke=\"#000\" stroke-width=\"0.25mm\" fill=\"none\"><path d=\"{path}\" vector-effect=\"non-scaling-stroke\"/></g></svg>",
        w = fmt_num(width),
        h = fmt_num(height),
    ))
}

fn push_subpath(path: &mut String, sub: &str) {
    if sub.is_empty() {
        return;
    }
    if !path.is_empty() {
        path.push(' ');
    }
    path.push_str(sub);
}

fn contour_path(pl: &Polyline<f64>, tx: impl Fn(f64, f64) -> (f64, f64)) -> String {
    let n = pl.vertex_count();
    if n < 2 {
        return String::new();
    }
    let mut out = String::new();
    let (sx, sy) = tx(pl.at(0).x, pl.at(0).y);
    let _ = write!(out, "M {} {}", fmt_num(sx), fmt_num(sy));

    for i in 0..n {
        let v1 = pl.at(i);
        let v2 = pl.at((i + 1) % n);
        let (ex, ey) = tx(v2.x, v2.y);
        if v1.bulge_is_zero() {
            if i + 1 < n {
                let _ = write!(out, " L {} {}", fmt_num(ex), fmt_num(ey));
            }
            continue;
        }
        let (radius, _) = seg_arc_radius_and_center(v1, v2);
        // The y flip reverses the turning direction.
        let bulge_svg = -v1.bulge;
        let large = u8::from(bulge_svg.abs() > 1.0);
        let sweep = u8::from(bulge_svg >= 0.0);
        let r = fmt_num(radius);
        let _ = write!(
            out,
            " A {r} {r} 0 {large} {sweep} {} {}",
            fmt_num(ex),
            fmt_num(ey)
        );
    }
    out.push_str(" Z");
    out
}

fn fmt_num(v: f64) -> String {
    let v = if v.abs() < 1e-9 { 0.0 } else { v };
    let mut buf = ryu::Buffer::new();
    let s = buf.format(v);
    s.strip_suffix(".0").unwrap_or(s).to_string()
}

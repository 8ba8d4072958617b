//! Corner treatment and kerf compensation.

use kbplate_core::CornerType;
use kbplate_geometry::region::normalize_winding;
use kbplate_geometry::{
    Bounds, CornerStyle, GeometryError, GeometryKernel, PlineOrientation, Polyline,
};
use tracing::debug;

use crate::assembler::RawPlate;

/// Fabrication-ready outline of one layer: outer counter-clockwise, holes clockwise.
#[derive(Debug, Clone)]
pub struct FinishedPlate {
    pub outer: Polyline<f64>,
    pub holes: Vec<Polyline<f64>>,
    pub bounds: Bounds,
}

impl FinishedPlate {
    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    pub fn contours(&self) -> impl Iterator<Item = &Polyline<f64>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }
}

fn corner_style(corner_type: CornerType) -> CornerStyle {
    match corner_type {
        CornerType::Round => CornerStyle::Round,
        CornerType::Bevel => CornerStyle::Bevel,
    }
}

fn single(
    mut pieces: Vec<Polyline<f64>>,
    what: &'static str,
    distance: f64,
) -> Result<Polyline<f64>, GeometryError> {
    match (pieces.pop(), pieces.len()) {
        (Some(p), 0) => Ok(p),
        (p, n) => Err(GeometryError::OffsetFailed {
            what,
            distance,
            pieces: n + usize::from(p.is_some()),
        }),
    }
}

/// Round or bevel the outer corners, then offset the outer contour outward and every hole
/// inward by `kerf / 2`.
pub fn finish<K: GeometryKernel>(
    kernel: &K,
    raw: RawPlate,
    kerf: f64,
    corner_radius: f64,
    corner_type: CornerType,
) -> Result<FinishedPlate, GeometryError> {
    let outer = kernel.treat_corners(&raw.outer, corner_radius, corner_style(corner_type));

    let half = kerf / 2.0;
    let outer = single(kernel.offset(&outer, half), "outer boundary", half)?;
    let mut holes = Vec::with_capacity(raw.holes.len());
    for hole in &raw.holes {
        holes.push(single(kernel.offset(hole, -half), "hole", -half)?);
    }
    if kerf < 0.0 && holes.len() > 1 {
        // Growing holes may now touch.
        holes = kernel.union(holes).pos;
    }
    debug!(kerf, holes = holes.len(), "finished contours");

    let outer = normalize_winding(vec![outer], PlineOrientation::CounterClockwise)
        .pop()
        .ok_or(GeometryError::BoundaryConsumed)?;
    let holes = normalize_winding(holes, PlineOrientation::Clockwise);
    if let Some(i) = holes.iter().position(|h| !kernel.contains(&outer, h)) {
        return Err(GeometryError::HoleEscaped { index: i });
    }

    let bounds = Bounds::of(&outer).ok_or(GeometryError::BoundaryConsumed)?;
    Ok(FinishedPlate {
        outer,
        holes,
        bounds,
    })
}

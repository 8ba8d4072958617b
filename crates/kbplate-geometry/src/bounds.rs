use cavalier_contours::polyline::{PlineSource, Polyline};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Extents of a contour, arcs included. `None` for empty or degenerate polylines.
    pub fn of(pl: &Polyline<f64>) -> Option<Self> {
        if pl.vertex_count() < 2 {
            return None;
        }
        pl.extents()
            .map(|bb| Self::new(bb.min_x, bb.min_y, bb.max_x, bb.max_y))
    }

    pub fn of_all<'a>(plines: impl IntoIterator<Item = &'a Polyline<f64>>) -> Option<Self> {
        plines
            .into_iter()
            .filter_map(Self::of)
            .reduce(|a, b| a.union(&b))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Grow by `dx` on the left and right and by `dy` on the top and bottom.
    pub fn expand(&self, dx: f64, dy: f64) -> Bounds {
        Bounds::new(
            self.min_x - dx,
            self.min_y - dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

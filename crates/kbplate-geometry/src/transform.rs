use cavalier_contours::polyline::{PlineSource, PlineVertex, Polyline};

/// 2D affine map `p' = M p + t`, with `M = [[a, b], [c, d]]`.
///
/// Transforms compose left to right with [`Transform::then`], so
/// `Transform::rotate(..).then(Transform::translate(..))` rotates first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    tx: f64,
    ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn translate(dx: f64, dy: f64) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::identity()
        }
    }

    /// Rotation about the origin. Positive angles turn x toward y.
    pub fn rotate(angle_deg: f64) -> Self {
        let (s, c) = angle_deg.to_radians().sin_cos();
        Self {
            a: c,
            b: -s,
            c: s,
            d: c,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn rotate_about(angle_deg: f64, origin: [f64; 2]) -> Self {
        Self::translate(-origin[0], -origin[1])
            .then(Self::rotate(angle_deg))
            .then(Self::translate(origin[0], origin[1]))
    }

    /// Mirror across the x axis (`y -> -y`).
    pub fn flip_y() -> Self {
        Self {
            d: -1.0,
            ..Self::identity()
        }
    }

    /// `self` followed by `next`.
    #[must_use]
    pub fn then(self, next: Transform) -> Transform {
        Transform {
            a: next.a * self.a + next.b * self.c,
            b: next.a * self.b + next.b * self.d,
            c: next.c * self.a + next.d * self.c,
            d: next.c * self.b + next.d * self.d,
            tx: next.a * self.tx + next.b * self.ty + next.tx,
            ty: next.c * self.tx + next.d * self.ty + next.ty,
        }
    }

    pub fn is_mirroring(&self) -> bool {
        self.a * self.d - self.b * self.c < 0.0
    }

    pub fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        [
            self.a * p[0] + self.b * p[1] + self.tx,
            self.c * p[0] + self.d * p[1] + self.ty,
        ]
    }

    /// Map every vertex of `pl`. Mirroring maps flip arc direction, so bulges change sign.
    ///
    /// Only similarity transforms keep arcs circular; shears are not supported.
    pub fn apply_pline(&self, pl: &Polyline<f64>) -> Polyline<f64> {
        let bulge_sign = if self.is_mirroring() { -1.0 } else { 1.0 };
        let mut out = if pl.is_closed() {
            Polyline::new_closed()
        } else {
            Polyline::new()
        };
        for v in &pl.vertex_data {
            let [x, y] = self.apply([v.x, v.y]);
            out.vertex_data
                .push(PlineVertex::new(x, y, v.bulge * bulge_sign));
        }
        out
    }
}

use kbplate_core::SwitchType;
use kbplate_geometry::primitives::{polygon, symmetric_polygon};
use kbplate_geometry::Polyline;

/// Half-extent of the square Cherry MX hole.
pub const MX_HALF: f64 = 7.0;
/// Half-extents `(x, y)` of the Alps hole.
pub const ALPS_HALF: (f64, f64) = (7.8, 6.4);

/// Opening-notch band of the `mx-open` variants, measured from the hole center.
const WING_INSIDE: f64 = 2.9;
const WING_OUTSIDE: f64 = 6.0;

/// Switch hole centered on the origin. `grow` widens the hole on each side.
pub fn switch_outline(switch: SwitchType, grow: [f64; 2]) -> Polyline<f64> {
    let m = MX_HALF;
    let (ax, ay) = ALPS_HALF;
    let (wi, wo) = (WING_INSIDE, WING_OUTSIDE);

    match switch {
        SwitchType::Mx => {
            let (hx, hy) = (m + grow[0], m + grow[1]);
            polygon(&[(hx, -hy), (hx, hy), (-hx, hy), (-hx, -hy)])
        }
        SwitchType::Alps => polygon(&[(ax, -ay), (ax, ay), (-ax, ay), (-ax, -ay)]),
        // MX square with the wider, shorter Alps rectangle through it.
        SwitchType::AlpsMx => symmetric_polygon(&[(ax, ay), (m, ay), (m, m)]),
        // Notches on the left and right edges.
        SwitchType::MxOpen => symmetric_polygon(&[
            (m, wi),
            (ax, wi),
            (ax, wo),
            (m, wo),
            (m, m),
        ]),
        // Notches on all four edges.
        SwitchType::MxOpenRotatable => symmetric_polygon(&[
            (m, wi),
            (ax, wi),
            (ax, wo),
            (m, wo),
            (m, m),
            (wo, m),
            (wo, ax),
            (wi, ax),
            (wi, m),
        ]),
    }
}

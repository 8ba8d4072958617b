use kbplate_core::StabilizerType;
use kbplate_geometry::primitives::{polygon, rect_from_corners};
use kbplate_geometry::Polyline;

use crate::switch::MX_HALF;

/// Stabilizer geometry for one table entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilizerSpacing {
    /// Key length in units.
    pub units: f64,
    /// Distance from the key center to each stabilizer center, mm.
    pub spacing: f64,
    /// Default switch offset from the key center along the key, mm.
    pub switch_offset: f64,
}

const fn entry(units: f64, spacing: f64, switch_offset: f64) -> StabilizerSpacing {
    StabilizerSpacing {
        units,
        spacing,
        switch_offset,
    }
}

/// Standard stabilizer positions, ascending by length.
pub const STABILIZER_TABLE: &[StabilizerSpacing] = &[
    entry(2.0, 11.95, 0.0),
    entry(3.0, 19.05, 0.0),
    entry(4.0, 28.575, 0.0),
    entry(4.5, 34.671, 0.0),
    entry(5.5, 42.8625, 0.0),
    entry(6.0, 47.625, 9.525),
    entry(6.25, 50.0, 0.0),
    entry(6.5, 52.38, 0.0),
    entry(7.0, 57.15, 0.0),
    entry(8.0, 66.675, 0.0),
    entry(9.0, 66.675, 0.0),
    entry(10.0, 66.675, 0.0),
];

/// The only length Alps stabilizers are modelled for above 3u.
const ALPS_LONG_UNITS: f64 = 6.5;

// Cherry/Costar housing dimensions, mm from the key center.
const MX_STAB_INSIDE_Y: f64 = 4.75;
const MX_STAB_INSIDE_X: f64 = 8.575;
const STAB_TOP_Y: f64 = 5.5;
const COSTAR_INSIDE_X: f64 = 10.3;
const COSTAR_TOP_Y: f64 = 6.5;
const COSTAR_OUTSIDE_X: f64 = 13.6;
const MX_STAB_OUTSIDE_X: f64 = 15.225;
const WIRE_Y: f64 = 2.3;
const WIRE_WING_X: f64 = 16.1;
const WING_BOTTOM_Y: f64 = 0.5;
const HOUSING_BOTTOM_Y: f64 = 6.75;
const COSTAR_BOTTOM_Y: f64 = 7.75;
const SWITCH_BAND_BOTTOM_Y: f64 = 6.0;
const BOTTOM_NOTCH_Y: f64 = 8.0;
const HOUSING_HALF_WIDTH: f64 = 3.325;
const NOTCH_HALF_WIDTH: f64 = 1.65;
const HOUSING_OUTSIDE_X: f64 = 4.2;

// Alps slots.
const ALPS_TOP_Y: f64 = 4.0;
const ALPS_BOTTOM_Y: f64 = 9.0;
const ALPS_SLOT_WIDTH: f64 = 2.7;

/// Spacing entry for a key of `length` units (`length >= 2`).
///
/// Keys from 2u up to (not including) 3u share the 2u entry. Longer keys use an exact table match
/// or, except for Alps, the nearest smaller entry; a fallback entry never carries a switch offset.
/// Returns `None` when the family has no geometry for the length.
pub fn stabilizer_spacing(stabilizer: StabilizerType, length: f64) -> Option<StabilizerSpacing> {
    if !length.is_finite() || length < 2.0 {
        return None;
    }
    if length < 3.0 {
        return Some(STABILIZER_TABLE[0]);
    }
    if let Some(exact) = STABILIZER_TABLE
        .iter()
        .find(|e| (e.units - length).abs() < 1e-9)
    {
        if stabilizer == StabilizerType::Alps && exact.units != ALPS_LONG_UNITS {
            return None;
        }
        return Some(*exact);
    }
    if stabilizer == StabilizerType::Alps {
        return None;
    }
    STABILIZER_TABLE
        .iter()
        .rev()
        .find(|e| e.units < length)
        .map(|e| StabilizerSpacing {
            units: length,
            switch_offset: 0.0,
            ..*e
        })
}

/// Right half of an outline symmetric about the y axis, closed by its mirror.
fn mirrored(right: &[(f64, f64)]) -> Polyline<f64> {
    let mut pts = right.to_vec();
    pts.extend(right.iter().rev().map(|&(x, y)| (-x, y)));
    polygon(&pts)
}

fn slot_pair(inside_x: f64, outside_x: f64, top_y: f64, bottom_y: f64) -> Vec<Polyline<f64>> {
    vec![
        rect_from_corners((-outside_x, top_y), (-inside_x, bottom_y)),
        rect_from_corners((inside_x, top_y), (outside_x, bottom_y)),
    ]
}

/// Stabilizer contours centered on the key, unrotated.
pub(crate) fn outlines(
    stabilizer: StabilizerType,
    length: f64,
    spacing: StabilizerSpacing,
) -> Option<Vec<Polyline<f64>>> {
    if length < 3.0 {
        Some(two_unit(stabilizer, length))
    } else {
        long(stabilizer, spacing.spacing)
    }
}

fn two_unit(stabilizer: StabilizerType, length: f64) -> Vec<Polyline<f64>> {
    match stabilizer {
        // Both housings joined through the switch band.
        StabilizerType::Cherry => vec![mirrored(&[
            (MX_STAB_INSIDE_X, -MX_STAB_INSIDE_Y),
            (MX_STAB_INSIDE_X, -STAB_TOP_Y),
            (MX_STAB_OUTSIDE_X, -STAB_TOP_Y),
            (MX_STAB_OUTSIDE_X, -WIRE_Y),
            (WIRE_WING_X, -WIRE_Y),
            (WIRE_WING_X, WING_BOTTOM_Y),
            (MX_STAB_OUTSIDE_X, WING_BOTTOM_Y),
            (MX_STAB_OUTSIDE_X, HOUSING_BOTTOM_Y),
            (COSTAR_OUTSIDE_X, HOUSING_BOTTOM_Y),
            (COSTAR_OUTSIDE_X, BOTTOM_NOTCH_Y),
            (COSTAR_INSIDE_X, BOTTOM_NOTCH_Y),
            (COSTAR_INSIDE_X, HOUSING_BOTTOM_Y),
            (MX_STAB_INSIDE_X, HOUSING_BOTTOM_Y),
            (MX_STAB_INSIDE_X, SWITCH_BAND_BOTTOM_Y),
        ])],
        // Includes the switch opening itself.
        StabilizerType::CherryCostar => vec![mirrored(&[
            (MX_HALF, -MX_HALF),
            (MX_HALF, -MX_STAB_INSIDE_Y),
            (MX_STAB_INSIDE_X, -MX_STAB_INSIDE_Y),
            (MX_STAB_INSIDE_X, -STAB_TOP_Y),
            (COSTAR_INSIDE_X, -STAB_TOP_Y),
            (COSTAR_INSIDE_X, -COSTAR_TOP_Y),
            (COSTAR_OUTSIDE_X, -COSTAR_TOP_Y),
            (COSTAR_OUTSIDE_X, -STAB_TOP_Y),
            (MX_STAB_OUTSIDE_X, -STAB_TOP_Y),
            (MX_STAB_OUTSIDE_X, -WIRE_Y),
            (WIRE_WING_X, -WIRE_Y),
            (WIRE_WING_X, WING_BOTTOM_Y),
            (MX_STAB_OUTSIDE_X, WING_BOTTOM_Y),
            (MX_STAB_OUTSIDE_X, HOUSING_BOTTOM_Y),
            (COSTAR_OUTSIDE_X, HOUSING_BOTTOM_Y),
            (COSTAR_OUTSIDE_X, COSTAR_BOTTOM_Y),
            (COSTAR_INSIDE_X, COSTAR_BOTTOM_Y),
            (COSTAR_INSIDE_X, HOUSING_BOTTOM_Y),
            (MX_STAB_INSIDE_X, HOUSING_BOTTOM_Y),
            (MX_STAB_INSIDE_X, SWITCH_BAND_BOTTOM_Y),
            (MX_HALF, SWITCH_BAND_BOTTOM_Y),
            (MX_HALF, MX_HALF),
        ])],
        StabilizerType::Costar => slot_pair(
            COSTAR_INSIDE_X,
            COSTAR_OUTSIDE_X,
            -COSTAR_TOP_Y,
            COSTAR_BOTTOM_Y,
        ),
        StabilizerType::Alps | StabilizerType::Matias => {
            let inside = if (length - 2.75).abs() < 1e-9 {
                16.7
            } else {
                12.7
            };
            slot_pair(inside, inside + ALPS_SLOT_WIDTH, ALPS_TOP_Y, ALPS_BOTTOM_Y)
        }
    }
}

fn long(stabilizer: StabilizerType, x: f64) -> Option<Vec<Polyline<f64>>> {
    let hw = HOUSING_HALF_WIDTH;
    let nw = NOTCH_HALF_WIDTH;
    let ox = HOUSING_OUTSIDE_X;

    let outlines = match stabilizer {
        // Two housings joined by a wire channel.
        StabilizerType::Cherry => vec![mirrored(&[
            (x - hw, -WIRE_Y),
            (x - hw, -STAB_TOP_Y),
            (x + hw, -STAB_TOP_Y),
            (x + hw, -WIRE_Y),
            (x + ox, -WIRE_Y),
            (x + ox, WING_BOTTOM_Y),
            (x + hw, WING_BOTTOM_Y),
            (x + hw, HOUSING_BOTTOM_Y),
            (x + nw, HOUSING_BOTTOM_Y),
            (x + nw, BOTTOM_NOTCH_Y),
            (x - nw, BOTTOM_NOTCH_Y),
            (x - nw, HOUSING_BOTTOM_Y),
            (x - hw, HOUSING_BOTTOM_Y),
            (x - hw, WIRE_Y),
        ])],
        StabilizerType::CherryCostar => vec![mirrored(&[
            (x - hw, -WIRE_Y),
            (x - hw, -STAB_TOP_Y),
            (x - nw, -STAB_TOP_Y),
            (x - nw, -COSTAR_TOP_Y),
            (x + nw, -COSTAR_TOP_Y),
            (x + nw, -STAB_TOP_Y),
            (x + hw, -STAB_TOP_Y),
            (x + hw, -WIRE_Y),
            (x + ox, -WIRE_Y),
            (x + ox, WING_BOTTOM_Y),
            (x + hw, WING_BOTTOM_Y),
            (x + hw, HOUSING_BOTTOM_Y),
            (x + nw, HOUSING_BOTTOM_Y),
            (x + nw, COSTAR_BOTTOM_Y),
            (x - nw, COSTAR_BOTTOM_Y),
            (x - nw, HOUSING_BOTTOM_Y),
            (x - hw, HOUSING_BOTTOM_Y),
            (x - hw, WIRE_Y),
        ])],
        StabilizerType::Costar | StabilizerType::Matias => {
            slot_pair(x - nw, x + nw, -COSTAR_TOP_Y, COSTAR_BOTTOM_Y)
        }
        StabilizerType::Alps => {
            // 12.7 mm inside edge at 2u plus 31.3 mm for the 6.5u wire.
            let inside = 12.7 + 31.3;
            slot_pair(inside, inside + ALPS_SLOT_WIDTH, ALPS_TOP_Y, ALPS_BOTTOM_Y)
        }
    };
    Some(outlines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use kbplate_geometry::{Bounds, PlineSource};

    #[test]
    fn two_unit_family_shares_an_entry() {
        for len in [2.0, 2.25, 2.75] {
            let s = stabilizer_spacing(StabilizerType::Cherry, len).unwrap();
            assert_eq!(s.units, 2.0);
        }
    }

    #[test]
    fn long_keys_fall_back_to_smaller_entry() {
        let s = stabilizer_spacing(StabilizerType::Cherry, 7.5).unwrap();
        assert_abs_diff_eq!(s.spacing, 57.15);
        let s = stabilizer_spacing(StabilizerType::Costar, 12.0).unwrap();
        assert_abs_diff_eq!(s.spacing, 66.675);
        let s = stabilizer_spacing(StabilizerType::Matias, 6.1).unwrap();
        assert_eq!(s.switch_offset, 0.0);
    }

    #[test]
    fn alps_long_keys_only_at_six_and_a_half() {
        assert!(stabilizer_spacing(StabilizerType::Alps, 6.5).is_some());
        assert!(stabilizer_spacing(StabilizerType::Alps, 6.25).is_none());
        assert!(stabilizer_spacing(StabilizerType::Alps, 7.5).is_none());
        assert!(stabilizer_spacing(StabilizerType::Alps, 2.75).is_some());
    }

    #[test]
    fn long_cherry_spans_both_housings() {
        let s = stabilizer_spacing(StabilizerType::Cherry, 6.25).unwrap();
        let pls = outlines(StabilizerType::Cherry, 6.25, s).unwrap();
        assert_eq!(pls.len(), 1);
        assert_eq!(pls[0].vertex_count(), 28);
        let b = Bounds::of(&pls[0]).unwrap();
        assert_abs_diff_eq!(b.max_x, 50.0 + HOUSING_OUTSIDE_X, epsilon = 1e-9);
        assert_abs_diff_eq!(b.min_x, -50.0 - HOUSING_OUTSIDE_X, epsilon = 1e-9);
    }

    #[test]
    fn costar_slots_are_separate() {
        let s = stabilizer_spacing(StabilizerType::Costar, 2.0).unwrap();
        let pls = outlines(StabilizerType::Costar, 2.0, s).unwrap();
        assert_eq!(pls.len(), 2);
        for pl in &pls {
            assert_abs_diff_eq!(pl.area().abs(), 3.3 * 14.25, epsilon = 1e-9);
        }
    }

    #[test]
    fn alps_two_seventy_five_uses_wide_slots() {
        let s = stabilizer_spacing(StabilizerType::Alps, 2.75).unwrap();
        let pls = outlines(StabilizerType::Alps, 2.75, s).unwrap();
        let b = Bounds::of_all(&pls).unwrap();
        assert_abs_diff_eq!(b.max_x, 16.7 + ALPS_SLOT_WIDTH, epsilon = 1e-9);
    }
}

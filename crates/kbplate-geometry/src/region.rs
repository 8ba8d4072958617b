use cavalier_contours::polyline::{
    BooleanOp, BooleanResultInfo, PlineOrientation, PlineSource, PlineSourceMut, Polyline,
};

use crate::primitives::is_valid_closed_polyline;

/// Tolerance used when collapsing redundant vertices after boolean operations.
pub const SIMPLIFY_EPS: f64 = 1e-6;

/// A set of filled contours (`pos`, counter-clockwise) and holes (`neg`, clockwise).
#[derive(Debug, Clone, Default)]
pub struct Region {
    pub pos: Vec<Polyline<f64>>,
    pub neg: Vec<Polyline<f64>>,
}

impl Region {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pos(pos: Vec<Polyline<f64>>) -> Self {
        Self {
            pos: normalize_winding(pos, PlineOrientation::CounterClockwise),
            neg: vec![],
        }
    }

    /// Union of an arbitrary set of closed contours.
    ///
    /// Holes enclosed by the union (e.g. a ring of overlapping cutouts) end up in `neg`.
    pub fn union_all(plines: Vec<Polyline<f64>>) -> Self {
        let (pos, neg) = union_pline_set(plines);
        Self {
            pos: normalize_winding(pos, PlineOrientation::CounterClockwise),
            neg: normalize_winding(neg, PlineOrientation::Clockwise),
        }
    }

    /// Subtract every cutter from every filled contour.
    pub fn subtract_all(&mut self, cutters: &[Polyline<f64>]) {
        let mut new_pos: Vec<Polyline<f64>> = Vec::new();
        let mut new_neg: Vec<Polyline<f64>> = Vec::new();

        for p in std::mem::take(&mut self.pos) {
            let mut cur_pos = vec![p];

            for c in cutters {
                let mut next_pos: Vec<Polyline<f64>> = Vec::new();
                for cp in cur_pos {
                    let res = cp.boolean(c, BooleanOp::Not);
                    if matches!(res.result_info, BooleanResultInfo::InvalidInput) {
                        next_pos.push(cp);
                        continue;
                    }
                    next_pos.extend(res.pos_plines.into_iter().map(|p| simplify(p.pline)));
                    new_neg.extend(res.neg_plines.into_iter().map(|p| simplify(p.pline)));
                }
                cur_pos = next_pos;
            }

            new_pos.extend(cur_pos);
        }

        self.pos = normalize_winding(new_pos, PlineOrientation::CounterClockwise);
        let mut all_neg = std::mem::take(&mut self.neg);
        all_neg.extend(new_neg);
        let (holes, _) = union_pline_set(all_neg);
        self.neg = normalize_winding(holes, PlineOrientation::Clockwise);
    }
}

/// Pairwise merge until stable. Returns the merged filled contours and any holes the unions
/// produced. O(n^2) per pass; cutout counts stay in the low hundreds.
pub fn union_pline_set(
    mut plines: Vec<Polyline<f64>>,
) -> (Vec<Polyline<f64>>, Vec<Polyline<f64>>) {
    plines.retain(is_valid_closed_polyline);
    plines = plines.into_iter().map(simplify).collect();

    let mut holes: Vec<Polyline<f64>> = Vec::new();

    let mut i = 0usize;
    while i < plines.len() {
        let mut merged = false;
        let mut j = i + 1;
        while j < plines.len() {
            let res = plines[i].boolean(&plines[j], BooleanOp::Or);
            match res.result_info {
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => {
                    j += 1;
                }
                _ => {
                    let mut next: Vec<Polyline<f64>> = res
                        .pos_plines
                        .into_iter()
                        .map(|p| simplify(p.pline))
                        .collect();
                    holes.extend(res.neg_plines.into_iter().map(|p| simplify(p.pline)));

                    plines.swap_remove(j);
                    plines.swap_remove(i);
                    plines.append(&mut next);
                    merged = true;
                    break;
                }
            }
        }
        if merged {
            i = 0;
        } else {
            i += 1;
        }
    }

    if holes.len() > 1 {
        holes = union_pline_set(holes).0;
    }
    (plines, holes)
}

pub fn normalize_winding(
    plines: Vec<Polyline<f64>>,
    desired: PlineOrientation,
) -> Vec<Polyline<f64>> {
    plines
        .into_iter()
        .map(|mut pl| {
            let orientation = pl.orientation();
            if orientation != PlineOrientation::Open && orientation != desired {
                pl.invert_direction_mut();
            }
            pl
        })
        .collect()
}

pub fn simplify(p: Polyline<f64>) -> Polyline<f64> {
    p.remove_redundant(SIMPLIFY_EPS).unwrap_or(p)
}

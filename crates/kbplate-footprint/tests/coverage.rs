use kbplate_core::{StabilizerType, SwitchType};
use kbplate_footprint::{footprint_for, CutoutKind, FootprintError, STABILIZER_TABLE};
use kbplate_geometry::{CavcKernel, GeometryKernel, PlineSource};

const SIZES: &[f64] = &[
    1.0, 1.25, 1.5, 1.75, 2.0, 2.25, 2.75, 3.0, 4.0, 4.5, 5.5, 6.0, 6.25, 6.5, 7.0, 8.0, 9.0, 10.0,
];

fn alps_unsupported(stab: StabilizerType, len: f64) -> bool {
    stab == StabilizerType::Alps && len >= 3.0 && len != 6.5
}

#[test]
fn every_standard_combination_is_defined_or_rejected() {
    let kernel = CavcKernel;
    for &switch in SwitchType::ALL {
        for &stab in StabilizerType::ALL {
            for &size in SIZES {
                for (w, h) in [(size, 1.0), (1.0, size)] {
                    let res = footprint_for(switch, stab, w, h);
                    if alps_unsupported(stab, size) {
                        assert!(
                            matches!(res, Err(FootprintError::UnsupportedFootprint { .. })),
                            "{switch} {stab} {w}x{h} should be unsupported"
                        );
                        continue;
                    }
                    let fp = res.unwrap_or_else(|e| panic!("{switch} {stab} {w}x{h}: {e}"));
                    assert_eq!(fp.of_kind(CutoutKind::Switch).count(), 1);
                    let stabs = fp.of_kind(CutoutKind::Stabilizer).count();
                    assert_eq!(stabs == 0, size < 2.0, "{switch} {stab} {w}x{h}");
                    for pl in fp.contours() {
                        assert!(pl.is_closed());
                        assert!(pl.area().abs() > 1.0);
                        assert!(!kernel.self_intersects(pl), "{switch} {stab} {w}x{h}");
                    }
                }
            }
        }
    }
}

#[test]
fn table_is_sorted_and_covers_the_two_unit_family() {
    assert_eq!(STABILIZER_TABLE[0].units, 2.0);
    for pair in STABILIZER_TABLE.windows(2) {
        assert!(pair[0].units < pair[1].units);
    }
}

#[test]
fn footprints_are_deterministic() {
    let a = footprint_for(SwitchType::MxOpen, StabilizerType::CherryCostar, 6.25, 1.0).unwrap();
    let b = footprint_for(SwitchType::MxOpen, StabilizerType::CherryCostar, 6.25, 1.0).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.contours().zip(b.contours()) {
        assert_eq!(x.vertex_data, y.vertex_data);
    }
}

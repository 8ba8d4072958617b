use kbplate_geometry::primitives::rectangle;
use kbplate_geometry::{Bounds, CavcKernel, CornerStyle, GeometryKernel, PlineSource};
use proptest::prelude::*;

proptest! {
    #[test]
    fn offset_out_then_in_restores_rectangle(
        w in 5.0f64..200.0,
        h in 5.0f64..200.0,
        kerf in 0.01f64..1.0,
    ) {
        let k = CavcKernel;
        let rect = rectangle((0.0, 0.0), (w, h), 0.0);
        let grown = k.offset(&rect, kerf / 2.0);
        prop_assert_eq!(grown.len(), 1);
        let back = k.offset(&grown[0], -kerf / 2.0);
        prop_assert_eq!(back.len(), 1);

        let a = Bounds::of(&rect).unwrap();
        let b = Bounds::of(&back[0]).unwrap();
        prop_assert!((a.width() - b.width()).abs() < 1e-6);
        prop_assert!((a.height() - b.height()).abs() < 1e-6);
        prop_assert!((rect.area().abs() - back[0].area().abs()).abs() < 1e-6);
    }

    #[test]
    fn zero_radius_corner_treatment_is_identity(
        w in 1.0f64..100.0,
        h in 1.0f64..100.0,
        bevel in any::<bool>(),
    ) {
        let k = CavcKernel;
        let rect = rectangle((w / 2.0, h / 2.0), (w, h), 0.0);
        let style = if bevel { CornerStyle::Bevel } else { CornerStyle::Round };
        let out = k.treat_corners(&rect, 0.0, style);
        prop_assert_eq!(out.vertex_data.len(), rect.vertex_data.len());
        for (a, b) in out.vertex_data.iter().zip(rect.vertex_data.iter()) {
            prop_assert_eq!(a.x, b.x);
            prop_assert_eq!(a.y, b.y);
            prop_assert_eq!(a.bulge, b.bulge);
        }
    }
}

//! Key-unit layout to plate-space millimetres.
//!
//! Every key goes through the same chain: key-local contour, translate to the key center on the
//! grid, rotate about the key's declared origin, flip to y-up plate space.

use kbplate_core::{KeyRecord, KeyboardConfig};
use kbplate_footprint::{Footprint, FootprintError, FootprintLibrary, FootprintRequest};
use kbplate_geometry::primitives::rectangle;
use kbplate_geometry::{Polyline, Transform};

/// A key's cut contours and outline, already in plate space.
#[derive(Debug, Clone)]
pub struct PositionedFootprint {
    pub key_index: usize,
    pub footprint: Footprint,
    /// The key's own rectangle(s); used for bounding boxes, never cut.
    pub outline: Vec<Polyline<f64>>,
    /// Per-key kerf override (full width) the cutouts should be compensated with.
    pub kerf: Option<f64>,
}

/// Which contour set a layer cuts for each key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCutoutSet {
    /// Switch holes and stabilizers.
    Footprints,
    /// Keycap-sized openings.
    KeycapOpenings,
}

#[derive(Debug, Clone, Copy)]
pub struct Placer<'a> {
    config: &'a KeyboardConfig,
    library: FootprintLibrary,
}

impl<'a> Placer<'a> {
    pub fn new(config: &'a KeyboardConfig) -> Self {
        Self {
            config,
            library: FootprintLibrary::new(config.switch_grow),
        }
    }

    /// Map from key-local millimetres (origin at the key center, y down) to plate space.
    pub fn key_transform(&self, key: &KeyRecord) -> Transform {
        let u = self.config.key_spacing;
        let [cx, cy] = key.center();
        let origin = [key.rotation.origin_x * u, key.rotation.origin_y * u];
        Transform::translate(cx * u, cy * u)
            .then(Transform::rotate_about(key.rotation.angle, origin))
            .then(Transform::flip_y())
    }

    /// The key's rectangle plus its secondary rectangle, in key-local millimetres.
    fn local_outline(&self, key: &KeyRecord) -> Vec<Polyline<f64>> {
        let u = self.config.key_spacing;
        let mut out = vec![rectangle((0.0, 0.0), (key.width * u, key.height * u), 0.0)];
        if let Some(s) = &key.secondary {
            let center = (
                (s.x + s.width / 2.0 - key.width / 2.0) * u,
                (s.y + s.height / 2.0 - key.height / 2.0) * u,
            );
            out.push(rectangle(center, (s.width * u, s.height * u), 0.0));
        }
        out
    }

    pub fn key_outline(&self, key: &KeyRecord) -> Vec<Polyline<f64>> {
        let t = self.key_transform(key);
        self.local_outline(key)
            .iter()
            .map(|pl| t.apply_pline(pl))
            .collect()
    }

    fn local_footprint(
        &self,
        key: &KeyRecord,
        set: KeyCutoutSet,
    ) -> Result<Footprint, FootprintError> {
        match set {
            KeyCutoutSet::Footprints => {
                let o = &key.overrides;
                let req = FootprintRequest {
                    switch_rotation: o.switch_rotation,
                    stabilizer_rotation: o.stabilizer_rotation,
                    center_offset: o.center_offset,
                    ..FootprintRequest::new(
                        o.switch_type.unwrap_or(self.config.switch_type),
                        o.stabilizer_type.unwrap_or(self.config.stabilizer_type),
                        key.width,
                        key.height,
                    )
                };
                self.library.footprint(&req)
            }
            KeyCutoutSet::KeycapOpenings => {
                self.library
                    .keycap_opening(key.width, key.height, self.config.key_spacing)
            }
        }
    }

    /// Position one key's cutouts and outline.
    pub fn place(
        &self,
        index: usize,
        key: &KeyRecord,
        set: KeyCutoutSet,
    ) -> Result<PositionedFootprint, FootprintError> {
        let t = self.key_transform(key);
        let footprint = self.local_footprint(key, set)?.transformed(&t);
        Ok(PositionedFootprint {
            key_index: index,
            footprint,
            outline: self.key_outline(key),
            kerf: key.overrides.kerf,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use kbplate_footprint::CutoutKind;
    use kbplate_geometry::Bounds;

    fn switch_center(p: &PositionedFootprint) -> (f64, f64) {
        Bounds::of_all(p.footprint.of_kind(CutoutKind::Switch))
            .unwrap()
            .center()
    }

    #[test]
    fn unrotated_key_lands_on_grid_with_y_up() {
        let cfg = KeyboardConfig::default();
        let placer = Placer::new(&cfg);
        let p = placer
            .place(0, &KeyRecord::unit(2.0, 1.0), KeyCutoutSet::Footprints)
            .unwrap();
        let (x, y) = switch_center(&p);
        assert_abs_diff_eq!(x, 2.5 * 19.05, epsilon = 1e-9);
        assert_abs_diff_eq!(y, -1.5 * 19.05, epsilon = 1e-9);
    }

    #[test]
    fn rotation_is_about_the_declared_origin() {
        let cfg = KeyboardConfig::default();
        let placer = Placer::new(&cfg);
        // Quarter turn clockwise on screen about the key's top-left corner.
        let key = KeyRecord::unit(0.0, 0.0).with_rotation(90.0, 0.0, 0.0);
        let p = placer.place(0, &key, KeyCutoutSet::Footprints).unwrap();
        let (x, y) = switch_center(&p);
        let h = 19.05 / 2.0;
        assert_abs_diff_eq!(x, -h, epsilon = 1e-9);
        assert_abs_diff_eq!(y, -h, epsilon = 1e-9);
    }

    #[test]
    fn secondary_rectangle_extends_outline() {
        let cfg = KeyboardConfig::default();
        let placer = Placer::new(&cfg);
        // ISO enter: 1.25 x 2 primary, 1.5 x 1 secondary shifted left.
        let key = KeyRecord::new(0.25, 0.0, 1.25, 2.0).with_secondary(
            kbplate_core::SecondaryRect {
                x: -0.25,
                y: 0.0,
                width: 1.5,
                height: 1.0,
            },
        );
        let outline = placer.key_outline(&key);
        assert_eq!(outline.len(), 2);
        let b = Bounds::of_all(&outline).unwrap();
        assert_abs_diff_eq!(b.min_x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.width(), 1.5 * 19.05, epsilon = 1e-9);
        assert_abs_diff_eq!(b.height(), 2.0 * 19.05, epsilon = 1e-9);
    }

    #[test]
    fn per_key_switch_override_is_used() {
        let cfg = KeyboardConfig::default();
        let placer = Placer::new(&cfg);
        let key = KeyRecord::unit(0.0, 0.0).with_overrides(kbplate_core::KeyOverrides {
            switch_type: Some(kbplate_core::SwitchType::Alps),
            kerf: Some(0.2),
            ..Default::default()
        });
        let p = placer.place(0, &key, KeyCutoutSet::Footprints).unwrap();
        let b = Bounds::of_all(p.footprint.of_kind(CutoutKind::Switch)).unwrap();
        assert_abs_diff_eq!(b.width(), 15.6, epsilon = 1e-9);
        assert_eq!(p.kerf, Some(0.2));
    }
}

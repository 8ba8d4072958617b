//! Cut contours for switches, stabilizers and keycap openings.
//!
//! Everything here is a pure function of its arguments. Contours are in key-local millimetres:
//! origin at the key center, x along the key, y growing downward.

mod stabilizer;
mod switch;

use kbplate_core::{StabilizerType, SwitchType};
use kbplate_geometry::primitives::rectangle;
use kbplate_geometry::{Polyline, Transform};
use thiserror::Error;

pub use stabilizer::{stabilizer_spacing, StabilizerSpacing, STABILIZER_TABLE};
pub use switch::{switch_outline, ALPS_HALF, MX_HALF};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FootprintError {
    #[error("no {family} footprint for a {width}u x {height}u key")]
    UnsupportedFootprint {
        family: String,
        width: f64,
        height: f64,
    },
}

impl FootprintError {
    fn unsupported(family: impl ToString, width: f64, height: f64) -> Self {
        Self::UnsupportedFootprint {
            family: family.to_string(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CutoutKind {
    Switch,
    Stabilizer,
    KeycapOpening,
}

#[derive(Debug, Clone)]
pub struct Cutout {
    pub kind: CutoutKind,
    pub contour: Polyline<f64>,
}

/// The cut contours of one key, in key-local coordinates.
#[derive(Debug, Clone, Default)]
pub struct Footprint {
    pub cutouts: Vec<Cutout>,
}

impl Footprint {
    fn push(&mut self, kind: CutoutKind, contour: Polyline<f64>) {
        self.cutouts.push(Cutout { kind, contour });
    }

    pub fn contours(&self) -> impl Iterator<Item = &Polyline<f64>> {
        self.cutouts.iter().map(|c| &c.contour)
    }

    pub fn of_kind(&self, kind: CutoutKind) -> impl Iterator<Item = &Polyline<f64>> {
        self.cutouts
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| &c.contour)
    }

    pub fn len(&self) -> usize {
        self.cutouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cutouts.is_empty()
    }

    /// Apply `t` to every contour.
    pub fn transformed(&self, t: &Transform) -> Footprint {
        Footprint {
            cutouts: self
                .cutouts
                .iter()
                .map(|c| Cutout {
                    kind: c.kind,
                    contour: t.apply_pline(&c.contour),
                })
                .collect(),
        }
    }
}

/// Everything that selects a key's switch and stabilizer geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintRequest {
    pub switch: SwitchType,
    pub stabilizer: StabilizerType,
    /// Key size in key units.
    pub width: f64,
    pub height: f64,
    /// Extra rotation of the switch contour about its own center, degrees.
    pub switch_rotation: f64,
    /// Extra rotation of the stabilizer contours about the key center, degrees.
    pub stabilizer_rotation: f64,
    /// Switch offset along the key's long axis, mm. `None` uses the stabilizer table default.
    pub center_offset: Option<f64>,
}

impl FootprintRequest {
    pub fn new(switch: SwitchType, stabilizer: StabilizerType, width: f64, height: f64) -> Self {
        Self {
            switch,
            stabilizer,
            width,
            height,
            switch_rotation: 0.0,
            stabilizer_rotation: 0.0,
            center_offset: None,
        }
    }

    fn is_vertical(&self) -> bool {
        self.height > self.width
    }

    fn length(&self) -> f64 {
        if self.is_vertical() {
            self.height
        } else {
            self.width
        }
    }

    fn check_size(&self, family: impl ToString) -> Result<(), FootprintError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(FootprintError::unsupported(family, self.width, self.height))
        }
    }
}

/// Footprint generator carrying the keyboard-wide knobs that shape cutouts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FootprintLibrary {
    /// Growth of `mx` switch holes on each side, `(x, y)` in mm.
    pub switch_grow: [f64; 2],
}

impl FootprintLibrary {
    pub fn new(switch_grow: [f64; 2]) -> Self {
        Self { switch_grow }
    }

    /// Switch hole plus stabilizer cutouts for one key.
    pub fn footprint(&self, req: &FootprintRequest) -> Result<Footprint, FootprintError> {
        req.check_size(req.switch)?;
        let length = req.length();

        let spacing = if length >= 2.0 {
            let s = stabilizer_spacing(req.stabilizer, length).ok_or_else(|| {
                FootprintError::unsupported(req.stabilizer, req.width, req.height)
            })?;
            Some(s)
        } else {
            None
        };
        let offset = req
            .center_offset
            .or_else(|| spacing.map(|s| s.switch_offset))
            .unwrap_or(0.0);

        let orient = if req.is_vertical() {
            Transform::rotate(90.0)
        } else {
            Transform::identity()
        };

        let mut fp = Footprint::default();

        let switch_xf = Transform::rotate(req.switch_rotation)
            .then(Transform::translate(offset, 0.0))
            .then(orient);
        let grow = if req.switch == SwitchType::Mx {
            self.switch_grow
        } else {
            [0.0, 0.0]
        };
        fp.push(
            CutoutKind::Switch,
            switch_xf.apply_pline(&switch_outline(req.switch, grow)),
        );

        if let Some(spacing) = spacing {
            let stab_xf = orient.then(Transform::rotate(req.stabilizer_rotation));
            let contours =
                stabilizer::outlines(req.stabilizer, length, spacing).ok_or_else(|| {
                    FootprintError::unsupported(req.stabilizer, req.width, req.height)
                })?;
            for c in contours {
                fp.push(CutoutKind::Stabilizer, stab_xf.apply_pline(&c));
            }
        }

        Ok(fp)
    }

    /// Keycap-sized opening used on top layers, with a 0.5 mm clearance on every side.
    pub fn keycap_opening(
        &self,
        width: f64,
        height: f64,
        key_spacing: f64,
    ) -> Result<Footprint, FootprintError> {
        let req = FootprintRequest::new(SwitchType::Mx, StabilizerType::Cherry, width, height);
        req.check_size("keycap")?;
        let half_w = key_spacing / 2.0 * req.length() + 0.5;
        let half_h = key_spacing / 2.0 + 0.5;
        let rotation = if req.is_vertical() { 90.0 } else { 0.0 };

        let mut fp = Footprint::default();
        fp.push(
            CutoutKind::KeycapOpening,
            rectangle((0.0, 0.0), (half_w * 2.0, half_h * 2.0), rotation),
        );
        Ok(fp)
    }
}

/// Footprint for a key with no per-key overrides and no switch growth.
pub fn footprint_for(
    switch: SwitchType,
    stabilizer: StabilizerType,
    key_width: f64,
    key_height: f64,
) -> Result<Footprint, FootprintError> {
    FootprintLibrary::default().footprint(&FootprintRequest::new(
        switch, stabilizer, key_width, key_height,
    ))
}

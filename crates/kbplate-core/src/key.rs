use serde::{Deserialize, Serialize};

use crate::config::{StabilizerType, SwitchType};
use crate::error::ConfigError;

/// A single key as produced by the layout loader.
///
/// Positions and sizes are in key units; `(x, y)` is the top-left corner of the primary
/// rectangle with y growing downward (KLE convention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Second rectangle of a non-rectangular key (ISO enter and friends).
    #[serde(default)]
    pub secondary: Option<SecondaryRect>,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub overrides: KeyOverrides,
}

/// Secondary rectangle, offset relative to the key's `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondaryRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Rotation in degrees (clockwise on screen) about an origin given in key units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub angle: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyOverrides {
    #[serde(default)]
    pub switch_type: Option<SwitchType>,
    #[serde(default)]
    pub stabilizer_type: Option<StabilizerType>,
    /// Full kerf width for this key's cutouts.
    #[serde(default)]
    pub kerf: Option<f64>,
    /// Extra rotation of the switch cutout, degrees.
    #[serde(default)]
    pub switch_rotation: f64,
    /// Extra rotation of the stabilizer cutouts, degrees.
    #[serde(default)]
    pub stabilizer_rotation: f64,
    /// Switch offset from the stabilizer center along the key's long axis, mm.
    #[serde(default)]
    pub center_offset: Option<f64>,
}

impl KeyRecord {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            secondary: None,
            rotation: Rotation::default(),
            label: String::new(),
            overrides: KeyOverrides::default(),
        }
    }

    /// A 1u key at `(x, y)`.
    pub fn unit(x: f64, y: f64) -> Self {
        Self::new(x, y, 1.0, 1.0)
    }

    pub fn with_rotation(mut self, angle: f64, origin_x: f64, origin_y: f64) -> Self {
        self.rotation = Rotation {
            angle,
            origin_x,
            origin_y,
        };
        self
    }

    pub fn with_secondary(mut self, secondary: SecondaryRect) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn with_overrides(mut self, overrides: KeyOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Center of the primary rectangle in key units.
    pub fn center(&self) -> [f64; 2] {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }

    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidKey { index, reason };
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("rotation angle", self.rotation.angle),
            ("rotation origin x", self.rotation.origin_x),
            ("rotation origin y", self.rotation.origin_y),
            ("switch rotation", self.overrides.switch_rotation),
            ("stabilizer rotation", self.overrides.stabilizer_rotation),
        ] {
            if !v.is_finite() {
                return Err(invalid(format!("{name} must be finite (got {v})")));
            }
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(invalid(format!("width must be > 0 (got {})", self.width)));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(invalid(format!("height must be > 0 (got {})", self.height)));
        }
        if let Some(s) = &self.secondary {
            let ok = [s.x, s.y].iter().all(|v| v.is_finite())
                && s.width.is_finite()
                && s.width > 0.0
                && s.height.is_finite()
                && s.height > 0.0;
            if !ok {
                return Err(invalid("secondary rectangle must be finite and non-empty".into()));
            }
        }
        if let Some(k) = self.overrides.kerf {
            if !k.is_finite() {
                return Err(invalid(format!("kerf override must be finite (got {k})")));
            }
        }
        if let Some(c) = self.overrides.center_offset {
            if !c.is_finite() {
                return Err(invalid(format!("center offset must be finite (got {c})")));
            }
        }
        Ok(())
    }
}

/// Validate every key of a layout.
pub(crate) fn validate_keys(keys: &[KeyRecord]) -> Result<(), ConfigError> {
    if keys.is_empty() {
        return Err(ConfigError::NoKeys);
    }
    keys.iter()
        .enumerate()
        .try_for_each(|(i, k)| k.validate(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_middle_of_primary_rect() {
        let k = KeyRecord::new(1.0, 2.0, 2.0, 1.0);
        assert_eq!(k.center(), [2.0, 2.5]);
    }

    #[test]
    fn zero_width_key_is_rejected() {
        let k = KeyRecord::new(0.0, 0.0, 0.0, 1.0);
        let err = k.validate(3).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey { index: 3, .. }));
    }

    #[test]
    fn empty_layout_is_rejected() {
        let cfg = crate::KeyboardConfig::default();
        assert_eq!(cfg.validate_with_keys(&[]).unwrap_err(), ConfigError::NoKeys);
    }
}

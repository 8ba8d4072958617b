use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::key::{validate_keys, KeyRecord};

/// Millimetres per key unit (the width of a 1u keycap pitch).
pub const DEFAULT_KEY_SPACING: f64 = 19.05;

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(ConfigError::UnknownValue {
                        field: $field,
                        value: other.to_string(),
                        expected: concat!($($text, " "),+),
                    }),
                }
            }
        }
    };
}

named_enum! {
    /// Switch family the plate is cut for.
    SwitchType, "switch type" {
        Mx => "mx",
        AlpsMx => "alpsmx",
        MxOpen => "mx-open",
        MxOpenRotatable => "mx-open-rotatable",
        Alps => "alps",
    }
}

named_enum! {
    /// Stabilizer family used for keys of 2u and longer.
    StabilizerType, "stabilizer type" {
        Cherry => "cherry",
        Costar => "costar",
        CherryCostar => "cherry-costar",
        Alps => "alps",
        Matias => "matias",
    }
}

named_enum! {
    CornerType, "corner type" {
        Round => "round",
        Bevel => "bevel",
    }
}

named_enum! {
    CaseType, "case type" {
        None => "none",
        Poker => "poker",
        Sandwich => "sandwich",
    }
}

named_enum! {
    /// Layers the orchestrator knows how to build.
    LayerName, "layer" {
        Simple => "simple",
        Bottom => "bottom",
        Middle => "middle",
        Top => "top",
        Switch => "switch",
        Reinforcing => "reinforcing",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDescriptor {
    pub case_type: CaseType,
    pub screw_count: u32,
    pub screw_radius: f64,
    /// Foot positions in mm from the top-left corner of the plate.
    #[serde(default)]
    pub feet: Vec<[f64; 2]>,
    pub foot_hole_diameter: f64,
    pub foot_hole_square: f64,
}

impl Default for CaseDescriptor {
    fn default() -> Self {
        Self {
            case_type: CaseType::None,
            screw_count: 0,
            screw_radius: 0.0,
            feet: Vec::new(),
            foot_hole_diameter: 3.0,
            foot_hole_square: 9.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsbDescriptor {
    pub inner_width: f64,
    pub outer_width: f64,
    pub height: f64,
    pub offset: f64,
}

impl Default for UsbDescriptor {
    fn default() -> Self {
        Self {
            inner_width: 10.0,
            outer_width: 15.0,
            height: 5.0,
            offset: 0.0,
        }
    }
}

/// A user-declared round hole, in mm from the top-left corner of the plate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserHole {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerOptions {
    #[serde(default)]
    pub include_usb_cutout: bool,
    /// Total growth of the outer boundary in mm (half on each side).
    #[serde(default)]
    pub oversize: f64,
    #[serde(default)]
    pub holes: Vec<UserHole>,
    /// Cut the inner key-region rectangle out of the layer.
    #[serde(default)]
    pub cavity: bool,
    #[serde(default = "default_thickness")]
    pub thickness: f64,
}

fn default_thickness() -> f64 {
    1.5
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            include_usb_cutout: false,
            oversize: 0.0,
            holes: Vec::new(),
            cavity: false,
            thickness: default_thickness(),
        }
    }
}

/// Fully resolved per-keyboard configuration.
///
/// `Default` is the single source of built-in defaults; callers overlay layout properties and
/// command-line flags on top of it before handing it to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardConfig {
    pub name: String,
    pub switch_type: SwitchType,
    pub stabilizer_type: StabilizerType,
    pub key_spacing: f64,
    pub padding: [f64; 2],
    pub pcb_padding: [f64; 2],
    pub corner_radius: f64,
    pub corner_type: CornerType,
    pub kerf: f64,
    /// Extra growth applied to each side of `mx` switch holes.
    pub switch_grow: [f64; 2],
    pub case: CaseDescriptor,
    pub usb: UsbDescriptor,
    pub layers: IndexMap<LayerName, LayerOptions>,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        let mut layers = IndexMap::new();
        layers.insert(LayerName::Switch, LayerOptions::default());
        Self {
            name: "keyboard".to_string(),
            switch_type: SwitchType::Mx,
            stabilizer_type: StabilizerType::Cherry,
            key_spacing: DEFAULT_KEY_SPACING,
            padding: [0.0, 0.0],
            pcb_padding: [0.0, 0.0],
            corner_radius: 0.0,
            corner_type: CornerType::Round,
            kerf: 0.0,
            switch_grow: [0.0, 0.0],
            case: CaseDescriptor::default(),
            usb: UsbDescriptor::default(),
            layers,
        }
    }
}

impl KeyboardConfig {
    /// Per-side margin between the key region and the plate edge.
    pub fn margin(&self) -> [f64; 2] {
        [
            self.padding[0] + self.pcb_padding[0] / 2.0,
            self.padding[1] + self.pcb_padding[1] / 2.0,
        ]
    }

    pub fn layer_options(&self, layer: LayerName) -> Option<&LayerOptions> {
        self.layers.get(&layer)
    }

    /// Check the invariants the engine relies on.
    ///
    /// Values normally arrive resolved from the loader/CLI; this catches the ones that did not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_shared()?;
        self.layers
            .keys()
            .try_for_each(|&layer| self.validate_layer(layer))
    }

    /// Keyboard-wide values every layer depends on.
    pub fn validate_shared(&self) -> Result<(), ConfigError> {
        if self.layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }
        positive("key_spacing", self.key_spacing)?;
        non_negative("padding.width", self.padding[0])?;
        non_negative("padding.height", self.padding[1])?;
        non_negative("pcb_padding.width", self.pcb_padding[0])?;
        non_negative("pcb_padding.height", self.pcb_padding[1])?;
        non_negative("corner_radius", self.corner_radius)?;
        finite("kerf", self.kerf)?;
        finite("switch_grow.x", self.switch_grow[0])?;
        finite("switch_grow.y", self.switch_grow[1])?;

        match self.case.case_type {
            CaseType::None => {}
            CaseType::Poker => positive("case.screw_radius", self.case.screw_radius)?,
            CaseType::Sandwich => {
                positive("case.screw_radius", self.case.screw_radius)?;
                if self.case.screw_count < 4 || self.case.screw_count % 2 != 0 {
                    return Err(ConfigError::invalid(
                        "case.screw_count",
                        format!(
                            "sandwich cases need an even screw count of at least 4 (got {})",
                            self.case.screw_count
                        ),
                    ));
                }
            }
        }
        if !self.case.feet.is_empty() {
            positive("case.foot_hole_diameter", self.case.foot_hole_diameter)?;
            positive("case.foot_hole_square", self.case.foot_hole_square)?;
        }
        for (i, foot) in self.case.feet.iter().enumerate() {
            finite(&format!("case.feet[{i}].x"), foot[0])?;
            finite(&format!("case.feet[{i}].y"), foot[1])?;
        }
        Ok(())
    }

    /// Options of one requested layer.
    pub fn validate_layer(&self, layer: LayerName) -> Result<(), ConfigError> {
        let Some(opts) = self.layers.get(&layer) else {
            return Err(ConfigError::invalid(
                format!("layers.{layer}"),
                "layer was not requested",
            ));
        };
        if opts.include_usb_cutout {
            positive("usb.inner_width", self.usb.inner_width)?;
            positive("usb.outer_width", self.usb.outer_width)?;
            positive("usb.height", self.usb.height)?;
            finite("usb.offset", self.usb.offset)?;
        }
        non_negative(&format!("layers.{layer}.oversize"), opts.oversize)?;
        positive(&format!("layers.{layer}.thickness"), opts.thickness)?;
        for (i, hole) in opts.holes.iter().enumerate() {
            finite(&format!("layers.{layer}.holes[{i}].x"), hole.x)?;
            finite(&format!("layers.{layer}.holes[{i}].y"), hole.y)?;
            positive(&format!("layers.{layer}.holes[{i}].radius"), hole.radius)?;
        }
        Ok(())
    }

    /// Keyboard-wide checks plus every key. Layer options are left to [`Self::validate_layer`].
    pub fn validate_with_keys(&self, keys: &[KeyRecord]) -> Result<(), ConfigError> {
        self.validate_shared()?;
        validate_keys(keys)
    }
}

fn finite(field: &str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite (got {v})")))
    }
}

fn non_negative(field: &str, v: f64) -> Result<(), ConfigError> {
    finite(field, v)?;
    if v < 0.0 {
        return Err(ConfigError::invalid(field, format!("must be >= 0 (got {v})")));
    }
    Ok(())
}

fn positive(field: &str, v: f64) -> Result<(), ConfigError> {
    finite(field, v)?;
    if v <= 0.0 {
        return Err(ConfigError::invalid(field, format!("must be > 0 (got {v})")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_strings() {
        for s in SwitchType::ALL {
            assert_eq!(s.as_str().parse::<SwitchType>().unwrap(), *s);
        }
        for s in StabilizerType::ALL {
            assert_eq!(s.as_str().parse::<StabilizerType>().unwrap(), *s);
        }
        for l in LayerName::ALL {
            assert_eq!(l.as_str().parse::<LayerName>().unwrap(), *l);
        }
    }

    #[test]
    fn unknown_switch_is_config_error() {
        let err = "cherry-mx".parse::<SwitchType>().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownValue {
                field: "switch type",
                ..
            }
        ));
    }

    #[test]
    fn serde_uses_kebab_names() {
        let v = serde_json::to_value(SwitchType::MxOpenRotatable).unwrap();
        assert_eq!(v, serde_json::json!("mx-open-rotatable"));
        let s: StabilizerType = serde_json::from_value(serde_json::json!("cherry-costar")).unwrap();
        assert_eq!(s, StabilizerType::CherryCostar);
    }

    #[test]
    fn default_config_validates() {
        KeyboardConfig::default().validate().unwrap();
    }

    #[test]
    fn sandwich_needs_even_screw_count() {
        let mut cfg = KeyboardConfig::default();
        cfg.case.case_type = CaseType::Sandwich;
        cfg.case.screw_radius = 1.5;
        cfg.case.screw_count = 5;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "case.screw_count"));

        cfg.case.screw_count = 6;
        cfg.validate().unwrap();
    }

    #[test]
    fn non_finite_kerf_is_rejected() {
        let cfg = KeyboardConfig {
            kerf: f64::NAN,
            ..KeyboardConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_layer_set_is_rejected() {
        let cfg = KeyboardConfig {
            layers: IndexMap::new(),
            ..KeyboardConfig::default()
        };
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::NoLayers);
    }

    #[test]
    fn layer_options_are_checked_per_layer() {
        let mut cfg = KeyboardConfig::default();
        cfg.layers.insert(
            LayerName::Bottom,
            LayerOptions {
                oversize: -1.0,
                ..LayerOptions::default()
            },
        );
        cfg.validate_shared().unwrap();
        cfg.validate_layer(LayerName::Switch).unwrap();
        assert!(cfg.validate_layer(LayerName::Bottom).is_err());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn margin_adds_half_pcb_padding() {
        let cfg = KeyboardConfig {
            padding: [2.0, 3.0],
            pcb_padding: [4.0, 1.0],
            ..KeyboardConfig::default()
        };
        assert_eq!(cfg.margin(), [4.0, 3.5]);
    }
}

//! Keyboard-wide properties carried by the layout's object rows.
//!
//! Everything is optional: values left unset fall through to command-line flags or defaults
//! when the caller resolves a [`kbplate_core::KeyboardConfig`].

use indexmap::IndexMap;
use kbplate_core::{CaseType, CornerType, LayerName, StabilizerType, SwitchType};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutProperties {
    pub name: Option<String>,
    pub switch: Option<SwitchType>,
    pub stabilizer: Option<StabilizerType>,
    pub kerf: Option<f64>,
    pub padding: Option<[f64; 2]>,
    pub pcb_padding: Option<[f64; 2]>,
    pub corner_radius: Option<f64>,
    pub corner_type: Option<CornerType>,
    pub key_spacing: Option<f64>,
    /// Total switch-hole growth along x (split over both sides).
    pub grow_x: Option<f64>,
    pub grow_y: Option<f64>,
    pub case: Option<CaseProperties>,
    pub usb: Option<UsbProperties>,
    pub layers: Option<IndexMap<LayerName, LayerProperties>>,
    pub feet: Option<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaseProperties {
    #[serde(rename = "type")]
    pub case_type: Option<CaseType>,
    pub screw_count: Option<u32>,
    /// Screw hole diameter.
    pub screw_size: Option<f64>,
    pub screw_radius: Option<f64>,
    pub foot_hole_diameter: Option<f64>,
    pub foot_hole_square: Option<f64>,
}

impl CaseProperties {
    /// `screw_radius` wins over `screw_size`.
    pub fn screw_radius(&self) -> Option<f64> {
        self.screw_radius.or(self.screw_size.map(|d| d / 2.0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UsbProperties {
    pub inner_width: Option<f64>,
    pub outer_width: Option<f64>,
    pub height: Option<f64>,
    pub offset: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayerProperties {
    pub include_usb_cutout: Option<bool>,
    pub oversize: Option<f64>,
    /// `[x, y, radius]` in mm from the plate's top-left corner.
    pub holes: Vec<[f64; 3]>,
    pub cavity: Option<bool>,
    pub thickness: Option<f64>,
}

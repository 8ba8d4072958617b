//! Keyboard layout model shared by every kbplate crate.
//!
//! A build run borrows a [`KeyboardConfig`] and an ordered slice of [`KeyRecord`]s; nothing in
//! here is mutated by the engine.

mod config;
mod error;
mod key;

pub use config::{
    CaseDescriptor, CaseType, CornerType, KeyboardConfig, LayerName, LayerOptions,
    StabilizerType, SwitchType, UsbDescriptor, UserHole, DEFAULT_KEY_SPACING,
};
pub use error::ConfigError;
pub use key::{KeyOverrides, KeyRecord, Rotation, SecondaryRect};

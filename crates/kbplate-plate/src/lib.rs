//! Plate geometry synthesis: keys and a resolved [`KeyboardConfig`] in, finished per-layer
//! outlines out.
//!
//! [`KeyboardConfig`]: kbplate_core::KeyboardConfig

pub mod assembler;
mod error;
pub mod finish;
pub mod layers;
pub mod placement;

pub use assembler::{Assembler, PlateFrame, RawPlate};
pub use error::BuildError;
pub use finish::{finish, FinishedPlate};
pub use layers::{build, BuildReport, Engine, Layer};
pub use placement::{KeyCutoutSet, Placer, PositionedFootprint};

//! 2D contour geometry for plate synthesis.
//!
//! Contours are closed `cavalier_contours` polylines (line and bulge-arc segments). Boolean and
//! offset operations go through a [`GeometryKernel`] so the plate code never talks to the
//! contour library directly.

pub mod bounds;
pub mod error;
pub mod kernel;
pub mod primitives;
pub mod region;
pub mod transform;

pub use bounds::Bounds;
pub use cavalier_contours::polyline::{
    BooleanResultInfo, PlineOrientation, PlineSource, PlineSourceMut, PlineVertex, Polyline,
};
pub use error::GeometryError;
pub use kernel::{CavcKernel, CornerStyle, GeometryKernel};
pub use region::Region;
pub use transform::Transform;

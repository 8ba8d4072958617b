use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("cutouts consume the whole plate boundary")]
    BoundaryConsumed,

    #[error("cutouts split the plate boundary into {pieces} pieces")]
    BoundarySplit { pieces: usize },

    #[error("merged cutouts enclose {count} island(s)")]
    Islands { count: usize },

    #[error("contour {index} intersects itself")]
    SelfIntersection { index: usize },

    #[error("offsetting the {what} by {distance} mm produced {pieces} contours")]
    OffsetFailed {
        what: &'static str,
        distance: f64,
        pieces: usize,
    },

    #[error("hole {index} is not inside the outer boundary")]
    HoleEscaped { index: usize },

    #[error("invalid contour: {0}")]
    InvalidContour(String),
}

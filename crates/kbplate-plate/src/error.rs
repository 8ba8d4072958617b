use kbplate_core::{ConfigError, LayerName};
use kbplate_footprint::FootprintError;
use kbplate_geometry::GeometryError;
use thiserror::Error;

/// Why a single layer could not be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("key #{index}: {source}")]
    Footprint {
        index: usize,
        #[source]
        source: FootprintError,
    },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("layer \"{layer}\" needs layer \"{requires}\" in the same build")]
    MissingLayerDependency {
        layer: LayerName,
        requires: LayerName,
    },
}

//! File encoders (DXF, SVG, JSON) for finished layers and the scoped writer behind them.

pub mod dxf;
pub mod dxf_geom;
pub mod json;
pub mod svg;
pub mod writer;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use kbplate_core::LayerName;
use kbplate_plate::Layer;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use writer::{write_atomic, WriteError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Dxf,
    Svg,
    Json,
}

impl ExportFormat {
    pub const ALL: &'static [ExportFormat] =
        &[ExportFormat::Dxf, ExportFormat::Svg, ExportFormat::Json];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Dxf => "dxf",
            ExportFormat::Svg => "svg",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown export format \"{0}\" (expected one of: dxf svg json)")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dxf" => Ok(ExportFormat::Dxf),
            "svg" => Ok(ExportFormat::Svg),
            "json" => Ok(ExportFormat::Json),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error(transparent)]
    Dxf(#[from] dxf::DxfError),
    #[error(transparent)]
    DxfGeom(#[from] dxf_geom::DxfGeomError),
    #[error(transparent)]
    Svg(#[from] svg::SvgError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A failure scoped to one (layer, format) pair.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{layer}.{format}: encoding failed: {source}")]
    Encode {
        layer: LayerName,
        format: ExportFormat,
        #[source]
        source: EncodeError,
    },
    #[error("{layer}.{format}: writing {path:?} failed: {source}")]
    Write {
        layer: LayerName,
        format: ExportFormat,
        path: PathBuf,
        #[source]
        source: WriteError,
    },
}

impl ExportError {
    pub fn layer(&self) -> LayerName {
        match self {
            ExportError::Encode { layer, .. } | ExportError::Write { layer, .. } => *layer,
        }
    }

    pub fn format(&self) -> ExportFormat {
        match self {
            ExportError::Encode { format, .. } | ExportError::Write { format, .. } => *format,
        }
    }
}

/// One file written for one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub layer: LayerName,
    pub format: ExportFormat,
    pub path: PathBuf,
    pub bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Tries per file before the pair is reported as failed.
    pub write_attempts: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { write_attempts: 2 }
    }
}

/// Encode a layer without touching the filesystem.
pub fn encode(layer: &Layer, format: ExportFormat) -> Result<Vec<u8>, EncodeError> {
    let text = match format {
        ExportFormat::Dxf => dxf_geom::dxf_from_contours(layer.plate.contours())?
            .to_dxf_string(layer.name.as_str())?,
        ExportFormat::Svg => svg::svg_from_plate(&layer.plate)?,
        ExportFormat::Json => json::json_from_layer(layer)?,
    };
    Ok(text.into_bytes())
}

/// Writes layers as `{layer}_{basename}.{ext}` files into one directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    basename: String,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>, basename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            basename: basename.into(),
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, layer: LayerName, format: ExportFormat) -> PathBuf {
        let name = format!("{layer}_{}.{}", self.basename, format.extension());
        self.dir.join(name)
    }

    /// One result per requested format, in request order.
    pub fn export(
        &self,
        layer: &Layer,
        formats: &[ExportFormat],
    ) -> Vec<Result<ExportArtifact, ExportError>> {
        formats
            .iter()
            .map(|&format| self.export_one(layer, format))
            .collect()
    }

    fn export_one(
        &self,
        layer: &Layer,
        format: ExportFormat,
    ) -> Result<ExportArtifact, ExportError> {
        let bytes = encode(layer, format).map_err(|source| ExportError::Encode {
            layer: layer.name,
            format,
            source,
        })?;
        let path = self.path_for(layer.name, format);
        write_atomic(&path, &bytes, self.options.write_attempts).map_err(|source| {
            ExportError::Write {
                layer: layer.name,
                format,
                path: path.clone(),
                source,
            }
        })?;
        info!(layer = %layer.name, %format, path = %path.display(), "exported");
        Ok(ExportArtifact {
            layer: layer.name,
            format,
            path,
            bytes: bytes.len(),
        })
    }
}

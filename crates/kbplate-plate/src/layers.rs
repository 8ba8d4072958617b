//! Per-layer cutout selection and the parallel build driver.

use indexmap::IndexMap;
use kbplate_core::{ConfigError, KeyRecord, KeyboardConfig, LayerName, LayerOptions};
use kbplate_geometry::{CavcKernel, GeometryKernel, Polyline};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::assembler::{key_cutouts, Assembler, PlateFrame};
use crate::error::BuildError;
use crate::finish::{finish, FinishedPlate};
use crate::placement::{KeyCutoutSet, Placer};

/// A finished layer.
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: LayerName,
    pub options: LayerOptions,
    pub plate: FinishedPlate,
}

impl Layer {
    pub fn width(&self) -> f64 {
        self.plate.width()
    }

    pub fn height(&self) -> f64 {
        self.plate.height()
    }
}

/// Outcome of one build run, in layer request order.
#[derive(Debug)]
pub struct BuildReport {
    pub layers: IndexMap<LayerName, Result<Layer, BuildError>>,
    /// Largest width/height over the layers that built.
    pub width: f64,
    pub height: f64,
    /// Extent of the key cutout region.
    pub inner_width: f64,
    pub inner_height: f64,
}

impl BuildReport {
    pub fn built(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (LayerName, &BuildError)> {
        self.layers
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (*name, e)))
    }

    pub fn is_complete(&self) -> bool {
        self.layers.values().all(Result::is_ok)
    }
}

/// Key contour set a layer cuts, if any.
pub fn key_cutout_set(layer: LayerName) -> Option<KeyCutoutSet> {
    match layer {
        LayerName::Switch => Some(KeyCutoutSet::Footprints),
        LayerName::Top | LayerName::Reinforcing => Some(KeyCutoutSet::KeycapOpenings),
        LayerName::Simple | LayerName::Bottom | LayerName::Middle => None,
    }
}

type SharedCutouts = Result<Vec<Polyline<f64>>, BuildError>;

/// Key contours computed once per build and shared by every layer that cuts them.
struct KeyCutouts {
    footprints: Option<SharedCutouts>,
    openings: Option<SharedCutouts>,
}

impl KeyCutouts {
    fn get(&self, layer: LayerName) -> Option<&SharedCutouts> {
        match key_cutout_set(layer)? {
            KeyCutoutSet::Footprints => self.footprints.as_ref(),
            KeyCutoutSet::KeycapOpenings => self.openings.as_ref(),
        }
    }
}

/// Builds every requested layer of a keyboard.
#[derive(Debug, Clone, Default)]
pub struct Engine<K = CavcKernel> {
    kernel: K,
}

impl<K: GeometryKernel + Sync> Engine<K> {
    pub fn new(kernel: K) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Build all layers of `config.layers`.
    ///
    /// # Errors
    ///
    /// Returns `Err` only for problems shared by every layer: keyboard-wide values rejected by
    /// [`KeyboardConfig::validate_shared`], an invalid key, or an empty key list. Anything that
    /// depends on a single layer (its options, a footprint, the geometry, or `reinforcing` without
    /// a successfully built `top`) is reported as that layer's entry in
    /// [`BuildReport::layers`], and its siblings still build.
    pub fn build(
        &self,
        config: &KeyboardConfig,
        keys: &[KeyRecord],
    ) -> Result<BuildReport, ConfigError> {
        config.validate_with_keys(keys)?;

        let placer = Placer::new(config);
        let outlines: Vec<Polyline<f64>> =
            keys.iter().flat_map(|k| placer.key_outline(k)).collect();
        let frame = PlateFrame::new(config, &outlines).ok_or(ConfigError::NoKeys)?;

        let wants = |set: KeyCutoutSet| {
            config
                .layers
                .keys()
                .any(|&l| key_cutout_set(l) == Some(set))
        };
        let shared = KeyCutouts {
            footprints: wants(KeyCutoutSet::Footprints)
                .then(|| self.cutouts(&placer, keys, config, KeyCutoutSet::Footprints)),
            openings: wants(KeyCutoutSet::KeycapOpenings)
                .then(|| self.cutouts(&placer, keys, config, KeyCutoutSet::KeycapOpenings)),
        };

        let independent: Vec<LayerName> = config
            .layers
            .keys()
            .copied()
            .filter(|&l| l != LayerName::Reinforcing)
            .collect();
        let mut results: IndexMap<LayerName, Result<Layer, BuildError>> = independent
            .par_iter()
            .map(|&layer| {
                let res = self.build_layer(config, frame, layer, shared.get(layer));
                (layer, res)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();

        if config.layers.contains_key(&LayerName::Reinforcing) {
            let res = if matches!(results.get(&LayerName::Top), Some(Ok(_))) {
                self.build_layer(
                    config,
                    frame,
                    LayerName::Reinforcing,
                    shared.get(LayerName::Reinforcing),
                )
            } else {
                Err(BuildError::MissingLayerDependency {
                    layer: LayerName::Reinforcing,
                    requires: LayerName::Top,
                })
            };
            results.insert(LayerName::Reinforcing, res);
        }

        // Request order.
        let layers: IndexMap<LayerName, Result<Layer, BuildError>> = config
            .layers
            .keys()
            .filter_map(|l| results.swap_remove(l).map(|r| (*l, r)))
            .collect();

        let (width, height) = layers
            .values()
            .filter_map(|r| r.as_ref().ok())
            .fold((0.0f64, 0.0f64), |(w, h), l| (w.max(l.width()), h.max(l.height())));

        for (name, err) in layers
            .iter()
            .filter_map(|(n, r)| r.as_ref().err().map(|e| (n, e)))
        {
            warn!(layer = %name, error = %err, "layer failed");
        }

        Ok(BuildReport {
            layers,
            width,
            height,
            inner_width: frame.inner.width(),
            inner_height: frame.inner.height(),
        })
    }

    fn cutouts(
        &self,
        placer: &Placer<'_>,
        keys: &[KeyRecord],
        config: &KeyboardConfig,
        set: KeyCutoutSet,
    ) -> SharedCutouts {
        let placed = keys
            .iter()
            .enumerate()
            .map(|(i, k)| {
                placer
                    .place(i, k, set)
                    .map_err(|source| BuildError::Footprint { index: i, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let contours = key_cutouts(&self.kernel, &placed, config.kerf)?;
        debug!(?set, keys = placed.len(), contours = contours.len(), "placed keys");
        Ok(contours)
    }

    fn build_layer(
        &self,
        config: &KeyboardConfig,
        frame: PlateFrame,
        layer: LayerName,
        key_cutouts: Option<&SharedCutouts>,
    ) -> Result<Layer, BuildError> {
        config.validate_layer(layer)?;
        let options = config
            .layer_options(layer)
            .cloned()
            .unwrap_or_default();

        let cutouts: &[Polyline<f64>] = match key_cutouts {
            Some(Ok(c)) => c,
            Some(Err(e)) => return Err(e.clone()),
            None => &[],
        };

        let assembler = Assembler::new(&self.kernel, config, frame);
        let raw = assembler.assemble(layer, &options, cutouts)?;
        let plate = finish(
            &self.kernel,
            raw,
            config.kerf,
            config.corner_radius,
            config.corner_type,
        )?;
        info!(
            layer = %layer,
            width = plate.width(),
            height = plate.height(),
            holes = plate.holes.len(),
            "built layer"
        );
        Ok(Layer {
            name: layer,
            options,
            plate,
        })
    }
}

/// Build with the default `cavalier_contours` kernel.
pub fn build(config: &KeyboardConfig, keys: &[KeyRecord]) -> Result<BuildReport, ConfigError> {
    Engine::<CavcKernel>::default().build(config, keys)
}

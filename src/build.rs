//! `kbplate build`: load a layout, resolve options, build layers and write files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use indexmap::IndexMap;
use kbplate_core::{
    CaseType, CornerType, KeyboardConfig, LayerName, LayerOptions, StabilizerType, SwitchType,
    UserHole,
};
use kbplate_export::{ExportFormat, Exporter};
use kbplate_layout::{parse_layout, LayerProperties, LayoutProperties};
use kbplate_plate::BuildReport;
use tracing::{debug, info};

use crate::error::CliError;

/// Formats that need a solid modeller; named here so the error says why.
const SOLID_FORMATS: &[&str] = &["stl", "step", "stp", "brep"];

/// Outline growth for `--oversize-layers` when neither the flag nor the layout sets one.
const DEFAULT_OVERSIZE: f64 = 4.0;

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// KLE raw data file (JSON or JSON5)
    #[arg(value_name = "LAYOUT")]
    pub layout: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    pub output: PathBuf,

    /// Base name for output files [default: layout name, then file stem]
    #[arg(long)]
    pub name: Option<String>,

    /// Output formats
    #[arg(long = "format", value_delimiter = ',', default_value = "dxf")]
    pub formats: Vec<String>,

    /// Layers to build [default: layout layers, then switch]
    #[arg(long, value_delimiter = ',')]
    pub layers: Vec<LayerName>,

    #[arg(long = "switch", value_name = "TYPE")]
    pub switch_type: Option<SwitchType>,

    #[arg(long = "stabilizer", value_name = "TYPE")]
    pub stabilizer_type: Option<StabilizerType>,

    /// Full kerf width in mm
    #[arg(long, value_name = "MM")]
    pub kerf: Option<f64>,

    #[arg(long, value_name = "W,H", value_parser = parse_pair)]
    pub padding: Option<[f64; 2]>,

    #[arg(long, value_name = "W,H", value_parser = parse_pair)]
    pub pcb_padding: Option<[f64; 2]>,

    #[arg(long, value_name = "MM")]
    pub corner_radius: Option<f64>,

    #[arg(long)]
    pub corner_type: Option<CornerType>,

    #[arg(long = "case")]
    pub case_type: Option<CaseType>,

    #[arg(long)]
    pub screw_count: Option<u32>,

    #[arg(long, value_name = "MM")]
    pub screw_radius: Option<f64>,

    /// Layers that get the USB cutout
    #[arg(long, value_delimiter = ',')]
    pub usb_layers: Vec<LayerName>,

    /// Layers grown by --oversize
    #[arg(long, value_delimiter = ',')]
    pub oversize_layers: Vec<LayerName>,

    /// Total outline growth in mm for --oversize-layers [default: layout value, then 4]
    #[arg(long, value_name = "MM")]
    pub oversize: Option<f64>,
}

fn parse_pair(s: &str) -> Result<[f64; 2], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[a, b] = parts.as_slice() else {
        return Err(format!("expected two comma-separated numbers, got {s:?}"));
    };
    let num = |v: &str| v.parse::<f64>().map_err(|e| format!("{v:?}: {e}"));
    Ok([num(a)?, num(b)?])
}

pub fn parse_formats(raw: &[String]) -> Result<Vec<ExportFormat>, CliError> {
    let mut out = Vec::with_capacity(raw.len());
    for f in raw {
        let lower = f.trim().to_ascii_lowercase();
        if SOLID_FORMATS.contains(&lower.as_str()) {
            return Err(CliError::usage(format!(
                "format \"{lower}\" needs 3D output, which kbplate does not produce"
            )));
        }
        let format: ExportFormat = lower.parse().map_err(|e| CliError::usage(format!("{e}")))?;
        if !out.contains(&format) {
            out.push(format);
        }
    }
    if out.is_empty() {
        return Err(CliError::usage("no output format requested"));
    }
    Ok(out)
}

fn layer_options(props: Option<&LayerProperties>) -> LayerOptions {
    let mut opts = LayerOptions::default();
    let Some(p) = props else {
        return opts;
    };
    if let Some(v) = p.include_usb_cutout {
        opts.include_usb_cutout = v;
    }
    if let Some(v) = p.oversize {
        opts.oversize = v;
    }
    if let Some(v) = p.cavity {
        opts.cavity = v;
    }
    if let Some(v) = p.thickness {
        opts.thickness = v;
    }
    opts.holes = p
        .holes
        .iter()
        .map(|&[x, y, radius]| UserHole { x, y, radius })
        .collect();
    opts
}

/// Flag, then layout property, then [`KeyboardConfig::default`].
pub fn resolve_config(
    args: &BuildArgs,
    props: &LayoutProperties,
    fallback_name: &str,
) -> KeyboardConfig {
    let d = KeyboardConfig::default();
    let case_props = props.case.clone().unwrap_or_default();
    let usb_props = props.usb.clone().unwrap_or_default();

    let mut cfg = KeyboardConfig {
        name: args
            .name
            .clone()
            .or_else(|| props.name.clone())
            .unwrap_or_else(|| fallback_name.to_string()),
        switch_type: args.switch_type.or(props.switch).unwrap_or(d.switch_type),
        stabilizer_type: args
            .stabilizer_type
            .or(props.stabilizer)
            .unwrap_or(d.stabilizer_type),
        key_spacing: props.key_spacing.unwrap_or(d.key_spacing),
        padding: args.padding.or(props.padding).unwrap_or(d.padding),
        pcb_padding: args.pcb_padding.or(props.pcb_padding).unwrap_or(d.pcb_padding),
        corner_radius: args
            .corner_radius
            .or(props.corner_radius)
            .unwrap_or(d.corner_radius),
        corner_type: args.corner_type.or(props.corner_type).unwrap_or(d.corner_type),
        kerf: args.kerf.or(props.kerf).unwrap_or(d.kerf),
        switch_grow: [
            props.grow_x.map_or(d.switch_grow[0], |g| g / 2.0),
            props.grow_y.map_or(d.switch_grow[1], |g| g / 2.0),
        ],
        ..d
    };

    cfg.case.case_type = args
        .case_type
        .or(case_props.case_type)
        .unwrap_or(cfg.case.case_type);
    cfg.case.screw_count = args
        .screw_count
        .or(case_props.screw_count)
        .unwrap_or(cfg.case.screw_count);
    cfg.case.screw_radius = args
        .screw_radius
        .or(case_props.screw_radius())
        .unwrap_or(cfg.case.screw_radius);
    if let Some(v) = case_props.foot_hole_diameter {
        cfg.case.foot_hole_diameter = v;
    }
    if let Some(v) = case_props.foot_hole_square {
        cfg.case.foot_hole_square = v;
    }
    if let Some(feet) = &props.feet {
        cfg.case.feet = feet.clone();
    }

    cfg.usb.inner_width = usb_props.inner_width.unwrap_or(cfg.usb.inner_width);
    cfg.usb.outer_width = usb_props.outer_width.unwrap_or(cfg.usb.outer_width);
    cfg.usb.height = usb_props.height.unwrap_or(cfg.usb.height);
    cfg.usb.offset = usb_props.offset.unwrap_or(cfg.usb.offset);

    let layer_props = props.layers.as_ref();
    let names: Vec<LayerName> = if !args.layers.is_empty() {
        args.layers.clone()
    } else if let Some(layers) = layer_props.filter(|l| !l.is_empty()) {
        layers.keys().copied().collect()
    } else {
        cfg.layers.keys().copied().collect()
    };
    let mut layers = IndexMap::new();
    for name in names {
        let props = layer_props.and_then(|l| l.get(&name));
        let mut opts = layer_options(props);
        if args.usb_layers.contains(&name) {
            opts.include_usb_cutout = true;
        }
        if args.oversize_layers.contains(&name) {
            opts.oversize = args
                .oversize
                .or(props.and_then(|p| p.oversize))
                .unwrap_or(DEFAULT_OVERSIZE);
        }
        layers.insert(name, opts);
    }
    cfg.layers = layers;
    cfg
}

fn load(path: &Path) -> anyhow::Result<kbplate_layout::Layout> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read layout file {}", path.display()))?;
    parse_layout(&text).with_context(|| format!("failed to parse layout {}", path.display()))
}

/// Build and export. Every layer and format is attempted; failures are reported together.
pub fn run(args: &BuildArgs) -> Result<(), CliError> {
    let formats = parse_formats(&args.formats)?;
    let layout = load(&args.layout)?;
    let stem = args
        .layout
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "keyboard".to_string());
    let config = resolve_config(args, &layout.properties, &stem);
    debug!(?config, "resolved configuration");

    let report = kbplate_plate::build(&config, &layout.keys)
        .map_err(|e| CliError::input(format!("invalid configuration: {e}")))?;

    std::fs::create_dir_all(&args.output).map_err(|e| {
        CliError::processing(format!(
            "failed to create output directory {}: {e}",
            args.output.display()
        ))
    })?;

    let exporter = Exporter::new(&args.output, config.name.as_str());
    let mut failures = report.failures().count();
    print_summary(&config, &report);
    for layer in report.built() {
        for result in exporter.export(layer, &formats) {
            match result {
                Ok(artifact) => println!("  wrote {}", artifact.path.display()),
                Err(e) => {
                    failures += 1;
                    eprintln!("  export failed: {e}");
                }
            }
        }
    }

    if failures > 0 {
        return Err(CliError::processing(format!(
            "{failures} layer or export failure(s)"
        )));
    }
    info!(layers = report.layers.len(), "done");
    Ok(())
}

fn print_summary(config: &KeyboardConfig, report: &BuildReport) {
    println!(
        "{}: {:.2} x {:.2} mm (cutout {:.2} x {:.2} mm)",
        config.name, report.width, report.height, report.inner_width, report.inner_height
    );
    for (name, result) in &report.layers {
        match result {
            Ok(layer) => println!(
                "  {name}: {:.2} x {:.2} mm, {} hole(s)",
                layer.width(),
                layer.height(),
                layer.plate.holes.len()
            ),
            Err(e) => println!("  {name}: failed: {e}"),
        }
    }
}

use approx::assert_abs_diff_eq;
use indexmap::IndexMap;
use kbplate_core::{KeyRecord, KeyboardConfig, LayerName, LayerOptions};
use kbplate_export::dxf::{Dxf, Entity};
use kbplate_export::{encode, ExportError, ExportFormat, ExportOptions, Exporter};
use kbplate_plate::{build, Layer};

fn switch_layer(corner_radius: f64) -> Layer {
    let mut layers = IndexMap::new();
    layers.insert(LayerName::Switch, LayerOptions::default());
    let cfg = KeyboardConfig {
        padding: [2.0, 2.0],
        corner_radius,
        layers,
        ..KeyboardConfig::default()
    };
    let keys = [KeyRecord::unit(0.0, 0.0), KeyRecord::unit(1.0, 0.0)];
    let mut report = build(&cfg, &keys).unwrap();
    report
        .layers
        .swap_remove(&LayerName::Switch)
        .unwrap()
        .unwrap()
}

#[test]
fn writes_every_format_in_request_order() {
    let dir = tempfile::tempdir().unwrap();
    let layer = switch_layer(0.0);
    let exporter = Exporter::new(dir.path(), "kb");
    let formats = [ExportFormat::Svg, ExportFormat::Dxf, ExportFormat::Json];
    let results = exporter.export(&layer, &formats);

    let artifacts: Vec<_> = results.into_iter().map(Result::unwrap).collect();
    let names: Vec<String> = artifacts
        .iter()
        .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["switch_kb.svg", "switch_kb.dxf", "switch_kb.json"]);
    for a in &artifacts {
        assert_eq!(std::fs::metadata(&a.path).unwrap().len() as usize, a.bytes);
    }
}

#[test]
fn dxf_output_is_lines_for_a_square_plate() {
    let layer = switch_layer(0.0);
    let text = String::from_utf8(encode(&layer, ExportFormat::Dxf).unwrap()).unwrap();
    let dxf = Dxf::parse_str(&text).unwrap();
    // Outer rectangle plus two square switch holes.
    assert_eq!(dxf.entities.len(), 12);
    assert!(dxf.entities.iter().all(|e| matches!(e, Entity::Line(_))));
}

#[test]
fn rounded_corners_become_arcs() {
    let layer = switch_layer(2.0);
    let text = String::from_utf8(encode(&layer, ExportFormat::Dxf).unwrap()).unwrap();
    let dxf = Dxf::parse_str(&text).unwrap();
    let arcs = dxf
        .entities
        .iter()
        .filter(|e| matches!(e, Entity::Arc(_)))
        .count();
    assert_eq!(arcs, 4);
}

#[test]
fn svg_uses_millimetre_size() {
    let layer = switch_layer(0.0);
    let svg = String::from_utf8(encode(&layer, ExportFormat::Svg).unwrap()).unwrap();
    let attr = |name: &str| -> f64 {
        let needle = format!("{name}=\"");
        let start = svg.find(&needle).unwrap() + needle.len();
        let rest = &svg[start..];
        rest[..rest.find("mm\"").unwrap()].parse().unwrap()
    };
    assert_abs_diff_eq!(attr("width"), 2.0 * 19.05 + 4.0, epsilon = 1e-9);
    assert_abs_diff_eq!(attr("height"), 19.05 + 4.0, epsilon = 1e-9);
}

#[test]
fn json_lists_outer_and_holes() {
    let layer = switch_layer(0.0);
    let bytes = encode(&layer, ExportFormat::Json).unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["layer"], "switch");
    assert_eq!(v["units"], "mm");
    assert_eq!(v["outer"]["vertices"].as_array().unwrap().len(), 4);
    assert_eq!(v["holes"].as_array().unwrap().len(), 2);
    assert_eq!(v["thickness"], 1.5);
}

#[test]
fn a_failing_format_does_not_affect_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let layer = switch_layer(0.0);
    let exporter =
        Exporter::new(dir.path(), "kb").with_options(ExportOptions { write_attempts: 1 });
    std::fs::create_dir(exporter.path_for(LayerName::Switch, ExportFormat::Svg)).unwrap();

    let formats = [ExportFormat::Dxf, ExportFormat::Svg, ExportFormat::Json];
    let results = exporter.export(&layer, &formats);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[2].is_ok());
    match &results[1] {
        Err(err @ ExportError::Write { source, .. }) => {
            assert_eq!(err.format(), ExportFormat::Svg);
            assert_eq!(err.layer(), LayerName::Switch);
            assert_eq!(source.attempts, 1);
        }
        other => panic!("expected a write error, got {other:?}"),
    }

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["switch_kb.dxf", "switch_kb.json", "switch_kb.svg"]);
}

#[test]
fn formats_parse_case_insensitively() {
    assert_eq!("DXF".parse::<ExportFormat>().unwrap(), ExportFormat::Dxf);
    assert!("stl".parse::<ExportFormat>().is_err());
}

use kbplate_geometry::{PlineSource, Polyline};
use kbplate_plate::Layer;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonLayer<'a> {
    layer: &'a str,
    units: &'static str,
    width: f64,
    height: f64,
    thickness: f64,
    outer: JsonContour,
    holes: Vec<JsonContour>,
}

/// `[x, y, bulge]` per vertex; the bulge describes the segment to the next vertex.
#[derive(Debug, Serialize)]
struct JsonContour {
    vertices: Vec<[f64; 3]>,
}

impl From<&Polyline<f64>> for JsonContour {
    fn from(pl: &Polyline<f64>) -> Self {
        Self {
            vertices: pl.iter_vertexes().map(|v| [v.x, v.y, v.bulge]).collect(),
        }
    }
}

pub fn json_from_layer(layer: &Layer) -> Result<String, serde_json::Error> {
    let doc = JsonLayer {
        layer: layer.name.as_str(),
        units: "mm",
        width: layer.width(),
        height: layer.height(),
        thickness: layer.options.thickness,
        outer: (&layer.plate.outer).into(),
        holes: layer.plate.holes.iter().map(JsonContour::from).collect(),
    };
    serde_json::to_string_pretty(&doc)
}

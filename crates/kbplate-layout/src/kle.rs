//! KLE raw data to key records.

use kbplate_core::{KeyOverrides, KeyRecord, Rotation, SecondaryRect};
use serde_json::{Map, Value};

use crate::error::LayoutError;

/// Cursor state while walking the rows. Rotation persists across keys and rows; size and
/// override fields only apply to the next key.
#[derive(Debug, Clone)]
struct State {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    x2: f64,
    y2: f64,
    w2: Option<f64>,
    h2: Option<f64>,
    r: f64,
    rx: f64,
    ry: f64,
    overrides: KeyOverrides,
}

impl Default for State {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 1.0,
            x2: 0.0,
            y2: 0.0,
            w2: None,
            h2: None,
            r: 0.0,
            rx: 0.0,
            ry: 0.0,
            overrides: KeyOverrides::default(),
        }
    }
}

impl State {
    fn emit(&mut self, label: &str) -> KeyRecord {
        let w2 = self.w2.unwrap_or(self.w);
        let h2 = self.h2.unwrap_or(self.h);
        let has_secondary = w2 != self.w || h2 != self.h || self.x2 != 0.0 || self.y2 != 0.0;
        let secondary = has_secondary.then(|| SecondaryRect {
            x: self.x2,
            y: self.y2,
            width: w2,
            height: h2,
        });

        let key = KeyRecord {
            x: norm_zero(self.x),
            y: norm_zero(self.y),
            width: self.w,
            height: self.h,
            secondary,
            rotation: Rotation {
                angle: self.r,
                origin_x: self.rx,
                origin_y: self.ry,
            },
            label: first_non_empty_label(label),
            overrides: std::mem::take(&mut self.overrides),
        };

        self.x += self.w;
        self.w = 1.0;
        self.h = 1.0;
        self.x2 = 0.0;
        self.y2 = 0.0;
        self.w2 = None;
        self.h2 = None;
        key
    }

    fn apply(
        &mut self,
        props: &Map<String, Value>,
        row: usize,
        item: usize,
    ) -> Result<(), LayoutError> {
        let num = |field: &str| -> Result<Option<f64>, LayoutError> {
            match props.get(field) {
                None | Some(Value::Null) => Ok(None),
                Some(v) => value_f64(v).map(Some).ok_or_else(|| LayoutError::InvalidValue {
                    row,
                    item,
                    field: field.to_string(),
                    reason: format!("must be a finite number (got {v})"),
                }),
            }
        };

        if let Some(r) = num("r")? {
            self.r = r;
        }
        let rx = num("rx")?;
        let ry = num("ry")?;
        if let Some(rx) = rx {
            self.rx = rx;
        }
        if let Some(ry) = ry {
            self.ry = ry;
        }
        if rx.is_some() || ry.is_some() {
            // A new rotation cluster restarts the cursor at its origin.
            self.x = self.rx;
            self.y = self.ry;
        }
        if let Some(dx) = num("x")? {
            self.x += dx;
        }
        if let Some(dy) = num("y")? {
            self.y += dy;
        }
        if let Some(w) = num("w")? {
            self.w = w;
        }
        if let Some(h) = num("h")? {
            self.h = h;
        }
        if let Some(x2) = num("x2")? {
            self.x2 = x2;
        }
        if let Some(y2) = num("y2")? {
            self.y2 = y2;
        }
        if let Some(w2) = num("w2")? {
            self.w2 = Some(w2);
        }
        if let Some(h2) = num("h2")? {
            self.h2 = Some(h2);
        }

        let text = |field: &str| -> Result<Option<&str>, LayoutError> {
            match props.get(field) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.as_str())),
                Some(v) => Err(LayoutError::InvalidValue {
                    row,
                    item,
                    field: field.to_string(),
                    reason: format!("must be a string (got {v})"),
                }),
            }
        };
        let invalid = |field: &str, e: kbplate_core::ConfigError| LayoutError::InvalidValue {
            row,
            item,
            field: field.to_string(),
            reason: e.to_string(),
        };
        if let Some(t) = text("_t")? {
            self.overrides.switch_type = Some(t.parse().map_err(|e| invalid("_t", e))?);
        }
        if let Some(s) = text("_s")? {
            self.overrides.stabilizer_type = Some(s.parse().map_err(|e| invalid("_s", e))?);
        }
        if let Some(k) = num("_k")? {
            self.overrides.kerf = Some(k);
        }
        if let Some(r) = num("_r")? {
            self.overrides.switch_rotation = r;
        }
        if let Some(rs) = num("_rs")? {
            self.overrides.stabilizer_rotation = rs;
        }
        if let Some(co) = num("_co")? {
            self.overrides.center_offset = Some(co);
        }
        Ok(())
    }

    fn next_row(&mut self) {
        self.y += 1.0;
        self.x = self.rx;
    }
}

fn value_f64(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn first_non_empty_label(label: &str) -> String {
    label
        .split('\n')
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn norm_zero(v: f64) -> f64 {
    if v.abs() < 1e-12 {
        0.0
    } else {
        v
    }
}

/// Walk KLE rows. Object rows are collected as keyboard properties, in order.
pub(crate) fn parse_rows(
    rows: &[Value],
) -> Result<(Vec<KeyRecord>, Map<String, Value>), LayoutError> {
    let mut state = State::default();
    let mut keys = Vec::new();
    let mut properties = Map::new();
    let mut first_row = true;

    for (row, value) in rows.iter().enumerate() {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(map) => {
                properties.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
                continue;
            }
            _ => return Err(LayoutError::InvalidRow { row }),
        };

        if !first_row {
            state.next_row();
        }
        first_row = false;

        for (item, entry) in items.iter().enumerate() {
            match entry {
                Value::Object(props) => state.apply(props, row, item)?,
                Value::String(label) => keys.push(state.emit(label)),
                Value::Null => {}
                _ => return Err(LayoutError::InvalidItem { row, item }),
            }
        }
    }

    Ok((keys, properties))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(v: Value) -> Vec<Value> {
        match v {
            Value::Array(a) => a,
            _ => unreachable!(),
        }
    }

    #[test]
    fn cursor_advances_by_width_and_rows() {
        let (keys, _) = parse_rows(&rows(json!([["Q", {"w": 1.5}, "W"], ["A"]]))).unwrap();
        let pos: Vec<(f64, f64, f64)> = keys.iter().map(|k| (k.x, k.y, k.width)).collect();
        assert_eq!(pos, vec![(0.0, 0.0, 1.0), (1.0, 0.0, 1.5), (0.0, 1.0, 1.0)]);
    }

    #[test]
    fn size_properties_apply_to_one_key() {
        let (keys, _) = parse_rows(&rows(json!([[{"w": 2, "h": 2}, "A", "B"]]))).unwrap();
        assert_eq!((keys[0].width, keys[0].height), (2.0, 2.0));
        assert_eq!((keys[1].x, keys[1].width, keys[1].height), (2.0, 1.0, 1.0));
    }

    #[test]
    fn labels_use_first_non_empty_line() {
        let (keys, _) = parse_rows(&rows(json!([["\n\nEnter"]]))).unwrap();
        assert_eq!(keys[0].label, "Enter");
    }

    #[test]
    fn overrides_attach_to_the_next_key_only() {
        let layout = json!([[{"_t": "alps", "_k": 0.2, "_rs": 180}, "A", "B"]]);
        let (keys, _) = parse_rows(&rows(layout)).unwrap();
        assert_eq!(keys[0].overrides.switch_type, Some(kbplate_core::SwitchType::Alps));
        assert_eq!(keys[0].overrides.kerf, Some(0.2));
        assert_eq!(keys[0].overrides.stabilizer_rotation, 180.0);
        assert_eq!(keys[1].overrides, KeyOverrides::default());
    }

    #[test]
    fn unknown_switch_override_is_rejected() {
        let err = parse_rows(&rows(json!([[{"_t": "topre"}, "A"]]))).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidValue { ref field, .. } if field == "_t"));
    }

    #[test]
    fn non_numeric_width_is_rejected() {
        let err = parse_rows(&rows(json!([[{"w": true}, "A"]]))).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidValue { row: 0, item: 0, .. }));
    }
}

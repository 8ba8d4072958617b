//! Minimal DXF model: the entities plate outlines need, a writer and a reader.

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DxfError {
    #[error("DXF parse error: expected an even number of lines (code/value pairs)")]
    OddNumberOfLines,
    #[error("DXF parse error: invalid group code {raw:?} at line {line}")]
    InvalidGroupCode { raw: String, line: usize },
    #[error("DXF parse error: missing ENTITIES section")]
    MissingEntitiesSection,
    #[error("DXF parse error: missing required group code {code} for entity {entity}")]
    MissingRequiredGroup { entity: &'static str, code: i32 },
    #[error("DXF parse error: invalid float {raw:?} for group code {code} in entity {entity}")]
    InvalidFloat {
        entity: &'static str,
        code: i32,
        raw: String,
    },
    #[error("DXF write error: non-finite value for {what}")]
    NonFinite { what: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dxf {
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    /// Anything the reader does not model; kept so callers can reject it.
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

/// Counter-clockwise arc from `start_angle_deg` to `end_angle_deg`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    pub start_angle_deg: f64,
    pub end_angle_deg: f64,
}

#[derive(Debug, Clone, Copy)]
struct Group<'a> {
    code: i32,
    value: &'a str,
}

impl Dxf {
    /// Serialize as an R12-style document with millimetre units, every entity on layer `layer`.
    pub fn to_dxf_string(&self, layer: &str) -> Result<String, DxfError> {
        let mut out = String::new();
        push_pair(&mut out, 0, "SECTION");
        push_pair(&mut out, 2, "HEADER");
        push_pair(&mut out, 9, "$INSUNITS");
        push_pair(&mut out, 70, "4"); // millimeters
        push_pair(&mut out, 0, "ENDSEC");
        push_pair(&mut out, 0, "SECTION");
        push_pair(&mut out, 2, "TABLES");
        push_pair(&mut out, 0, "TABLE");
        push_pair(&mut out, 2, "LTYPE");
        push_pair(&mut out, 0, "LTYPE");
        push_pair(&mut out, 72, "65");
        push_pair(&mut out, 70, "64");
        push_pair(&mut out, 2, "CONTINUOUS");
        push_pair(&mut out, 3, "______");
        push_pair(&mut out, 73, "0");
        push_pair(&mut out, 40, "0");
        push_pair(&mut out, 0, "ENDTAB");
        push_pair(&mut out, 0, "TABLE");
        push_pair(&mut out, 2, "LAYER");
        push_pair(&mut out, 0, "LAYER");
        push_pair(&mut out, 2, layer);
        push_pair(&mut out, 70, "0");
        push_pair(&mut out, 62, "7");
        push_pair(&mut out, 6, "CONTINUOUS");
        push_pair(&mut out, 0, "ENDTAB");
        push_pair(&mut out, 0, "ENDSEC");
        push_pair(&mut out, 0, "SECTION");
        push_pair(&mut out, 2, "ENTITIES");

        for e in &self.entities {
            match e {
                Entity::Line(l) => {
                    push_pair(&mut out, 0, "LINE");
                    push_pair(&mut out, 8, layer);
                    push_pair_f64(&mut out, 10, l.start.x, "line x1")?;
                    push_pair_f64(&mut out, 20, l.start.y, "line y1")?;
                    push_pair_f64(&mut out, 11, l.end.x, "line x2")?;
                    push_pair_f64(&mut out, 21, l.end.y, "line y2")?;
                }
                Entity::Circle(c) => {
                    push_pair(&mut out, 0, "CIRCLE");
                    push_pair(&mut out, 8, layer);
                    push_pair_f64(&mut out, 10, c.center.x, "circle cx")?;
                    push_pair_f64(&mut out, 20, c.center.y, "circle cy")?;
                    push_pair_f64(&mut out, 40, c.radius, "circle r")?;
                }
                Entity::Arc(a) => {
                    push_pair(&mut out, 0, "ARC");
                    push_pair(&mut out, 8, layer);
                    push_pair_f64(&mut out, 10, a.center.x, "arc cx")?;
                    push_pair_f64(&mut out, 20, a.center.y, "arc cy")?;
                    push_pair_f64(&mut out, 40, a.radius, "arc r")?;
                    push_pair_f64(&mut out, 50, a.start_angle_deg, "arc start")?;
                    push_pair_f64(&mut out, 51, a.end_angle_deg, "arc end")?;
                }
                Entity::Unsupported(_) => {}
            }
        }

        push_pair(&mut out, 0, "ENDSEC");
        push_pair(&mut out, 0, "EOF");
        Ok(out)
    }

    pub fn parse_str(input: &str) -> Result<Self, DxfError> {
        let groups = parse_groups(input)?;
        let entities = parse_entities(&groups)?;
        Ok(Self { entities })
    }
}

fn push_pair(out: &mut String, code: i32, value: &str) {
    let _ = writeln!(out, "{code}");
    out.push_str(value);
    out.push('\n');
}

fn push_pair_f64(out: &mut String, code: i32, value: f64, what: &'static str) -> Result<(), DxfError> {
    if !value.is_finite() {
        return Err(DxfError::NonFinite { what });
    }
    let mut buf = ryu::Buffer::new();
    push_pair(out, code, buf.format(value));
    Ok(())
}

fn parse_groups(input: &str) -> Result<Vec<Group<'_>>, DxfError> {
    let lines: Vec<&str> = input.lines().collect();
    if lines.len() % 2 != 0 {
        return Err(DxfError::OddNumberOfLines);
    }

    lines
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            let raw = pair[0].trim();
            let code = raw.parse().map_err(|_| DxfError::InvalidGroupCode {
                raw: raw.to_string(),
                line: i * 2 + 1,
            })?;
            Ok(Group {
                code,
                value: pair[1].trim_end(),
            })
        })
        .collect()
}

fn parse_entities(groups: &[Group<'_>]) -> Result<Vec<Entity>, DxfError> {
    let mut i = 0usize;
    let mut in_entities = false;
    let mut saw_entities = false;
    let mut entities = Vec::new();

    while i < groups.len() {
        let g = groups[i];
        if g.code == 0 && g.value == "SECTION" {
            if let Some(name) = groups.get(i + 1) {
                if name.code == 2 && name.value == "ENTITIES" {
                    in_entities = true;
                    saw_entities = true;
                }
            }
            i += 2;
            continue;
        }

        if in_entities && g.code == 0 {
            if g.value == "ENDSEC" {
                in_entities = false;
                i += 1;
                continue;
            }
            let kind = g.value;
            i += 1;
            let start = i;
            while i < groups.len() && groups[i].code != 0 {
                i += 1;
            }
            entities.push(parse_entity(kind, &groups[start..i])?);
            continue;
        }

        i += 1;
    }

    if saw_entities {
        Ok(entities)
    } else {
        Err(DxfError::MissingEntitiesSection)
    }
}

fn parse_entity(kind: &str, groups: &[Group<'_>]) -> Result<Entity, DxfError> {
    Ok(match kind {
        "LINE" => {
            let e = "LINE";
            Entity::Line(Line {
                start: Point2 {
                    x: get_f64(e, groups, 10)?,
                    y: get_f64(e, groups, 20)?,
                },
                end: Point2 {
                    x: get_f64(e, groups, 11)?,
                    y: get_f64(e, groups, 21)?,
                },
            })
        }
        "CIRCLE" => {
            let e = "CIRCLE";
            Entity::Circle(Circle {
                center: Point2 {
                    x: get_f64(e, groups, 10)?,
                    y: get_f64(e, groups, 20)?,
                },
                radius: get_f64(e, groups, 40)?,
            })
        }
        "ARC" => {
            let e = "ARC";
            Entity::Arc(Arc {
                center: Point2 {
                    x: get_f64(e, groups, 10)?,
                    y: get_f64(e, groups, 20)?,
                },
                radius: get_f64(e, groups, 40)?,
                start_angle_deg: get_f64(e, groups, 50)?,
                end_angle_deg: get_f64(e, groups, 51)?,
            })
        }
        other => Entity::Unsupported(other.to_string()),
    })
}

fn get_f64(entity: &'static str, groups: &[Group<'_>], code: i32) -> Result<f64, DxfError> {
    let Some(g) = groups.iter().find(|g| g.code == code) else {
        return Err(DxfError::MissingRequiredGroup { entity, code });
    };
    g.value
        .trim()
        .parse::<f64>()
        .map_err(|_| DxfError::InvalidFloat {
            entity,
            code,
            raw: g.value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_entities_parse_back() {
        let dxf = Dxf {
            entities: vec![
                Entity::Line(Line {
                    start: Point2 { x: 0.0, y: 0.0 },
                    end: Point2 { x: 19.05, y: 0.0 },
                }),
                Entity::Circle(Circle {
                    center: Point2 { x: 5.0, y: -6.5 },
                    radius: 1.25,
                }),
                Entity::Arc(Arc {
                    center: Point2 { x: 1.0, y: 1.0 },
                    radius: 1.0,
                    start_angle_deg: 180.0,
                    end_angle_deg: 270.0,
                }),
            ],
        };
        let text = dxf.to_dxf_string("switch").unwrap();
        assert!(text.contains("$INSUNITS\n70\n4\n"));
        assert_eq!(Dxf::parse_str(&text).unwrap(), dxf);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let dxf = Dxf {
            entities: vec![Entity::Circle(Circle {
                center: Point2 { x: f64::NAN, y: 0.0 },
                radius: 1.0,
            })],
        };
        assert_eq!(
            dxf.to_dxf_string("0").unwrap_err(),
            DxfError::NonFinite { what: "circle cx" }
        );
    }

    #[test]
    fn unknown_entities_are_kept_as_unsupported() {
        let text = "0\nSECTION\n2\nENTITIES\n0\nSPLINE\n8\n0\n0\nENDSEC\n0\nEOF\n";
        let dxf = Dxf::parse_str(text).unwrap();
        assert_eq!(dxf.entities, vec![Entity::Unsupported("SPLINE".into())]);
    }

    #[test]
    fn missing_entities_section_is_an_error() {
        let text = "0\nSECTION\n2\nHEADER\n0\nENDSEC\n0\nEOF\n";
        assert_eq!(
            Dxf::parse_str(text).unwrap_err(),
            DxfError::MissingEntitiesSection
        );
    }
}

use approx::assert_abs_diff_eq;
use kbplate_core::{CaseType, LayerName, StabilizerType, SwitchType};
use kbplate_layout::{parse_layout, LayoutError};

const NUMPAD: &str = r#"
{
  name: "numpad",
  switch: "mx-open",
  stabilizer: "costar",
  padding: [7.45, 8.4],
  pcb_padding: [5, 4],
  corner_radius: 4,
  kerf: 0.1,
  grow_x: 0.2,
  case: {type: "sandwich", screw_count: 8, screw_size: 3},
  usb: {inner_width: 10, outer_width: 15, height: 6},
  layers: {
    switch: {},
    top: {oversize: 2, include_usb_cutout: true, holes: [[5, 5, 1]]},
  },
  author: "someone",
},
["Num", "/", "*", "-"],
["7", "8", "9", {h: 2}, "+"],
["4", "5", "6"],
["1", "2", "3", {h: 2}, "Enter"],
[{w: 2}, "0", "."]
"#;

#[test]
fn numpad_keys_and_properties() {
    let layout = parse_layout(NUMPAD).unwrap();
    assert_eq!(layout.keys.len(), 17);

    let plus = &layout.keys[7];
    assert_eq!(plus.label, "+");
    assert_eq!((plus.x, plus.y, plus.height), (3.0, 1.0, 2.0));
    assert_eq!(plus.width, 1.0);

    let zero = &layout.keys[15];
    assert_eq!((zero.x, zero.y, zero.width), (0.0, 4.0, 2.0));
    assert_eq!(layout.keys[16].x, 2.0);

    let p = &layout.properties;
    assert_eq!(p.name.as_deref(), Some("numpad"));
    assert_eq!(p.switch, Some(SwitchType::MxOpen));
    assert_eq!(p.stabilizer, Some(StabilizerType::Costar));
    assert_eq!(p.padding, Some([7.45, 8.4]));
    assert_eq!(p.grow_x, Some(0.2));
    let case = p.case.as_ref().unwrap();
    assert_eq!(case.case_type, Some(CaseType::Sandwich));
    assert_eq!(case.screw_count, Some(8));
    assert_eq!(case.screw_radius(), Some(1.5));
    assert_eq!(p.usb.as_ref().unwrap().height, Some(6.0));

    let layers = p.layers.as_ref().unwrap();
    let names: Vec<LayerName> = layers.keys().copied().collect();
    assert_eq!(names, vec![LayerName::Switch, LayerName::Top]);
    let top = &layers[&LayerName::Top];
    assert_eq!(top.oversize, Some(2.0));
    assert_eq!(top.include_usb_cutout, Some(true));
    assert_eq!(top.holes, vec![[5.0, 5.0, 1.0]]);
}

#[test]
fn brackets_are_optional() {
    let bare = parse_layout(r#"["A", "B"], ["C"]"#).unwrap();
    let wrapped = parse_layout(r#"[["A", "B"], ["C"]]"#).unwrap();
    assert_eq!(bare, wrapped);
    assert_eq!(bare.keys.len(), 3);

    let single_row = parse_layout(r#"["A", "B"]"#).unwrap();
    assert_eq!(single_row.keys.len(), 2);
    assert_eq!(single_row.keys[1].x, 1.0);
}

#[test]
fn rotation_cluster_resets_the_cursor() {
    let layout = parse_layout(
        r#"["Esc"],
        [{r: 15, rx: 1, ry: 2}, "A", "B"],
        [{x: 0.5}, "C"]"#,
    )
    .unwrap();
    let a = &layout.keys[1];
    let b = &layout.keys[2];
    let c = &layout.keys[3];
    assert_eq!((a.x, a.y), (1.0, 2.0));
    assert_eq!((b.x, b.y), (2.0, 2.0));
    assert_eq!((c.x, c.y), (1.5, 3.0));
    for k in [a, b, c] {
        assert_eq!(k.rotation.angle, 15.0);
        assert_eq!((k.rotation.origin_x, k.rotation.origin_y), (1.0, 2.0));
    }
    assert_eq!(layout.keys[0].rotation.angle, 0.0);
}

#[test]
fn iso_enter_has_a_secondary_rectangle() {
    let layout =
        parse_layout(r#"[{x: 0.25, w: 1.25, h: 2, w2: 1.5, h2: 1, x2: -0.25}, "Enter", "X"]"#)
            .unwrap();
    let enter = &layout.keys[0];
    assert_abs_diff_eq!(enter.x, 0.25);
    let s = enter.secondary.unwrap();
    assert_eq!((s.x, s.y, s.width, s.height), (-0.25, 0.0, 1.5, 1.0));
    assert!(layout.keys[1].secondary.is_none());
    assert_abs_diff_eq!(layout.keys[1].x, 1.5);
}

#[test]
fn per_key_overrides() {
    let layout = parse_layout(
        r#"[{w: 6.25, _s: "cherry-costar", _co: 0, _r: 90, _k: 0.15}, "Space", "Alt"]"#,
    )
    .unwrap();
    let o = &layout.keys[0].overrides;
    assert_eq!(o.stabilizer_type, Some(StabilizerType::CherryCostar));
    assert_eq!(o.center_offset, Some(0.0));
    assert_eq!(o.switch_rotation, 90.0);
    assert_eq!(o.kerf, Some(0.15));
    assert_eq!(layout.keys[1].overrides.kerf, None);
}

#[test]
fn malformed_input_is_a_layout_error() {
    assert!(matches!(parse_layout("[\"A\""), Err(LayoutError::Syntax(_))));
    assert_eq!(parse_layout("[]").unwrap_err(), LayoutError::NoKeys);
    assert!(matches!(
        parse_layout(r#"["A"], 5"#),
        Err(LayoutError::InvalidRow { row: 1 })
    ));
    assert!(matches!(
        parse_layout(r#"["A", [1]]"#),
        Err(LayoutError::InvalidItem { row: 0, item: 1 })
    ));
}

#[test]
fn unknown_property_values_are_rejected() {
    let err = parse_layout(r#"{switch: "topre"}, ["A"]"#).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidProperties(_)));
}

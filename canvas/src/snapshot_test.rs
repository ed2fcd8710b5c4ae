use super::*;
use crate::doc::{ElementPayload, ImagePayload, PartialElement, ShapePayload, Shadow, Stroke, TextPayload, ViewMode};
use crate::geom::Geometry;

fn populated() -> Scene {
    let mut scene = Scene::new();
    scene.settings.active_view = ViewMode::ThreeD;
    scene.settings.rotation_3d = 42.0;
    let text = TextPayload {
        content: "Hello".into(),
        shadow: Some(Shadow { color: "#000".into(), offset_x: 2.0, offset_y: 2.0, blur: 4.0 }),
        stroke: Some(Stroke { color: "#fff".into(), width: 1.5 }),
        ..TextPayload::default()
    };
    let t = scene.add_element(ElementPayload::Text(text), None).unwrap();
    scene.add_element(ElementPayload::Image(ImagePayload { src: "data:image/png;base64,AA==".into() }), None).unwrap();
    let s = scene.add_element(ElementPayload::Shape(ShapePayload::default()), Some(Geometry::new(5.0, 6.0, 70.0, 80.0))).unwrap();
    scene.update_element(&s, &PartialElement { locked: Some(true), rotation: Some(-30.0), ..Default::default() }).unwrap();
    scene.select(Some(t)).unwrap();
    scene
}

#[test]
fn round_trip_yields_equal_element_set() {
    let scene = populated();
    let product = ProductConfig { unit_price: 24.5, ..ProductConfig::default() };
    let json = DesignSnapshot::capture(&scene, &product).to_json().unwrap();

    let (restored, restored_product) = DesignSnapshot::from_json(&json).unwrap().into_scene().unwrap();
    assert_eq!(restored.elements(), scene.elements());
    assert_eq!(restored.settings, scene.settings);
    assert_eq!(restored_product, product);
    assert_eq!(restored.selected_id(), None);
}

#[test]
fn uses_host_field_names() {
    let json = serde_json::to_value(DesignSnapshot::capture(&Scene::new(), &ProductConfig::default())).unwrap();
    for key in ["elements", "canvasSettings", "productConfigRef", "timestamp"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert!(json["timestamp"].as_i64().unwrap() > 0);
}

#[test]
fn duplicate_ids_are_rejected_on_restore() {
    let scene = populated();
    let mut snapshot = DesignSnapshot::capture(&scene, &ProductConfig::default());
    snapshot.elements.push(snapshot.elements[0].clone());
    let err = snapshot.into_scene().unwrap_err();
    assert_eq!(err.error_code(), "E_DUPLICATE_ID");
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = DesignSnapshot::from_json("{\"elements\": 3}").unwrap_err();
    assert!(matches!(err, SnapshotError::Json(_)));
}

#[test]
fn now_ms_is_after_2020() {
    assert!(now_ms() > 1_577_836_800_000);
}

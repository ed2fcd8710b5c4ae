#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use uuid::Uuid;

use super::*;

fn text() -> ElementPayload {
    ElementPayload::Text(TextPayload::default())
}

fn shape() -> ElementPayload {
    ElementPayload::Shape(ShapePayload::default())
}

fn scene_with(n: usize) -> (Scene, Vec<ElementId>) {
    let mut scene = Scene::new();
    let ids = (0..n).map(|_| scene.add_element(shape(), None).unwrap()).collect();
    (scene, ids)
}

fn layer(scene: &Scene, id: &ElementId) -> i64 {
    scene.get(id).unwrap().layer
}

// =============================================================
// Payload serde
// =============================================================

#[test]
fn kind_serde_lowercase() {
    assert_eq!(serde_json::to_string(&ElementKind::Image).unwrap(), "\"image\"");
    let back: ElementKind = serde_json::from_str("\"shape\"").unwrap();
    assert_eq!(back, ElementKind::Shape);
}

#[test]
fn payload_is_tagged_by_type() {
    let json = serde_json::to_value(shape()).unwrap();
    assert_eq!(json["type"], "shape");
    assert_eq!(json["shape"], "rectangle");
    assert!(json.get("stroke").is_none());
}

#[test]
fn payload_rejects_unknown_type() {
    let result = serde_json::from_str::<ElementPayload>(r#"{"type":"video","src":"x"}"#);
    assert!(result.is_err());
}

#[test]
fn view_mode_serde_matches_host_names() {
    assert_eq!(serde_json::to_string(&ViewMode::ThreeD).unwrap(), "\"threeD\"");
    assert_eq!(serde_json::to_string(&ViewMode::Back).unwrap(), "\"back\"");
}

#[test]
fn settings_default_canvas_size_when_missing() {
    let json = r#"{"showGrid":true,"snapToGrid":false,"zoom":1.0,"activeView":"front","rotation3D":0.0}"#;
    let settings: CanvasSettings = serde_json::from_str(json).unwrap();
    assert_eq!(settings.canvas_width, 600.0);
    assert_eq!(settings.canvas_height, 700.0);
    assert!(settings.show_grid);
}

#[test]
fn text_payload_serde_camel_case() {
    let json = serde_json::to_value(TextPayload::default()).unwrap();
    assert_eq!(json["fontFamily"], "Arial");
    assert_eq!(json["fontWeight"], 400);
    assert!(json.get("shadow").is_none());
}

#[test]
fn element_serde_roundtrip() {
    let mut element = DesignElement::new(text(), Geometry::new(1.0, 2.0, 3.0, 4.0));
    element.locked = true;
    element.opacity = 0.5;
    let json = serde_json::to_string(&element).unwrap();
    let back: DesignElement = serde_json::from_str(&json).unwrap();
    assert_eq!(back, element);
}

#[test]
fn partial_skip_serializing_none_fields() {
    let p = PartialElement { x: Some(10.0), ..Default::default() };
    let serialized = serde_json::to_string(&p).unwrap();
    assert_eq!(serialized, r#"{"x":10.0}"#);
}

// =============================================================
// add_element
// =============================================================

#[test]
fn add_uses_default_geometry() {
    let mut scene = Scene::new();
    let id = scene.add_element(text(), None).unwrap();
    let element = scene.get(&id).unwrap();
    assert_eq!(element.geometry, Geometry::new(100.0, 100.0, 200.0, 50.0));
    assert_eq!(element.kind(), ElementKind::Text);
    assert_eq!(element.opacity, 1.0);
    assert!(!element.locked);
}

#[test]
fn add_places_on_top_layer() {
    let (scene, ids) = scene_with(3);
    assert_eq!(layer(&scene, &ids[0]), 0);
    assert_eq!(layer(&scene, &ids[1]), 1);
    assert_eq!(layer(&scene, &ids[2]), 2);
}

#[test]
fn add_rejects_zero_size() {
    let mut scene = Scene::new();
    let err = scene.add_element(shape(), Some(Geometry::new(0.0, 0.0, 0.0, 10.0))).unwrap_err();
    assert!(matches!(err, SceneError::InvalidSize { .. }));
    assert!(scene.is_empty());
}

#[test]
fn insert_rejects_duplicate_id() {
    let mut scene = Scene::new();
    let element = DesignElement::new(shape(), Geometry::new(0.0, 0.0, 10.0, 10.0));
    scene.insert(element.clone()).unwrap();
    assert_eq!(scene.insert(element.clone()), Err(SceneError::DuplicateId(element.id)));
    assert_eq!(scene.len(), 1);
}

// =============================================================
// update_element
// =============================================================

#[test]
fn update_applies_only_present_fields() {
    let (mut scene, ids) = scene_with(1);
    scene
        .update_element(&ids[0], &PartialElement { x: Some(42.0), opacity: Some(0.25), ..Default::default() })
        .unwrap();
    let element = scene.get(&ids[0]).unwrap();
    assert_eq!(element.geometry.x, 42.0);
    assert_eq!(element.geometry.y, 100.0);
    assert_eq!(element.opacity, 0.25);
}

#[test]
fn update_clamps_opacity() {
    let (mut scene, ids) = scene_with(1);
    scene.update_element(&ids[0], &PartialElement { opacity: Some(3.0), ..Default::default() }).unwrap();
    assert_eq!(scene.get(&ids[0]).unwrap().opacity, 1.0);
}

#[test]
fn update_negative_size_is_rejected_and_nothing_changes() {
    let (mut scene, ids) = scene_with(1);
    let before = scene.get(&ids[0]).unwrap().clone();
    let partial = PartialElement { x: Some(5.0), width: Some(-1.0), ..Default::default() };
    assert!(matches!(scene.update_element(&ids[0], &partial), Err(SceneError::InvalidSize { .. })));
    assert_eq!(scene.get(&ids[0]).unwrap(), &before);
}

#[test]
fn update_payload_of_other_kind_is_rejected() {
    let (mut scene, ids) = scene_with(1);
    let partial = PartialElement { payload: Some(text()), ..Default::default() };
    assert_eq!(
        scene.update_element(&ids[0], &partial),
        Err(SceneError::KindMismatch { expected: ElementKind::Shape, got: ElementKind::Text })
    );
}

#[test]
fn update_missing_element_is_not_found() {
    let mut scene = Scene::new();
    let id = Uuid::new_v4();
    assert_eq!(scene.update_element(&id, &PartialElement::default()), Err(SceneError::NotFound(id)));
}

// =============================================================
// delete_element
// =============================================================

#[test]
fn delete_is_hard_and_clears_selection() {
    let (mut scene, ids) = scene_with(2);
    scene.select(Some(ids[0])).unwrap();
    let removed = scene.delete_element(&ids[0]).unwrap();
    assert_eq!(removed.id, ids[0]);
    assert!(!scene.contains(&ids[0]));
    assert_eq!(scene.selected_id(), None);
    assert_eq!(scene.len(), 1);
}

#[test]
fn delete_keeps_unrelated_selection() {
    let (mut scene, ids) = scene_with(2);
    scene.select(Some(ids[1])).unwrap();
    scene.delete_element(&ids[0]).unwrap();
    assert_eq!(scene.selected_id(), Some(ids[1]));
}

// =============================================================
// duplicate_element
// =============================================================

#[test]
fn duplicate_offsets_and_goes_on_top() {
    let (mut scene, ids) = scene_with(3);
    let source = scene.get(&ids[1]).unwrap().clone();
    let copy_id = scene.duplicate_element(&ids[1]).unwrap();
    let copy = scene.get(&copy_id).unwrap();

    assert_ne!(copy_id, source.id);
    assert_eq!(copy.geometry.x, source.geometry.x + 20.0);
    assert_eq!(copy.geometry.y, source.geometry.y + 20.0);
    for id in &ids {
        assert!(copy.layer > layer(&scene, id));
    }
    assert_eq!(copy.payload, source.payload);
}

#[test]
fn duplicate_missing_is_not_found() {
    let mut scene = Scene::new();
    assert!(matches!(scene.duplicate_element(&Uuid::new_v4()), Err(SceneError::NotFound(_))));
}

// =============================================================
// reorder
// =============================================================

#[test]
fn to_front_sets_max_plus_one() {
    let (mut scene, ids) = scene_with(3);
    scene.reorder(&ids[0], Reorder::ToFront).unwrap();
    assert_eq!(layer(&scene, &ids[0]), 3);
}

#[test]
fn to_back_compacts_others_in_order() {
    let (mut scene, ids) = scene_with(3);
    scene.reorder(&ids[2], Reorder::ToBack).unwrap();
    assert_eq!(layer(&scene, &ids[2]), 0);
    assert_eq!(layer(&scene, &ids[0]), 1);
    assert_eq!(layer(&scene, &ids[1]), 2);
}

#[test]
fn to_back_then_to_front_is_unique_max_and_keeps_others() {
    let (mut scene, ids) = scene_with(3);
    scene.reorder(&ids[1], Reorder::ToBack).unwrap();
    scene.reorder(&ids[1], Reorder::ToFront).unwrap();

    let top = layer(&scene, &ids[1]);
    assert!(top > layer(&scene, &ids[0]));
    assert!(top > layer(&scene, &ids[2]));
    assert!(layer(&scene, &ids[0]) < layer(&scene, &ids[2]));
}

#[test]
fn sorted_elements_follow_layer_then_insertion() {
    let (mut scene, ids) = scene_with(3);
    scene.update_element(&ids[0], &PartialElement { layer: Some(2), ..Default::default() }).unwrap();
    let order: Vec<ElementId> = scene.sorted_elements().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![ids[1], ids[0], ids[2]]);
}

// =============================================================
// select
// =============================================================

#[test]
fn select_unknown_is_rejected() {
    let (mut scene, ids) = scene_with(1);
    scene.select(Some(ids[0])).unwrap();
    assert!(scene.select(Some(Uuid::new_v4())).is_err());
    assert_eq!(scene.selected_id(), Some(ids[0]));
    scene.select(None).unwrap();
    assert!(scene.selected().is_none());
}

// =============================================================
// from_parts
// =============================================================

#[test]
fn from_parts_validates_ids() {
    let element = DesignElement::new(shape(), Geometry::new(0.0, 0.0, 10.0, 10.0));
    let result = Scene::from_parts(vec![element.clone(), element], CanvasSettings::default());
    assert!(matches!(result, Err(SceneError::DuplicateId(_))));
}

fn restored_at_layer_max() -> (Scene, ElementId, ElementId) {
    let mut low = DesignElement::new(shape(), Geometry::new(0.0, 0.0, 10.0, 10.0));
    low.layer = 5;
    let mut top = DesignElement::new(text(), Geometry::new(0.0, 0.0, 10.0, 10.0));
    top.layer = i64::MAX;
    let (low_id, top_id) = (low.id, top.id);
    let scene = Scene::from_parts(vec![top, low], CanvasSettings::default()).unwrap();
    (scene, low_id, top_id)
}

#[test]
fn add_above_max_layer_compacts_instead_of_overflowing() {
    let (mut scene, low, top) = restored_at_layer_max();
    let added = scene.add_element(shape(), None).unwrap();

    assert_eq!(layer(&scene, &low), 0);
    assert_eq!(layer(&scene, &top), 1);
    assert_eq!(layer(&scene, &added), 2);
}

#[test]
fn to_front_and_duplicate_at_max_layer_stay_on_top() {
    let (mut scene, low, top) = restored_at_layer_max();
    scene.reorder(&low, Reorder::ToFront).unwrap();
    assert!(layer(&scene, &low) > layer(&scene, &top));

    let (mut scene, low, _) = restored_at_layer_max();
    let copy = scene.duplicate_element(&low).unwrap();
    let order: Vec<ElementId> = scene.sorted_elements().iter().map(|e| e.id).collect();
    assert_eq!(order.last(), Some(&copy));
}


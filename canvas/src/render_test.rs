#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{ImagePayload, PartialElement, ShapePayload, TextPayload};

fn approx(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

fn shape() -> ElementPayload {
    ElementPayload::Shape(ShapePayload::default())
}

// =============================================================
// Affine
// =============================================================

#[test]
fn then_applies_in_order() {
    let t = Affine::translate(10.0, 0.0).then(Affine::scale(2.0, 2.0));
    assert!(approx(t.apply(Point::new(1.0, 1.0)), Point::new(22.0, 2.0)));
}

#[test]
fn rotate_quarter_turn_is_clockwise_on_screen() {
    let p = Affine::rotate_deg(90.0).apply(Point::new(1.0, 0.0));
    assert!(approx(p, Point::new(0.0, 1.0)));
}

#[test]
fn element_transform_matches_kernel_local_space() {
    let mut g = Geometry::new(40.0, 60.0, 100.0, 50.0);
    g.rotation = 30.0;
    let t = element_transform(&g);
    for local in [Point::new(0.0, 0.0), Point::new(100.0, 50.0), Point::new(25.0, 10.0)] {
        assert!(approx(t.apply(local), crate::geom::to_canvas(&g, local)));
    }
}

#[test]
fn degenerate_scale_is_not_invertible() {
    assert!(!Affine::scale(0.0, 1.0).is_invertible());
    assert!(Affine::IDENTITY.is_invertible());
}

// =============================================================
// View transforms
// =============================================================

#[test]
fn front_view_is_identity() {
    assert_eq!(view_transform(&CanvasSettings::default()), Affine::IDENTITY);
}

#[test]
fn back_view_mirrors_about_center() {
    let settings = CanvasSettings { active_view: ViewMode::Back, ..CanvasSettings::default() };
    let t = view_transform(&settings);
    assert!(approx(t.apply(Point::new(0.0, 10.0)), Point::new(600.0, 10.0)));
    assert!(approx(t.apply(Point::new(300.0, 10.0)), Point::new(300.0, 10.0)));
}

#[test]
fn three_d_view_keeps_center_and_foreshortens() {
    let settings = CanvasSettings { active_view: ViewMode::ThreeD, rotation_3d: 60.0, ..CanvasSettings::default() };
    let t = view_transform(&settings);
    assert!(approx(t.apply(Point::new(300.0, 350.0)), Point::new(300.0, 350.0)));
    let edge = t.apply(Point::new(600.0, 350.0));
    assert!((edge.x - 450.0).abs() < 1e-9);
    let top = t.apply(Point::new(300.0, 0.0));
    assert!(top.y > 0.0);
}

// =============================================================
// compose
// =============================================================

#[test]
fn items_follow_layer_order_and_include_locked() {
    let mut scene = Scene::new();
    let a = scene.add_element(shape(), None).unwrap();
    let b = scene.add_element(ElementPayload::Image(ImagePayload { src: "data:,".into() }), None).unwrap();
    scene.update_element(&b, &PartialElement { locked: Some(true), ..Default::default() }).unwrap();
    scene.update_element(&a, &PartialElement { layer: Some(5), ..Default::default() }).unwrap();

    let composite = compose(&scene, &ProductConfig::default(), ChromeMode::Export);
    let order: Vec<ElementId> = composite.items.iter().map(|i| i.id).collect();
    assert_eq!(order, vec![b, a]);
}

#[test]
fn export_mode_has_no_chrome_even_with_selection_and_grid() {
    let mut scene = Scene::new();
    scene.settings.show_grid = true;
    let id = scene.add_element(shape(), None).unwrap();
    scene.select(Some(id)).unwrap();

    let composite = compose(&scene, &ProductConfig::default(), ChromeMode::Export);
    assert!(!composite.has_chrome());
}

#[test]
fn editor_mode_draws_grid_outline_handles_and_size() {
    let mut scene = Scene::new();
    scene.settings.show_grid = true;
    let id = scene.add_element(ElementPayload::Text(TextPayload::default()), None).unwrap();
    scene.select(Some(id)).unwrap();

    let composite = compose(&scene, &ProductConfig::default(), ChromeMode::Editor);
    let handles = composite.decorations.iter().filter(|d| matches!(d, Decoration::Handle { .. })).count();
    assert_eq!(handles, 8);
    assert!(composite.decorations.contains(&Decoration::Grid { spacing: 10.0 }));
    assert!(composite.decorations.iter().any(|d| matches!(d, Decoration::SizeLabel { text, .. } if text == "200 × 50")));
}

#[test]
fn editor_mode_locked_selection_has_no_handles() {
    let mut scene = Scene::new();
    let id = scene.add_element(shape(), None).unwrap();
    scene.update_element(&id, &PartialElement { locked: Some(true), ..Default::default() }).unwrap();
    scene.select(Some(id)).unwrap();

    let composite = compose(&scene, &ProductConfig::default(), ChromeMode::Editor);
    assert!(!composite.decorations.iter().any(|d| matches!(d, Decoration::Handle { .. })));
    assert!(composite.decorations.iter().any(|d| matches!(d, Decoration::SelectionOutline { locked: true, .. })));
}

#[test]
fn handle_size_is_zoom_independent_on_screen() {
    let mut scene = Scene::new();
    scene.settings.zoom = 2.0;
    let id = scene.add_element(shape(), None).unwrap();
    scene.select(Some(id)).unwrap();
    let composite = compose(&scene, &ProductConfig::default(), ChromeMode::Editor);
    let size = composite.decorations.iter().find_map(|d| match d {
        Decoration::Handle { size, .. } => Some(*size),
        _ => None,
    });
    assert_eq!(size, Some(4.0));
}

#[test]
fn surface_uses_product_color() {
    let product = ProductConfig { color: "#FF0000".into(), ..ProductConfig::default() };
    let composite = compose(&Scene::new(), &product, ChromeMode::Export);
    assert_eq!(composite.surface, Rgba::new(255, 0, 0, 255));
}

#[test]
fn compose_does_not_touch_scene() {
    let mut scene = Scene::new();
    let id = scene.add_element(shape(), None).unwrap();
    scene.select(Some(id)).unwrap();
    let before = scene.clone();
    let _composite = compose(&scene, &ProductConfig::default(), ChromeMode::Editor);
    assert_eq!(scene, before);
}

// =============================================================
// Pixel size
// =============================================================

#[test]
fn pixel_size_applies_scale() {
    let composite = compose(&Scene::new(), &ProductConfig::default(), ChromeMode::Export);
    assert_eq!(composite.pixel_size(3.0).unwrap(), (1800, 2100));
}

#[test]
fn pixel_size_rejects_zero_and_nan() {
    let composite = compose(&Scene::new(), &ProductConfig::default(), ChromeMode::Export);
    assert!(composite.pixel_size(0.0).is_err());
    assert!(composite.pixel_size(f32::NAN).is_err());
}

#[test]
fn bitmap_pixel_bounds() {
    let bitmap = Bitmap { width: 1, height: 1, rgba: vec![1, 2, 3, 4] };
    assert_eq!(bitmap.pixel(0, 0), Some([1, 2, 3, 4]));
    assert_eq!(bitmap.pixel(1, 0), None);
}

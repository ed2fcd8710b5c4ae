#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{ElementPayload, TextPayload};

fn product(price: f64) -> ProductConfig {
    ProductConfig { unit_price: price, ..ProductConfig::default() }
}

#[test]
fn empty_design_has_no_fee() {
    let signal = pricing(&Scene::new(), &product(20.0), 2, 10.0);
    assert_eq!(signal.element_count, 0);
    assert_eq!(signal.customization_fee, 0.0);
    assert_eq!(signal.total_price, 40.0);
}

#[test]
fn any_element_adds_flat_fee_once() {
    let mut scene = Scene::new();
    for _ in 0..3 {
        scene.add_element(ElementPayload::Text(TextPayload::default()), None).unwrap();
    }
    let signal = pricing(&scene, &product(20.0), 2, 10.0);
    assert_eq!(signal.element_count, 3);
    assert_eq!(signal.customization_fee, 10.0);
    assert_eq!(signal.total_price, 50.0);
}

#[test]
fn product_serde_uses_host_field_names() {
    let json = serde_json::to_value(product(19.5)).unwrap();
    assert_eq!(json["type"], "tshirt");
    assert_eq!(json["unitPrice"], 19.5);
}

#[test]
fn pricing_serializes_camel_case() {
    let json = serde_json::to_value(pricing(&Scene::new(), &product(1.0), 1, 10.0)).unwrap();
    assert!(json.get("elementCount").is_some());
    assert!(json.get("customizationFee").is_some());
    assert!(json.get("totalPrice").is_some());
}

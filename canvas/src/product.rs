//! Base product configuration and the pricing signal derived from a scene.
//!
//! The product is chosen outside the studio and is read-only here. Pricing is
//! a pure projection consumed by the cart: a flat customization fee once the
//! design has any element, plus base price times quantity.

#[cfg(test)]
#[path = "product_test.rs"]
mod product_test;

use serde::{Deserialize, Serialize};

use crate::doc::Scene;

/// The blank product the design is printed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConfig {
    /// Product type tag, e.g. `"tshirt"` or `"hoodie"`.
    #[serde(rename = "type")]
    pub product_type: String,
    /// Base color as a CSS color string.
    pub color: String,
    pub size: String,
    pub unit_price: f64,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self { product_type: "tshirt".into(), color: "#FFFFFF".into(), size: "M".into(), unit_price: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSignal {
    pub element_count: usize,
    pub customization_fee: f64,
    pub total_price: f64,
}

/// Price a design for `quantity` units.
#[must_use]
pub fn pricing(scene: &Scene, product: &ProductConfig, quantity: u32, flat_fee: f64) -> PricingSignal {
    let element_count = scene.len();
    let customization_fee = if element_count > 0 { flat_fee } else { 0.0 };
    PricingSignal {
        element_count,
        customization_fee,
        total_price: product.unit_price.mul_add(f64::from(quantity), customization_fee),
    }
}

//! CSS color parsing for element fills, strokes, shadows and the product base.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use std::str::FromStr;

use color::{DynamicColor, Srgb};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {input:?}: {reason}")]
pub struct ColorError {
    pub input: String,
    pub reason: String,
}

/// Straight (non-premultiplied) 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Multiply alpha by `opacity` (clamped to `[0, 1]`).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn with_opacity(self, opacity: f64) -> Self {
        let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
        Self { a: (f64::from(self.a) * opacity).round() as u8, ..self }
    }
}

/// Parse any CSS color string (`#rgb`, `#rrggbb`, `rgb()`, named colors, ...).
///
/// # Errors
///
/// Returns [`ColorError`] when the string is not a CSS color.
pub fn parse(input: &str) -> Result<Rgba, ColorError> {
    let parsed = DynamicColor::from_str(input.trim())
        .map_err(|e| ColorError { input: input.to_owned(), reason: e.to_string() })?;
    let rgba = parsed.to_alpha_color::<Srgb>().to_rgba8();
    Ok(Rgba::new(rgba.r, rgba.g, rgba.b, rgba.a))
}

/// Parse a color, falling back on invalid input.
///
/// Stored designs can carry colors the current parser rejects; painting with a
/// fallback keeps the rest of the composite intact.
#[must_use]
pub fn parse_or(input: &str, fallback: Rgba) -> Rgba {
    match parse(input) {
        Ok(rgba) => rgba,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable color; using fallback");
            fallback
        }
    }
}

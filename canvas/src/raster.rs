//! tiny-skia implementation of [`OffscreenRenderer`].
//!
//! Paints a [`Composite`] into an RGBA pixmap: the product surface, each
//! element (shapes, embedded images, text outlines) under its own transform
//! and opacity, then any editor decorations. Everything is drawn through the
//! composite's view transform followed by the supersampling scale.
//!
//! Per-element failures (an undecodable image, no usable font) skip that
//! element and log a warning; only surface allocation fails the render.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use rusttype::{OutlineBuilder, Scale, point as rt_point};
use tiny_skia::{
    FillRule, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, StrokeDash, Transform,
};

use crate::color::{self, Rgba};
use crate::doc::{ElementPayload, ImagePayload, ShapePayload, ShapeType, TextPayload};
use crate::fonts;
use crate::render::{Affine, Bitmap, Composite, Decoration, OffscreenRenderer, PaintItem, RenderError};
use crate::upload;

const CHROME_COLOR: Rgba = Rgba::new(0x3B, 0x82, 0xF6, 255);
const LOCKED_CHROME_COLOR: Rgba = Rgba::new(0x9C, 0xA3, 0xAF, 255);
const GRID_COLOR: Rgba = Rgba::new(0, 0, 0, 26);
const LABEL_FONT_SIZE: f64 = 12.0;
const LINE_HEIGHT: f64 = 1.2;

/// CPU rasterizer backed by tiny-skia.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkiaRenderer;

impl SkiaRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OffscreenRenderer for SkiaRenderer {
    fn render_to_offscreen_surface(&self, composite: &Composite, scale: f32) -> Result<Bitmap, RenderError> {
        let (width, height) = composite.pixel_size(scale)?;
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidSurface {
            width: composite.width,
            height: composite.height,
            scale,
        })?;

        // Edge-on mockup: nothing is visible.
        if !composite.view.is_invertible() {
            return Ok(to_bitmap(&pixmap));
        }

        let base = composite.view.then(Affine::scale(f64::from(scale), f64::from(scale)));
        paint_surface(&mut pixmap, composite, base);
        for item in &composite.items {
            paint_item(&mut pixmap, item, base);
        }
        for decoration in &composite.decorations {
            paint_decoration(&mut pixmap, decoration, composite, base, scale);
        }

        tracing::debug!(width, height, items = composite.items.len(), "composite rasterized");
        Ok(to_bitmap(&pixmap))
    }
}

// =============================================================
// Helpers
// =============================================================

#[allow(clippy::cast_possible_truncation)]
fn to_skia(t: Affine) -> Transform {
    Transform::from_row(t.a as f32, t.b as f32, t.c as f32, t.d as f32, t.e as f32, t.f as f32)
}

fn paint_for(c: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;
    paint
}

#[allow(clippy::cast_possible_truncation)]
fn rect(x: f64, y: f64, w: f64, h: f64) -> Option<Rect> {
    Rect::from_xywh(x as f32, y as f32, w as f32, h as f32)
}

#[allow(clippy::cast_possible_truncation)]
fn stroke(width: f64) -> Stroke {
    Stroke { width: width as f32, ..Stroke::default() }
}

fn to_bitmap(pixmap: &Pixmap) -> Bitmap {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Bitmap { width: pixmap.width(), height: pixmap.height(), rgba }
}

fn paint_surface(pixmap: &mut Pixmap, composite: &Composite, base: Affine) {
    if let Some(r) = rect(0.0, 0.0, composite.width, composite.height) {
        pixmap.fill_rect(r, &paint_for(composite.surface), to_skia(base), None);
    }
}

// =============================================================
// Elements
// =============================================================

fn paint_item(pixmap: &mut Pixmap, item: &PaintItem, base: Affine) {
    let transform = item.transform.then(base);
    match &item.payload {
        ElementPayload::Shape(shape) => paint_shape(pixmap, item, shape, transform),
        ElementPayload::Image(image) => paint_image(pixmap, item, image, transform),
        ElementPayload::Text(text) => paint_text(pixmap, item, text, transform),
    }
}

fn shape_path(shape: ShapeType, w: f64, h: f64) -> Option<tiny_skia::Path> {
    match shape {
        ShapeType::Rectangle => Some(PathBuilder::from_rect(rect(0.0, 0.0, w, h)?)),
        ShapeType::Circle => PathBuilder::from_oval(rect(0.0, 0.0, w, h)?),
        ShapeType::Triangle => {
            let mut pb = PathBuilder::new();
            #[allow(clippy::cast_possible_truncation)]
            let (w, h) = (w as f32, h as f32);
            pb.move_to(w / 2.0, 0.0);
            pb.line_to(w, h);
            pb.line_to(0.0, h);
            pb.close();
            pb.finish()
        }
    }
}

fn paint_shape(pixmap: &mut Pixmap, item: &PaintItem, shape: &ShapePayload, transform: Affine) {
    let Some(path) = shape_path(shape.shape, item.width, item.height) else {
        return;
    };
    let ts = to_skia(transform);
    let fill = color::parse_or(&shape.fill, Rgba::BLACK).with_opacity(item.opacity);
    pixmap.fill_path(&path, &paint_for(fill), FillRule::Winding, ts, None);

    if let Some(s) = shape.stroke.as_ref().filter(|s| s.width > 0.0) {
        let c = color::parse_or(&s.color, Rgba::BLACK).with_opacity(item.opacity);
        pixmap.stroke_path(&path, &paint_for(c), &stroke(s.width), ts, None);
    }
}

fn paint_image(pixmap: &mut Pixmap, item: &PaintItem, image: &ImagePayload, transform: Affine) {
    let Some(source) = decode_image(&image.src) else {
        return;
    };
    let sx = item.width / f64::from(source.width());
    let sy = item.height / f64::from(source.height());
    let ts = to_skia(Affine::scale(sx, sy).then(transform));

    #[allow(clippy::cast_possible_truncation)]
    let paint = PixmapPaint {
        opacity: item.opacity as f32,
        quality: tiny_skia::FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, ts, None);
}

/// Decode an embedded image into a premultiplied pixmap.
fn decode_image(src: &str) -> Option<Pixmap> {
    let bytes = match upload::decode_data_uri(src) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "image element skipped");
            return None;
        }
    };
    let decoded = match image::load_from_memory(&bytes) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            tracing::warn!(error = %e, "image element skipped: decode failed");
            return None;
        }
    };

    let (w, h) = decoded.dimensions();
    let size = IntSize::from_wh(w, h)?;
    let mut data = decoded.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for channel in &mut px[..3] {
            *channel = u8::try_from((u16::from(*channel) * a + 127) / 255).unwrap_or(u8::MAX);
        }
    }
    Pixmap::from_vec(data, size)
}

// =============================================================
// Text
// =============================================================

struct GlyphSink<'a>(&'a mut PathBuilder);

impl OutlineBuilder for GlyphSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

/// Glyph outlines for `content`, each line centered horizontally and the
/// block centered vertically in a `width × height` box.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn text_path(content: &str, family: &str, weight: u16, size: f64, width: f64, height: f64) -> Option<tiny_skia::Path> {
    let font = fonts::font_for(family, weight)?;
    let scale = Scale::uniform(size as f32);
    let v = font.v_metrics(scale);
    let line_height = size * LINE_HEIGHT;
    let lines: Vec<&str> = content.lines().collect();
    let block = line_height * lines.len().saturating_sub(1) as f64 + f64::from(v.ascent - v.descent);
    let top = (height - block) / 2.0;

    let mut pb = PathBuilder::new();
    for (i, line) in lines.iter().enumerate() {
        let baseline = top + f64::from(v.ascent) + line_height * i as f64;
        let line_width = font
            .layout(line, scale, rt_point(0.0, 0.0))
            .last()
            .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width);
        let start = rt_point(((width - f64::from(line_width)) / 2.0) as f32, baseline as f32);
        for glyph in font.layout(line, scale, start) {
            glyph.build_outline(&mut GlyphSink(&mut pb));
        }
    }
    pb.finish()
}

fn paint_text(pixmap: &mut Pixmap, item: &PaintItem, text: &TextPayload, transform: Affine) {
    let Some(path) =
        text_path(&text.content, &text.font_family, text.font_weight, text.font_size, item.width, item.height)
    else {
        return;
    };

    if let Some(shadow) = &text.shadow {
        let c = color::parse_or(&shadow.color, Rgba::BLACK).with_opacity(item.opacity);
        let offset = Affine::translate(shadow.offset_x, shadow.offset_y).then(transform);
        pixmap.fill_path(&path, &paint_for(c), FillRule::Winding, to_skia(offset), None);
    }

    let ts = to_skia(transform);
    if let Some(s) = text.stroke.as_ref().filter(|s| s.width > 0.0) {
        let c = color::parse_or(&s.color, Rgba::BLACK).with_opacity(item.opacity);
        pixmap.stroke_path(&path, &paint_for(c), &stroke(s.width), ts, None);
    }
    let fill = color::parse_or(&text.fill, Rgba::BLACK).with_opacity(item.opacity);
    pixmap.fill_path(&path, &paint_for(fill), FillRule::Winding, ts, None);
}

// =============================================================
// Decorations
// =============================================================

fn paint_decoration(pixmap: &mut Pixmap, decoration: &Decoration, composite: &Composite, base: Affine, scale: f32) {
    // One device pixel, in canvas units.
    let hairline = 1.0 / f64::from(scale);
    let ts = to_skia(base);
    match decoration {
        Decoration::Grid { spacing } => {
            if *spacing <= 0.0 {
                return;
            }
            let mut pb = PathBuilder::new();
            #[allow(clippy::cast_possible_truncation)]
            let (w, h) = (composite.width as f32, composite.height as f32);
            let mut x = *spacing;
            while x < composite.width {
                #[allow(clippy::cast_possible_truncation)]
                let xf = x as f32;
                pb.move_to(xf, 0.0);
                pb.line_to(xf, h);
                x += spacing;
            }
            let mut y = *spacing;
            while y < composite.height {
                #[allow(clippy::cast_possible_truncation)]
                let yf = y as f32;
                pb.move_to(0.0, yf);
                pb.line_to(w, yf);
                y += spacing;
            }
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint_for(GRID_COLOR), &stroke(hairline), ts, None);
            }
        }
        Decoration::SelectionOutline { transform, width, height, locked } => {
            let Some(r) = rect(0.0, 0.0, *width, *height) else {
                return;
            };
            let path = PathBuilder::from_rect(r);
            let mut outline = stroke(hairline * 2.0);
            let color = if *locked {
                #[allow(clippy::cast_possible_truncation)]
                let dash = (hairline * 4.0) as f32;
                outline.dash = StrokeDash::new(vec![dash, dash], 0.0);
                LOCKED_CHROME_COLOR
            } else {
                CHROME_COLOR
            };
            pixmap.stroke_path(&path, &paint_for(color), &outline, to_skia(transform.then(base)), None);
        }
        Decoration::Handle { center, size } => {
            let Some(r) = rect(center.x - size / 2.0, center.y - size / 2.0, *size, *size) else {
                return;
            };
            let path = PathBuilder::from_rect(r);
            pixmap.fill_path(&path, &paint_for(Rgba::WHITE), FillRule::Winding, ts, None);
            pixmap.stroke_path(&path, &paint_for(CHROME_COLOR), &stroke(hairline), ts, None);
        }
        Decoration::SizeLabel { anchor, text } => {
            let box_w = LABEL_FONT_SIZE * 8.0;
            let box_h = LABEL_FONT_SIZE * LINE_HEIGHT;
            let Some(path) = text_path(text, "", 400, LABEL_FONT_SIZE, box_w, box_h) else {
                return;
            };
            let at = Affine::translate(anchor.x - box_w / 2.0, anchor.y).then(base);
            pixmap.fill_path(&path, &paint_for(CHROME_COLOR), FillRule::Winding, to_skia(at), None);
        }
    }
}

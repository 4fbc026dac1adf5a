//! Anchored watermark and text composition.
//!
//! Image overlays are placed by their top-left corner. Text is drawn from its
//! baseline, so its vertical position is the bottom edge of the glyph box.

use image::imageops::{self, FilterType};

use crate::density::{DensityConverter, DisplayDensity};
use crate::error::{PressError, Result};
use crate::raster::{PixelFormat, RasterImage};
use crate::text::{BitmapFont, GlyphRasterizer, TextBounds, TextStyle};

/// Named reference position on the base raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    /// Left edge, two thirds of the way down. Padding is ignored.
    CenterBottom,
}

impl Anchor {
    pub const ALL: [Anchor; 6] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::Center,
        Anchor::CenterBottom,
    ];

    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "topleft" => Ok(Anchor::TopLeft),
            "topright" => Ok(Anchor::TopRight),
            "bottomleft" => Ok(Anchor::BottomLeft),
            "bottomright" => Ok(Anchor::BottomRight),
            "center" => Ok(Anchor::Center),
            "centerbottom" => Ok(Anchor::CenterBottom),
            other => Err(PressError::InvalidInput(format!("unknown anchor: {}", other))),
        }
    }
}

/// Padding in device-independent units, as callers specify it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Insets {
    pub fn uniform(value: f32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    pub fn to_padding(&self, density: &impl DensityConverter) -> Padding {
        Padding {
            left: density.to_px(self.left),
            top: density.to_px(self.top),
            right: density.to_px(self.right),
            bottom: density.to_px(self.bottom),
        }
    }
}

/// Padding in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Top-left corner of an image overlay of `overlay` size on a `base` canvas
pub fn overlay_origin(
    anchor: Anchor,
    base: (u32, u32),
    overlay: (u32, u32),
    padding: &Padding,
) -> (i64, i64) {
    let (bw, bh) = (base.0 as i64, base.1 as i64);
    let (w, h) = (overlay.0 as i64, overlay.1 as i64);
    let (left, top) = (padding.left as i64, padding.top as i64);
    let (right, bottom) = (padding.right as i64, padding.bottom as i64);

    match anchor {
        Anchor::TopLeft => (left, top),
        Anchor::TopRight => (bw - w - right, top),
        Anchor::BottomLeft => (left, bh - h - bottom),
        Anchor::BottomRight => (bw - w - right, bh - h - bottom),
        Anchor::Center => ((bw - w) / 2, (bh - h) / 2),
        Anchor::CenterBottom => (0, bh * 2 / 3),
    }
}

/// Left edge and baseline of a text run measuring `text` on a `base` canvas
pub fn text_baseline_origin(
    anchor: Anchor,
    base: (u32, u32),
    text: TextBounds,
    padding: &Padding,
) -> (i64, i64) {
    let (bw, bh) = (base.0 as i64, base.1 as i64);
    let (w, h) = (text.width as i64, text.height as i64);
    let (left, top) = (padding.left as i64, padding.top as i64);
    let (right, bottom) = (padding.right as i64, padding.bottom as i64);

    match anchor {
        Anchor::TopLeft => (left, top + h),
        Anchor::TopRight => (bw - w - right, top + h),
        Anchor::BottomLeft => (left, bh - bottom),
        Anchor::BottomRight => (bw - w - right, bh - bottom),
        Anchor::Center => ((bw - w) / 2, (bh + h) / 2),
        Anchor::CenterBottom => (0, bh * 2 / 3 + h),
    }
}

/// Draw `overlay` with its top-left corner at `(x, y)` on a fresh `Argb8888`
/// copy of `base`. Parts outside the base are clipped.
pub fn draw_overlay(base: &RasterImage, overlay: &RasterImage, x: i64, y: i64) -> RasterImage {
    let mut canvas = base.to_rgba8();
    imageops::overlay(&mut canvas, &overlay.to_rgba8(), x, y);
    RasterImage::from_rgba(&canvas, PixelFormat::Argb8888)
}

/// How a watermark is resized before placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WatermarkScale {
    /// Stretch to the base width and a third of the base height
    #[default]
    FitBand,
    /// Keep the watermark's own dimensions
    Original,
}

/// Places watermarks and text on a copy of a base raster
#[derive(Debug, Clone)]
pub struct Compositor<D = DisplayDensity, G = BitmapFont> {
    density: D,
    glyphs: G,
    watermark_scale: WatermarkScale,
}

impl<D: DensityConverter> Compositor<D, BitmapFont> {
    pub fn new(density: D) -> Self {
        Self::with_glyphs(density, BitmapFont)
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(DisplayDensity::default())
    }
}

impl<D: DensityConverter, G: GlyphRasterizer> Compositor<D, G> {
    pub fn with_glyphs(density: D, glyphs: G) -> Self {
        Self {
            density,
            glyphs,
            watermark_scale: WatermarkScale::default(),
        }
    }

    pub fn watermark_scale(mut self, scale: WatermarkScale) -> Self {
        self.watermark_scale = scale;
        self
    }

    /// Resize the watermark according to the configured policy
    pub fn prepare_watermark(&self, base: &RasterImage, watermark: &RasterImage) -> RasterImage {
        match self.watermark_scale {
            WatermarkScale::FitBand => {
                watermark.scale_to(base.width(), base.height() / 3, FilterType::Triangle)
            }
            WatermarkScale::Original => watermark.clone(),
        }
    }

    /// Draw `watermark` onto a new copy of `base` at `anchor`.
    ///
    /// Returns `None` without a base and an unchanged copy of the base without
    /// a watermark. The result is always `Argb8888`.
    pub fn place_watermark(
        &self,
        base: Option<&RasterImage>,
        watermark: Option<&RasterImage>,
        anchor: Anchor,
        insets: &Insets,
    ) -> Option<RasterImage> {
        let base = base?;
        let Some(watermark) = watermark else {
            return Some(base.clone());
        };

        let prepared = self.prepare_watermark(base, watermark);
        let padding = insets.to_padding(&self.density);
        let (x, y) = overlay_origin(anchor, base.dimensions(), prepared.dimensions(), &padding);

        log::debug!(
            "Watermark {}x{} at {:?} on {}x{} -> ({}, {})",
            prepared.width(),
            prepared.height(),
            anchor,
            base.width(),
            base.height(),
            x,
            y
        );

        Some(draw_overlay(base, &prepared, x, y))
    }

    /// Draw `text` onto a new copy of `base` at `anchor`.
    ///
    /// Returns `None` without a base and an unchanged copy of the base without
    /// text. The result keeps the base's pixel format.
    pub fn draw_text(
        &self,
        base: Option<&RasterImage>,
        text: Option<&str>,
        style: &TextStyle,
        anchor: Anchor,
        insets: &Insets,
    ) -> Option<RasterImage> {
        let base = base?;
        let Some(text) = text else {
            return Some(base.clone());
        };

        let size_px = self.density.sp_to_px(style.size).max(0) as u32;
        let bounds = self.glyphs.measure(text, size_px);
        let padding = insets.to_padding(&self.density);
        let (x, baseline) = text_baseline_origin(anchor, base.dimensions(), bounds, &padding);

        log::debug!(
            "Text {:?} ({}x{}) at {:?} -> x {} baseline {}",
            text,
            bounds.width,
            bounds.height,
            anchor,
            x,
            baseline
        );

        let mut canvas = base.to_rgba8();
        self.glyphs
            .draw(&mut canvas, text, size_px, x, baseline, style.rgba());
        Some(RasterImage::from_rgba(&canvas, base.format()))
    }
}

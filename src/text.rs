//! Text measurement and glyph drawing for text overlays.
//!
//! Text is positioned by its baseline: the glyph run occupies the rows
//! `baseline - height .. baseline`.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Pixel, Rgba, RgbaImage};

/// Bounding box of a measured glyph run, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBounds {
    pub width: u32,
    pub height: u32,
}

/// Font size and color of a text overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in scale-independent units (sp)
    pub size: f32,
    /// Packed `0xAARRGGBB` color
    pub color: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 16.0,
            color: 0xFFFF_FFFF,
        }
    }
}

impl TextStyle {
    pub fn rgba(&self) -> Rgba<u8> {
        let [a, r, g, b] = self.color.to_be_bytes();
        Rgba([r, g, b, a])
    }
}

/// Measures and draws glyph runs
pub trait GlyphRasterizer {
    fn measure(&self, text: &str, size_px: u32) -> TextBounds;

    /// Draw `text` with its left edge at `x` and its baseline at `baseline`.
    /// Pixels outside the canvas are skipped.
    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size_px: u32,
        x: i64,
        baseline: i64,
        color: Rgba<u8>,
    );
}

const GLYPH_CELL: u32 = 8;

/// Fixed 8x8 bitmap font, scaled by whole multiples to approach the size
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

impl BitmapFont {
    fn scale(size_px: u32) -> u32 {
        (size_px / GLYPH_CELL).max(1)
    }

    fn glyph(ch: char) -> [u8; 8] {
        BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }
}

impl GlyphRasterizer for BitmapFont {
    fn measure(&self, text: &str, size_px: u32) -> TextBounds {
        let count = text.chars().count() as u64;
        if count == 0 {
            return TextBounds::default();
        }
        let cell = GLYPH_CELL * Self::scale(size_px);
        TextBounds {
            width: count.saturating_mul(cell as u64).min(u32::MAX as u64) as u32,
            height: cell,
        }
    }

    fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size_px: u32,
        x: i64,
        baseline: i64,
        color: Rgba<u8>,
    ) {
        let scale = Self::scale(size_px) as i64;
        let cell = GLYPH_CELL as i64 * scale;
        let top = baseline - cell;
        let (canvas_w, canvas_h) = (canvas.width() as i64, canvas.height() as i64);
        if top >= canvas_h || baseline <= 0 {
            return;
        }

        for (index, ch) in text.chars().enumerate() {
            let origin_x = x.saturating_add((index as i64).saturating_mul(cell));
            if origin_x >= canvas_w {
                break;
            }
            if origin_x.saturating_add(cell) <= 0 {
                continue;
            }

            for (row, bits) in Self::glyph(ch).iter().enumerate() {
                let y0 = top + row as i64 * scale;
                let (y_start, y_end) = (y0.max(0), (y0 + scale).min(canvas_h));
                if y_start >= y_end {
                    continue;
                }
                for col in 0..8i64 {
                    if (bits >> col) & 1 == 0 {
                        continue;
                    }
                    // Only the part of the scaled dot that lands on the canvas
                    let x0 = origin_x + col * scale;
                    let (x_start, x_end) = (x0.max(0), (x0 + scale).min(canvas_w));
                    for py in y_start..y_end {
                        for px in x_start..x_end {
                            canvas.get_pixel_mut(px as u32, py as u32).blend(&color);
                        }
                    }
                }
            }
        }
    }
}

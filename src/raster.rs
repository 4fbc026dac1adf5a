//! In-memory raster with an explicit pixel format.
//!
//! `RasterImage` is the value every stage passes around. It can only be built
//! through [`RasterImage::from_raw`] (or the conversions below), so the buffer
//! length always matches `width * height * bytes_per_pixel`.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::{PressError, Result};

/// Pixel layouts a raster can be decoded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Opaque, 8 bits per channel, stored R,G,B
    Rgb888,
    /// 8 bits per channel with alpha, stored R,G,B,A
    Argb8888,
    /// Opaque 5-6-5 packed into a little-endian `u16`
    Rgb565,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb888 => 3,
            PixelFormat::Argb8888 => 4,
            PixelFormat::Rgb565 => 2,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Argb8888)
    }

    /// Parse a format name as accepted on the command line
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "rgb888" | "rgb" | "opaque" => Ok(PixelFormat::Rgb888),
            "argb8888" | "rgba" | "argb" => Ok(PixelFormat::Argb8888),
            "rgb565" | "565" => Ok(PixelFormat::Rgb565),
            other => Err(PressError::InvalidInput(format!(
                "unknown pixel format: {} (expected rgb888, argb8888 or rgb565)",
                other
            ))),
        }
    }
}

/// A decoded raster owned by whoever decoded it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

fn buffer_len(width: u32, height: u32, format: PixelFormat) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(format.bytes_per_pixel()))
        .ok_or_else(|| {
            PressError::InvalidInput(format!("{}x{} raster overflows memory", width, height))
        })
}

impl RasterImage {
    /// Wrap an existing pixel buffer, checking its length against the format
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        let expected = buffer_len(width, height, format)?;
        if pixels.len() != expected {
            return Err(PressError::InvalidInput(format!(
                "pixel buffer is {} bytes, {}x{} {:?} needs {}",
                pixels.len(),
                width,
                height,
                format,
                expected
            )));
        }

        Ok(RasterImage {
            width,
            height,
            format,
            pixels,
        })
    }

    /// Build a raster filled with a single RGBA color
    pub fn filled(width: u32, height: u32, format: PixelFormat, rgba: [u8; 4]) -> Result<Self> {
        buffer_len(width, height, format)?;
        let canvas = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        Ok(Self::from_rgba(&canvas, format))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Read one pixel as RGBA, whatever the storage format
    pub fn pixel_rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        let px = &self.pixels[offset..offset + bpp];

        Some(match self.format {
            PixelFormat::Rgb888 => [px[0], px[1], px[2], 255],
            PixelFormat::Argb8888 => [px[0], px[1], px[2], px[3]],
            PixelFormat::Rgb565 => {
                let [r, g, b] = unpack_565(u16::from_le_bytes([px[0], px[1]]));
                [r, g, b, 255]
            }
        })
    }

    /// Convert a decoded `image` value into a raster of the requested format
    pub fn from_dynamic(img: &DynamicImage, format: PixelFormat) -> Self {
        match format {
            PixelFormat::Rgb888 => {
                let rgb = img.to_rgb8();
                let (width, height) = rgb.dimensions();
                RasterImage {
                    width,
                    height,
                    format,
                    pixels: rgb.into_raw(),
                }
            }
            PixelFormat::Argb8888 | PixelFormat::Rgb565 => Self::from_rgba(&img.to_rgba8(), format),
        }
    }

    /// Convert an RGBA buffer into a raster of the requested format
    pub fn from_rgba(rgba: &RgbaImage, format: PixelFormat) -> Self {
        let (width, height) = rgba.dimensions();
        let raw = rgba.as_raw();

        let pixels = match format {
            PixelFormat::Argb8888 => raw.clone(),
            PixelFormat::Rgb888 => {
                let mut data = Vec::with_capacity(raw.len() / 4 * 3);
                for chunk in raw.chunks_exact(4) {
                    data.extend_from_slice(&chunk[..3]);
                }
                data
            }
            PixelFormat::Rgb565 => {
                let mut data = Vec::with_capacity(raw.len() / 2);
                for chunk in raw.chunks_exact(4) {
                    data.extend_from_slice(&pack_565(chunk[0], chunk[1], chunk[2]).to_le_bytes());
                }
                data
            }
        };

        RasterImage {
            width,
            height,
            format,
            pixels,
        }
    }

    /// Expand to an `image` value for codecs and resampling
    pub fn to_dynamic(&self) -> DynamicImage {
        match self.format {
            PixelFormat::Rgb888 => DynamicImage::ImageRgb8(
                RgbImage::from_raw(self.width, self.height, self.pixels.clone())
                    .unwrap_or_else(|| RgbImage::new(self.width, self.height)),
            ),
            PixelFormat::Argb8888 | PixelFormat::Rgb565 => {
                DynamicImage::ImageRgba8(self.to_rgba8())
            }
        }
    }

    pub fn to_rgba8(&self) -> RgbaImage {
        let data = match self.format {
            PixelFormat::Argb8888 => self.pixels.clone(),
            PixelFormat::Rgb888 => {
                let mut data = Vec::with_capacity(self.pixels.len() / 3 * 4);
                for chunk in self.pixels.chunks_exact(3) {
                    data.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
                }
                data
            }
            PixelFormat::Rgb565 => {
                let mut data = Vec::with_capacity(self.pixels.len() * 2);
                for chunk in self.pixels.chunks_exact(2) {
                    let [r, g, b] = unpack_565(u16::from_le_bytes([chunk[0], chunk[1]]));
                    data.extend_from_slice(&[r, g, b, 255]);
                }
                data
            }
        };

        RgbaImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// Re-pack the pixels into another format
    pub fn convert(&self, format: PixelFormat) -> RasterImage {
        if format == self.format {
            return self.clone();
        }
        Self::from_rgba(&self.to_rgba8(), format)
    }

    /// Scale to exactly `width x height`.
    ///
    /// A zero target (or an empty source) leaves the image as it is.
    pub fn scale_to(&self, width: u32, height: u32, filter: FilterType) -> RasterImage {
        if width == 0 || height == 0 || self.is_empty() {
            return self.clone();
        }
        if (width, height) == self.dimensions() {
            return self.clone();
        }
        let scaled = self.to_dynamic().resize_exact(width, height, filter);
        Self::from_dynamic(&scaled, self.format)
    }
}

fn pack_565(r: u8, g: u8, b: u8) -> u16 {
    (((r as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((b as u16) >> 3)
}

fn unpack_565(value: u16) -> [u8; 3] {
    let r5 = ((value >> 11) & 0x1f) as u8;
    let g6 = ((value >> 5) & 0x3f) as u8;
    let b5 = (value & 0x1f) as u8;
    [(r5 << 3) | (r5 >> 2), (g6 << 2) | (g6 >> 4), (b5 << 3) | (b5 >> 2)]
}

//! Codec seam.
//!
//! The compressors reach encoders only through [`ImageCodec`].
//! [`StandardCodec`] uses `image` for decoding and PNG, `jpeg-encoder` for JPEG.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, ImageReader};

use crate::error::{PressError, Result};
use crate::quality::Quality;
use crate::raster::{PixelFormat, RasterImage};
use crate::sample::SampleSize;

/// Container format produced by [`ImageCodec::encode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    /// Lossy; honours the quality level
    Jpeg,
    /// Lossless; the quality level is ignored
    Png,
}

impl EncodeFormat {
    pub fn is_lossless(self) -> bool {
        matches!(self, EncodeFormat::Png)
    }
}

/// Parameters of a full decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Decode-time divisor applied to both dimensions
    pub sample_size: SampleSize,
    /// Pixel format of the produced raster
    pub format: PixelFormat,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            sample_size: SampleSize::ONE,
            format: PixelFormat::Argb8888,
        }
    }
}

/// Decode/encode capability consumed by the compressors
pub trait ImageCodec {
    /// Read only the dimensions, without allocating pixels
    fn decode_bounds(&self, bytes: &[u8]) -> Result<(u32, u32)>;

    /// Decode into a raster, downsampled by `options.sample_size`
    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> Result<RasterImage>;

    /// Serialize a raster at the given quality
    fn encode(&self, image: &RasterImage, format: EncodeFormat, quality: Quality) -> Result<Vec<u8>>;
}

/// Dimension of one side after sampling; never collapses to zero
pub fn sampled_dimension(source: u32, sample_size: SampleSize) -> u32 {
    (source / sample_size.get()).max(1)
}

/// Codec backed by the `image` and `jpeg-encoder` crates
#[derive(Debug, Clone, Copy)]
pub struct StandardCodec {
    /// Filter used when a sample size > 1 shrinks the decoded image
    pub resize_filter: FilterType,
    /// Chroma subsampling for JPEG output
    pub subsampling: jpeg_encoder::SamplingFactor,
}

impl Default for StandardCodec {
    fn default() -> Self {
        Self {
            resize_filter: FilterType::Triangle,
            subsampling: jpeg_encoder::SamplingFactor::R_4_2_0,
        }
    }
}

impl StandardCodec {
    fn encode_jpeg(&self, image: &RasterImage, quality: Quality) -> Result<Vec<u8>> {
        let rgb = image.to_dynamic().to_rgb8();
        let (width, height) = rgb.dimensions();

        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(PressError::Encode(format!(
                "{}x{} exceeds the JPEG dimension limit",
                width, height
            )));
        }

        let mut jpeg_bytes = Vec::new();
        let mut encoder = jpeg_encoder::Encoder::new(&mut jpeg_bytes, quality.get());
        encoder.set_sampling_factor(self.subsampling);
        encoder
            .encode(
                rgb.as_raw(),
                width as u16,
                height as u16,
                jpeg_encoder::ColorType::Rgb,
            )
            .map_err(|e| PressError::Encode(format!("JPEG: {}", e)))?;

        Ok(jpeg_bytes)
    }

    fn encode_png(&self, image: &RasterImage) -> Result<Vec<u8>> {
        // 565 has no PNG layout of its own, widen to 8 bits per channel
        let widened;
        let source = if image.format() == PixelFormat::Rgb565 {
            widened = image.convert(PixelFormat::Rgb888);
            &widened
        } else {
            image
        };

        let color = if source.format().has_alpha() {
            ExtendedColorType::Rgba8
        } else {
            ExtendedColorType::Rgb8
        };

        let mut png_bytes = Vec::new();
        PngEncoder::new(Cursor::new(&mut png_bytes))
            .write_image(source.pixels(), source.width(), source.height(), color)
            .map_err(|e| PressError::Encode(format!("PNG: {}", e)))?;

        Ok(png_bytes)
    }
}

impl ImageCodec for StandardCodec {
    fn decode_bounds(&self, bytes: &[u8]) -> Result<(u32, u32)> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PressError::Decode(format!("Unrecognised image data: {}", e)))?;

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| PressError::Decode(format!("Could not read dimensions: {}", e)))?;

        if width == 0 || height == 0 {
            return Err(PressError::Decode(format!(
                "Zero-sized image: {}x{}",
                width, height
            )));
        }

        Ok((width, height))
    }

    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> Result<RasterImage> {
        let img = image::load_from_memory(bytes).map_err(|e| PressError::Decode(e.to_string()))?;

        if img.width() == 0 || img.height() == 0 {
            return Err(PressError::Decode("Zero-sized image".to_string()));
        }

        let img = if options.sample_size.get() > 1 {
            let width = sampled_dimension(img.width(), options.sample_size);
            let height = sampled_dimension(img.height(), options.sample_size);
            img.resize_exact(width, height, self.resize_filter)
        } else {
            img
        };

        Ok(RasterImage::from_dynamic(&img, options.format))
    }

    fn encode(&self, image: &RasterImage, format: EncodeFormat, quality: Quality) -> Result<Vec<u8>> {
        if image.is_empty() {
            return Err(PressError::Encode(format!(
                "Cannot encode a {}x{} image",
                image.width(),
                image.height()
            )));
        }

        match format {
            EncodeFormat::Jpeg => self.encode_jpeg(image, quality),
            EncodeFormat::Png => self.encode_png(image),
        }
    }
}

//! Dimension-driven compression.
//!
//! Instead of searching over quality, shrink the raster by a decode-time sample
//! size and re-pack it into a smaller pixel format (RGB 565 by default). The
//! sample size is either given or derived from fixed target bounds.

use crate::codec::{DecodeOptions, EncodeFormat, ImageCodec};
use crate::error::{PressError, Result};
use crate::quality::Quality;
use crate::raster::{PixelFormat, RasterImage};
use crate::sample::SampleSize;

pub const DEFAULT_TARGET_WIDTH: u32 = 720;
pub const DEFAULT_TARGET_HEIGHT: u32 = 1280;

/// Options for [`DimensionalCompressor::compress`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionalOptions {
    /// Explicit divisor. `1` asks the compressor to derive one from the targets.
    pub sample_size: SampleSize,
    /// Pixel format of the result
    pub pixel_format: PixelFormat,
    /// Landscape images wider than this are divided by `width / target_width`
    pub target_width: u32,
    /// Portrait images taller than this are divided by `height / target_height`
    pub target_height: u32,
}

impl Default for DimensionalOptions {
    fn default() -> Self {
        Self {
            sample_size: SampleSize::ONE,
            pixel_format: PixelFormat::Rgb565,
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
        }
    }
}

/// Divisor that brings a source within the target bounds.
///
/// Only the dominant side is considered: width for landscape, height for
/// portrait. Square sources and sources already inside the bounds get 1.
pub fn fit_divisor(width: u32, height: u32, target_width: u32, target_height: u32) -> SampleSize {
    let divisor = if width > height && width > target_width {
        width / target_width.max(1)
    } else if width < height && height > target_height {
        height / target_height.max(1)
    } else {
        1
    };
    SampleSize::new(divisor).unwrap_or(SampleSize::ONE)
}

/// Result of [`DimensionalCompressor::compress`]
#[derive(Debug, Clone)]
pub enum ResampleOutcome {
    Resampled {
        image: RasterImage,
        sample_size: SampleSize,
    },
    /// Encoding or decoding failed; `image` is the untouched input
    Unchanged {
        image: RasterImage,
        reason: PressError,
    },
}

impl ResampleOutcome {
    pub fn image(&self) -> &RasterImage {
        match self {
            ResampleOutcome::Resampled { image, .. } | ResampleOutcome::Unchanged { image, .. } => {
                image
            }
        }
    }

    pub fn into_image(self) -> RasterImage {
        match self {
            ResampleOutcome::Resampled { image, .. } | ResampleOutcome::Unchanged { image, .. } => {
                image
            }
        }
    }

    pub fn is_resampled(&self) -> bool {
        matches!(self, ResampleOutcome::Resampled { .. })
    }

    pub fn sample_size(&self) -> Option<SampleSize> {
        match self {
            ResampleOutcome::Resampled { sample_size, .. } => Some(*sample_size),
            ResampleOutcome::Unchanged { .. } => None,
        }
    }
}

/// Shrinks a raster by sample size and pixel format
#[derive(Debug, Clone, Default)]
pub struct DimensionalCompressor<C> {
    codec: C,
}

impl<C: ImageCodec> DimensionalCompressor<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Never fails: codec errors hand the input back as
    /// [`ResampleOutcome::Unchanged`].
    pub fn compress(&self, image: RasterImage, options: &DimensionalOptions) -> ResampleOutcome {
        match self.resample(&image, options) {
            Ok((resampled, sample_size)) => ResampleOutcome::Resampled {
                image: resampled,
                sample_size,
            },
            Err(reason) => {
                log::warn!("Dimensional compression failed, keeping original: {}", reason);
                ResampleOutcome::Unchanged { image, reason }
            }
        }
    }

    fn resample(
        &self,
        image: &RasterImage,
        options: &DimensionalOptions,
    ) -> Result<(RasterImage, SampleSize)> {
        // Lossless intermediate so only the sampling and format change the pixels
        let buffer = self.codec.encode(image, EncodeFormat::Png, Quality::MAX)?;
        let (width, height) = self.codec.decode_bounds(&buffer)?;

        let sample_size = if options.sample_size != SampleSize::ONE {
            options.sample_size
        } else {
            fit_divisor(width, height, options.target_width, options.target_height)
        };

        log::debug!(
            "Resampling {}x{} with divisor {} into {:?}",
            width,
            height,
            sample_size,
            options.pixel_format
        );

        let decoded = self.codec.decode(
            &buffer,
            &DecodeOptions {
                sample_size,
                format: options.pixel_format,
            },
        )?;

        Ok((decoded, sample_size))
    }
}

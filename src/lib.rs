//! Raster press library
//!
//! Sample-size planning, size-bounded compression and anchored overlays for
//! decoded rasters. Shared between the CLI and WASM targets.
//!
//! - [`sample`] picks decode-time divisors from a pixel / side-length budget.
//! - [`quality`] lowers the encoder quality until the output fits a byte budget.
//! - [`dimension`] shrinks by a sample size and a smaller pixel format.
//! - [`overlay`] places watermarks and text at named anchors.

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub mod codec;
pub mod density;
pub mod dimension;
pub mod error;
pub mod overlay;
pub mod quality;
pub mod raster;
pub mod sample;
pub mod text;

#[cfg(test)]
pub(crate) mod test_support;

pub use codec::{DecodeOptions, EncodeFormat, ImageCodec, StandardCodec};
pub use density::{DensityConverter, DisplayDensity};
pub use dimension::{fit_divisor, DimensionalCompressor, DimensionalOptions, ResampleOutcome};
pub use error::{PressError, Result};
pub use overlay::{
    draw_overlay, overlay_origin, text_baseline_origin, Anchor, Compositor, Insets, Padding,
    WatermarkScale,
};
pub use quality::{Attempt, BoundedQualityCompressor, Quality, QualityOutcome, QualitySearch};
pub use raster::{PixelFormat, RasterImage};
pub use sample::{compute_sample_size, decode_with_budget, DecodeBudget, SampleSize};
pub use text::{BitmapFont, GlyphRasterizer, TextBounds, TextStyle};

/// Decode `bytes` at full resolution into `format`
pub fn decode_bytes<C: ImageCodec + ?Sized>(
    codec: &C,
    bytes: &[u8],
    format: PixelFormat,
) -> Result<RasterImage> {
    decode_with_budget(codec, bytes, &DecodeBudget::unbounded(), format)
}

/// Compress encoded image bytes to at most `search.max_bytes`.
///
/// Returns the bytes to store together with the outcome. When the search could
/// not run, the input bytes are returned as they are.
pub fn compress_bytes(bytes: &[u8], search: &QualitySearch) -> Result<(Vec<u8>, QualityOutcome)> {
    let codec = StandardCodec::default();
    let image = decode_bytes(&codec, bytes, PixelFormat::Argb8888)?;
    let outcome = BoundedQualityCompressor::new(codec).compress(image, search);

    let output = match outcome.encoded() {
        Some(encoded) => encoded.to_vec(),
        None => bytes.to_vec(),
    };
    Ok((output, outcome))
}

/// Shrink encoded image bytes by sample size and pixel format, returning PNG
pub fn resample_bytes(
    bytes: &[u8],
    options: &DimensionalOptions,
) -> Result<(Vec<u8>, ResampleOutcome)> {
    let codec = StandardCodec::default();
    let image = decode_bytes(&codec, bytes, PixelFormat::Argb8888)?;
    let outcome = DimensionalCompressor::new(codec).compress(image, options);
    let output = codec.encode(outcome.image(), EncodeFormat::Png, Quality::MAX)?;
    Ok((output, outcome))
}

#[cfg(not(target_arch = "wasm32"))]
pub mod file_ops {
    //! Helpers that read sources from and write results to disk.

    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn read(path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| PressError::Load(format!("{}: {}", path.display(), e)))
    }

    fn write(path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PressError::Save(format!("{}: {}", parent.display(), e)))?;
        }
        fs::write(path, bytes).map_err(|e| PressError::Save(format!("{}: {}", path.display(), e)))
    }

    /// Load an image file, downsampling it to fit `budget`
    pub fn load_image(path: &Path, budget: &DecodeBudget, format: PixelFormat) -> Result<RasterImage> {
        let bytes = read(path)?;
        decode_with_budget(&StandardCodec::default(), &bytes, budget, format)
    }

    /// Write `image` as a lossless PNG at `path`
    pub fn save_png_to(image: &RasterImage, path: &Path) -> Result<()> {
        let bytes = StandardCodec::default().encode(image, EncodeFormat::Png, Quality::MAX)?;
        write(path, &bytes)
    }

    /// Save `image` as `dir/name` in PNG, replacing an existing file
    pub fn save_png(image: &RasterImage, dir: &Path, name: &str) -> Result<PathBuf> {
        let path = dir.join(name);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| PressError::Save(format!("{}: {}", path.display(), e)))?;
        }
        save_png_to(image, &path)?;
        Ok(path)
    }

    /// Compress an image file to at most `search.max_bytes`
    pub fn compress_file(input: &Path, output: &Path, search: &QualitySearch) -> Result<QualityOutcome> {
        let bytes = read(input)?;
        let (compressed, outcome) = compress_bytes(&bytes, search)?;
        write(output, &compressed)?;
        Ok(outcome)
    }

    /// Shrink an image file by sample size and pixel format, writing PNG
    pub fn resample_file(
        input: &Path,
        output: &Path,
        options: &DimensionalOptions,
    ) -> Result<ResampleOutcome> {
        let bytes = read(input)?;
        let (resampled, outcome) = resample_bytes(&bytes, options)?;
        write(output, &resampled)?;
        Ok(outcome)
    }
}

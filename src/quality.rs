//! Size-bounded quality search.
//!
//! Encode at full quality, then keep stepping the quality down until the encoded
//! buffer fits the byte budget or the quality floor is reached. The result is
//! decoded back into a raster, since callers hand rasters around rather than
//! byte buffers.

use crate::codec::{DecodeOptions, EncodeFormat, ImageCodec};
use crate::error::{PressError, Result};
use crate::raster::RasterImage;
use crate::sample::SampleSize;

/// Default byte budget (100 KiB)
pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024;

/// Codec quality level in `1..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: Quality = Quality(100);
    pub const MIN: Quality = Quality(1);

    pub fn new(value: u8) -> Result<Self> {
        if (1..=100).contains(&value) {
            Ok(Quality(value))
        } else {
            Err(PressError::InvalidQuality(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Step down by `step`, never below `floor`
    fn lowered(self, step: u8, floor: Quality) -> Quality {
        Quality(self.0.saturating_sub(step).max(floor.0))
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options for the bounded quality search
#[derive(Debug, Clone)]
pub struct QualitySearch {
    /// Largest acceptable encoded size in bytes
    pub max_bytes: u64,
    /// Quality of the first encode
    pub start: Quality,
    /// Amount the quality drops per retry
    pub step: u8,
    /// Lowest quality the search will try
    pub floor: Quality,
    /// Output container
    pub format: EncodeFormat,
}

impl Default for QualitySearch {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            start: Quality::MAX,
            step: 10,
            floor: Quality::MIN,
            format: EncodeFormat::Jpeg,
        }
    }
}

impl QualitySearch {
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_bytes == 0 {
            return Err(PressError::InvalidInput(
                "max_bytes must be greater than 0".to_string(),
            ));
        }
        if self.step == 0 {
            return Err(PressError::InvalidInput(
                "quality step must be greater than 0".to_string(),
            ));
        }
        if self.floor > self.start {
            return Err(PressError::InvalidInput(format!(
                "quality floor {} is above the start quality {}",
                self.floor, self.start
            )));
        }
        Ok(())
    }
}

/// One encode performed during the search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(serde::Serialize))]
pub struct Attempt {
    pub quality: u8,
    pub encoded_len: usize,
}

/// Result of [`BoundedQualityCompressor::compress`]
#[derive(Debug, Clone)]
pub enum QualityOutcome {
    /// The final encode fits the budget
    Compressed {
        image: RasterImage,
        encoded: Vec<u8>,
        attempts: Vec<Attempt>,
    },
    /// The floor quality was reached and the encode is still over budget
    BudgetNotMet {
        image: RasterImage,
        encoded: Vec<u8>,
        attempts: Vec<Attempt>,
    },
    /// Encoding or decoding failed; `image` is the untouched input
    Unchanged {
        image: RasterImage,
        reason: PressError,
    },
}

impl QualityOutcome {
    pub fn image(&self) -> &RasterImage {
        match self {
            QualityOutcome::Compressed { image, .. }
            | QualityOutcome::BudgetNotMet { image, .. }
            | QualityOutcome::Unchanged { image, .. } => image,
        }
    }

    pub fn into_image(self) -> RasterImage {
        match self {
            QualityOutcome::Compressed { image, .. }
            | QualityOutcome::BudgetNotMet { image, .. }
            | QualityOutcome::Unchanged { image, .. } => image,
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, QualityOutcome::Compressed { .. })
    }

    /// Encoded bytes of the final attempt, if the search produced any
    pub fn encoded(&self) -> Option<&[u8]> {
        match self {
            QualityOutcome::Compressed { encoded, .. }
            | QualityOutcome::BudgetNotMet { encoded, .. } => Some(encoded),
            QualityOutcome::Unchanged { .. } => None,
        }
    }

    pub fn attempts(&self) -> &[Attempt] {
        match self {
            QualityOutcome::Compressed { attempts, .. }
            | QualityOutcome::BudgetNotMet { attempts, .. } => attempts,
            QualityOutcome::Unchanged { .. } => &[],
        }
    }

    /// Quality of the last encode
    pub fn final_quality(&self) -> Option<u8> {
        self.attempts().last().map(|a| a.quality)
    }
}

/// Re-encodes an image with decreasing quality until it fits a byte budget
#[derive(Debug, Clone, Default)]
pub struct BoundedQualityCompressor<C> {
    codec: C,
}

impl<C: ImageCodec> BoundedQualityCompressor<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Compress `image` to at most `search.max_bytes`.
    ///
    /// Never fails: codec errors hand the input back as
    /// [`QualityOutcome::Unchanged`].
    pub fn compress(&self, image: RasterImage, search: &QualitySearch) -> QualityOutcome {
        let (encoded, attempts) = match self.search(&image, search) {
            Ok(found) => found,
            Err(reason) => {
                log::warn!("Quality search failed, keeping original: {}", reason);
                return QualityOutcome::Unchanged { image, reason };
            }
        };

        let options = DecodeOptions {
            sample_size: SampleSize::ONE,
            format: image.format(),
        };
        let decoded = match self.codec.decode(&encoded, &options) {
            Ok(decoded) => decoded,
            Err(reason) => {
                log::warn!("Could not decode compressed buffer, keeping original: {}", reason);
                return QualityOutcome::Unchanged { image, reason };
            }
        };

        if encoded.len() as u64 <= search.max_bytes {
            QualityOutcome::Compressed {
                image: decoded,
                encoded,
                attempts,
            }
        } else {
            log::warn!(
                "Budget of {} bytes not met at quality floor {} ({} bytes)",
                search.max_bytes,
                search.floor,
                encoded.len()
            );
            QualityOutcome::BudgetNotMet {
                image: decoded,
                encoded,
                attempts,
            }
        }
    }

    fn search(&self, image: &RasterImage, search: &QualitySearch) -> Result<(Vec<u8>, Vec<Attempt>)> {
        search.validate()?;

        let mut attempts = Vec::new();
        let mut quality = search.start;
        let mut buffer = self.codec.encode(image, search.format, quality)?;
        attempts.push(Attempt {
            quality: quality.get(),
            encoded_len: buffer.len(),
        });
        log::debug!("Quality {}: {} bytes", quality, buffer.len());

        while buffer.len() as u64 > search.max_bytes {
            // Lossless output does not shrink with quality
            if quality <= search.floor || search.format.is_lossless() {
                break;
            }
            quality = quality.lowered(search.step, search.floor);
            buffer = self.codec.encode(image, search.format, quality)?;
            attempts.push(Attempt {
                quality: quality.get(),
                encoded_len: buffer.len(),
            });
            log::debug!("Quality {}: {} bytes", quality, buffer.len());
        }

        Ok((buffer, attempts))
    }
}

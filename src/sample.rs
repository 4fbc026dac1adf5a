//! Decode-time sample size planning.
//!
//! Given the bounds of an encoded image and a [`DecodeBudget`], pick the integer
//! divisor to decode with. The divisor is always rounded *up* to a value decoders
//! handle efficiently (a power of two up to 8, a multiple of 8 beyond), so the
//! result never exceeds the pixel budget.

use crate::codec::{DecodeOptions, ImageCodec};
use crate::error::{PressError, Result};
use crate::raster::{PixelFormat, RasterImage};

/// Upper bound on the divisor when no minimum side length is requested
const UNBOUNDED_SIDE_DIVISOR: u32 = 128;

/// Positive decode-time downsampling divisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleSize(u32);

impl SampleSize {
    pub const ONE: SampleSize = SampleSize(1);

    /// `None` for zero
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(SampleSize(value))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for SampleSize {
    fn default() -> Self {
        SampleSize::ONE
    }
}

impl std::fmt::Display for SampleSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Limits used to plan a downsampled decode. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeBudget {
    /// Maximum number of pixels in the decoded raster
    pub max_pixels: Option<u64>,
    /// Smallest side length the decoded raster should keep
    pub min_side_length: Option<u32>,
}

impl DecodeBudget {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn max_pixels(max_pixels: u64) -> Self {
        Self {
            max_pixels: Some(max_pixels),
            min_side_length: None,
        }
    }

    /// Build a budget from the signed form where `-1` means unbounded.
    ///
    /// Zero and any other negative value are rejected: zero would divide by
    /// zero and other negatives are caller bugs rather than the sentinel.
    pub fn from_signed(max_pixels: i64, min_side_length: i32) -> Result<Self> {
        let max_pixels = match max_pixels {
            -1 => None,
            n if n > 0 => Some(n as u64),
            n => {
                return Err(PressError::InvalidBudget(format!(
                    "max_pixels must be positive or -1, got {}",
                    n
                )))
            }
        };
        let min_side_length = match min_side_length {
            -1 => None,
            n if n > 0 => Some(n as u32),
            n => {
                return Err(PressError::InvalidBudget(format!(
                    "min_side_length must be positive or -1, got {}",
                    n
                )))
            }
        };

        Ok(Self {
            max_pixels,
            min_side_length,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.max_pixels == Some(0) {
            return Err(PressError::InvalidBudget("max_pixels must not be 0".to_string()));
        }
        if self.min_side_length == Some(0) {
            return Err(PressError::InvalidBudget(
                "min_side_length must not be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unrounded divisor satisfying the budget
pub fn initial_sample_size(width: u32, height: u32, budget: &DecodeBudget) -> Result<u32> {
    if width == 0 || height == 0 {
        return Err(PressError::Decode(format!(
            "Cannot plan a decode for a {}x{} image",
            width, height
        )));
    }
    budget.validate()?;

    let w = width as f64;
    let h = height as f64;

    let lower_bound = match budget.max_pixels {
        None => 1,
        Some(max_pixels) => (w * h / max_pixels as f64).sqrt().ceil() as u32,
    };
    let upper_bound = match budget.min_side_length {
        None => UNBOUNDED_SIDE_DIVISOR,
        Some(min_side) => {
            let min_side = min_side as f64;
            (w / min_side).floor().min((h / min_side).floor()) as u32
        }
    };

    if upper_bound < lower_bound {
        // No overlap between the two constraints; the pixel budget wins
        return Ok(lower_bound);
    }

    Ok(match (budget.max_pixels, budget.min_side_length) {
        (None, None) => 1,
        (_, None) => lower_bound,
        _ => upper_bound,
    })
}

/// Round a divisor up to the next power of two (up to 8) or multiple of 8
pub fn round_sample_size(initial: u32) -> SampleSize {
    let rounded = if initial <= 8 {
        initial.max(1).next_power_of_two()
    } else {
        initial.div_ceil(8).saturating_mul(8)
    };
    SampleSize(rounded)
}

/// Compute the decode divisor for an image of `width x height` under `budget`
pub fn compute_sample_size(width: u32, height: u32, budget: &DecodeBudget) -> Result<SampleSize> {
    let initial = initial_sample_size(width, height, budget)?;
    Ok(round_sample_size(initial))
}

/// Decode `bytes` downsampled so the result fits `budget`.
///
/// Reads the bounds first, plans the sample size, then performs the full
/// decode into `format`.
pub fn decode_with_budget<C: ImageCodec + ?Sized>(
    codec: &C,
    bytes: &[u8],
    budget: &DecodeBudget,
    format: PixelFormat,
) -> Result<RasterImage> {
    let (width, height) = codec.decode_bounds(bytes)?;
    let sample_size = compute_sample_size(width, height, budget)?;

    log::debug!(
        "Planned decode of {}x{} with sample size {} ({:?})",
        width,
        height,
        sample_size,
        budget
    );

    codec.decode(
        bytes,
        &DecodeOptions {
            sample_size,
            format,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(width: u32, height: u32, budget: DecodeBudget) -> u32 {
        compute_sample_size(width, height, &budget).unwrap().get()
    }

    #[test]
    fn unbounded_budget_never_samples() {
        assert_eq!(sample(4000, 3000, DecodeBudget::unbounded()), 1);
        assert_eq!(sample(1, 1, DecodeBudget::unbounded()), 1);
    }

    #[test]
    fn pixel_budget_rounds_up_to_power_of_two() {
        // sqrt(4000*3000 / 1_000_000) = 3.46 -> 4
        assert_eq!(sample(4000, 3000, DecodeBudget::max_pixels(1_000_000)), 4);
        // sqrt(2) rounds to 2
        assert_eq!(sample(200, 100, DecodeBudget::max_pixels(10_000)), 2);
        // Already inside the budget
        assert_eq!(sample(100, 100, DecodeBudget::max_pixels(10_000)), 1);
    }

    #[test]
    fn large_divisors_round_to_multiple_of_eight() {
        // sqrt(10000*10000 / 1000) = 316.2 -> 317 -> 320
        assert_eq!(sample(10_000, 10_000, DecodeBudget::max_pixels(1_000)), 320);
        // ceil(sqrt(81)) = 9 -> 16
        assert_eq!(sample(900, 900, DecodeBudget::max_pixels(10_000)), 16);
    }

    #[test]
    fn side_length_budget_uses_upper_bound() {
        let budget = DecodeBudget {
            max_pixels: None,
            min_side_length: Some(100),
        };
        // min(1000/100, 600/100) = 6 -> 8
        assert_eq!(sample(1000, 600, budget), 8);
    }

    #[test]
    fn conflicting_bounds_prefer_pixel_budget() {
        let budget = DecodeBudget {
            max_pixels: Some(100),
            min_side_length: Some(500),
        };
        // lower = 100, upper = 2 -> 100 -> 104
        assert_eq!(sample(1000, 1000, budget), 104);
    }

    #[test]
    fn min_side_larger_than_image_falls_back_to_lower_bound() {
        let budget = DecodeBudget {
            max_pixels: None,
            min_side_length: Some(5000),
        };
        assert_eq!(sample(1000, 1000, budget), 1);
    }

    #[test]
    fn zero_dimensions_are_decode_failures() {
        let err = compute_sample_size(0, 100, &DecodeBudget::unbounded()).unwrap_err();
        assert!(matches!(err, PressError::Decode(_)));
        let err = compute_sample_size(100, 0, &DecodeBudget::max_pixels(10)).unwrap_err();
        assert!(matches!(err, PressError::Decode(_)));
    }

    #[test]
    fn signed_budget_accepts_only_the_sentinel() {
        assert_eq!(
            DecodeBudget::from_signed(-1, -1).unwrap(),
            DecodeBudget::unbounded()
        );
        assert_eq!(
            DecodeBudget::from_signed(50, 10).unwrap(),
            DecodeBudget {
                max_pixels: Some(50),
                min_side_length: Some(10),
            }
        );
        assert!(matches!(
            DecodeBudget::from_signed(-5, -1),
            Err(PressError::InvalidBudget(_))
        ));
        assert!(matches!(
            DecodeBudget::from_signed(-1, 0),
            Err(PressError::InvalidBudget(_))
        ));
    }

    #[test]
    fn zero_budget_is_rejected() {
        let err = compute_sample_size(10, 10, &DecodeBudget::max_pixels(0)).unwrap_err();
        assert!(matches!(err, PressError::InvalidBudget(_)));
    }

    #[test]
    fn rounding_table() {
        let rounded: Vec<u32> = (1..=17).map(|n| round_sample_size(n).get()).collect();
        assert_eq!(
            rounded,
            vec![1, 2, 4, 4, 8, 8, 8, 8, 16, 16, 16, 16, 16, 16, 16, 16, 24]
        );
        assert_eq!(round_sample_size(0).get(), 1);
    }
}

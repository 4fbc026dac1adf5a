//! WebAssembly bindings for the raster press

use wasm_bindgen::prelude::*;

use crate::{
    compress_bytes, resample_bytes, DimensionalOptions, PixelFormat, Quality, QualityOutcome,
    QualitySearch, ResampleOutcome, SampleSize,
};

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Compress an image to at most `max_bytes` by lowering JPEG quality
///
/// # Arguments
/// * `image_bytes` - The encoded input image
/// * `max_bytes` - Byte budget (default: 102400)
/// * `min_quality` - Quality floor 1-100 (default: 1)
///
/// # Returns
/// A `CompressResultJs` with the output bytes and the quality attempts
#[wasm_bindgen]
pub fn compress_image(
    image_bytes: &[u8],
    max_bytes: Option<u32>,
    min_quality: Option<u8>,
) -> Result<CompressResultJs, JsError> {
    let search = QualitySearch {
        max_bytes: max_bytes.map(u64::from).unwrap_or(crate::quality::DEFAULT_MAX_BYTES),
        floor: Quality::new(min_quality.unwrap_or(1)).map_err(|e| JsError::new(&e.to_string()))?,
        ..QualitySearch::default()
    };

    let (bytes, outcome) =
        compress_bytes(image_bytes, &search).map_err(|e| JsError::new(&e.to_string()))?;

    let status = match &outcome {
        QualityOutcome::Compressed { .. } => "compressed".to_string(),
        QualityOutcome::BudgetNotMet { .. } => "budget-not-met".to_string(),
        QualityOutcome::Unchanged { reason, .. } => format!("unchanged: {}", reason),
    };
    let attempts_json =
        serde_json::to_string(outcome.attempts()).unwrap_or_else(|_| "[]".to_string());

    Ok(CompressResultJs {
        bytes,
        status,
        attempts_json,
    })
}

/// Shrink an image by sample size and pixel format, returning PNG bytes
///
/// # Arguments
/// * `image_bytes` - The encoded input image
/// * `sample_size` - Decode divisor; 1 derives one from 720x1280 (default: 1)
/// * `pixel_format` - "rgb565", "rgb888" or "argb8888" (default: "rgb565")
#[wasm_bindgen]
pub fn shrink_image(
    image_bytes: &[u8],
    sample_size: Option<u32>,
    pixel_format: Option<String>,
) -> Result<Vec<u8>, JsError> {
    let pixel_format = match pixel_format {
        Some(name) => PixelFormat::parse(&name).map_err(|e| JsError::new(&e.to_string()))?,
        None => PixelFormat::Rgb565,
    };
    let options = DimensionalOptions {
        sample_size: SampleSize::new(sample_size.unwrap_or(1))
            .ok_or_else(|| JsError::new("sample size must be at least 1"))?,
        pixel_format,
        ..DimensionalOptions::default()
    };

    let (bytes, outcome) =
        resample_bytes(image_bytes, &options).map_err(|e| JsError::new(&e.to_string()))?;
    if let ResampleOutcome::Unchanged { reason, .. } = &outcome {
        web_sys::console::warn_1(&format!("Image left unchanged: {}", reason).into());
    }

    Ok(bytes)
}

/// Result of a size-bounded compression
#[wasm_bindgen]
pub struct CompressResultJs {
    bytes: Vec<u8>,
    status: String,
    attempts_json: String,
}

#[wasm_bindgen]
impl CompressResultJs {
    /// Get the compressed image bytes
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// "compressed", "budget-not-met" or "unchanged: <reason>"
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        self.status.clone()
    }

    /// Quality/size of every encode as a JSON array
    #[wasm_bindgen(getter)]
    pub fn attempts_json(&self) -> String {
        self.attempts_json.clone()
    }
}

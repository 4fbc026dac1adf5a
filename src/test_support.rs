//! Deterministic codec for unit tests.
//!
//! Encoded buffers are `quality * bytes_per_quality` bytes long and carry the
//! quality plus the source dimensions in a 9-byte header, so decode and
//! decode-bounds can be answered without a real codec.

use std::cell::RefCell;

use crate::codec::{sampled_dimension, DecodeOptions, EncodeFormat, ImageCodec};
use crate::error::{PressError, Result};
use crate::quality::Quality;
use crate::raster::RasterImage;

const HEADER_LEN: usize = 9;

pub(crate) struct ScriptedCodec {
    bytes_per_quality: usize,
    fail_encode_at: Option<u8>,
    fail_decode: bool,
    encoded: RefCell<Vec<(EncodeFormat, u8)>>,
    decoded: RefCell<Vec<DecodeOptions>>,
}

impl ScriptedCodec {
    pub fn new(bytes_per_quality: usize) -> Self {
        Self {
            bytes_per_quality,
            fail_encode_at: None,
            fail_decode: false,
            encoded: RefCell::new(Vec::new()),
            decoded: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_encode_at(mut self, quality: u8) -> Self {
        self.fail_encode_at = Some(quality);
        self
    }

    pub fn failing_decode(mut self) -> Self {
        self.fail_decode = true;
        self
    }

    pub fn encoded_qualities(&self) -> Vec<u8> {
        self.encoded.borrow().iter().map(|(_, q)| *q).collect()
    }

    pub fn encoded_formats(&self) -> Vec<EncodeFormat> {
        self.encoded.borrow().iter().map(|(f, _)| *f).collect()
    }

    pub fn decode_calls(&self) -> Vec<DecodeOptions> {
        self.decoded.borrow().clone()
    }

    fn header(bytes: &[u8]) -> Result<(u8, u32, u32)> {
        if bytes.len() < HEADER_LEN {
            return Err(PressError::Decode("truncated scripted buffer".to_string()));
        }
        let width = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let height = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        Ok((bytes[0], width, height))
    }
}

impl ImageCodec for ScriptedCodec {
    fn decode_bounds(&self, bytes: &[u8]) -> Result<(u32, u32)> {
        let (_, width, height) = Self::header(bytes)?;
        Ok((width, height))
    }

    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> Result<RasterImage> {
        self.decoded.borrow_mut().push(*options);
        if self.fail_decode {
            return Err(PressError::Decode("scripted decode failure".to_string()));
        }
        let (quality, width, height) = Self::header(bytes)?;
        RasterImage::filled(
            sampled_dimension(width, options.sample_size),
            sampled_dimension(height, options.sample_size),
            options.format,
            [quality, 0, 0, 255],
        )
    }

    fn encode(&self, image: &RasterImage, format: EncodeFormat, quality: Quality) -> Result<Vec<u8>> {
        self.encoded.borrow_mut().push((format, quality.get()));
        if self.fail_encode_at == Some(quality.get()) {
            return Err(PressError::Encode(format!(
                "scripted encode failure at {}",
                quality
            )));
        }

        let len = (quality.get() as usize * self.bytes_per_quality).max(HEADER_LEN);
        let mut bytes = vec![0u8; len];
        bytes[0] = quality.get();
        bytes[1..5].copy_from_slice(&image.width().to_le_bytes());
        bytes[5..9].copy_from_slice(&image.height().to_le_bytes());
        Ok(bytes)
    }
}

use raster_press::{
    BoundedQualityCompressor, DimensionalCompressor, DimensionalOptions, EncodeFormat,
    ImageCodec, PixelFormat, Quality, QualityOutcome, QualitySearch, RasterImage,
    ResampleOutcome, SampleSize, StandardCodec,
};

fn noisy(width: u32, height: u32) -> RasterImage {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    let mut state: u32 = 0x1234_5678;
    for _ in 0..width * height * 3 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        pixels.push((state >> 24) as u8);
    }
    RasterImage::from_raw(width, height, PixelFormat::Rgb888, pixels).unwrap()
}

#[test]
fn satisfied_budget_stops_at_full_quality() {
    let compressor = BoundedQualityCompressor::new(StandardCodec::default());
    let outcome = compressor.compress(noisy(64, 64), &QualitySearch::with_max_bytes(10 * 1024 * 1024));

    assert!(outcome.is_compressed());
    assert_eq!(outcome.attempts().len(), 1);
    assert_eq!(outcome.final_quality(), Some(100));
    assert_eq!(outcome.image().dimensions(), (64, 64));
}

#[test]
fn unreachable_budget_walks_down_to_the_floor() {
    let compressor = BoundedQualityCompressor::new(StandardCodec::default());
    let outcome = compressor.compress(noisy(96, 96), &QualitySearch::with_max_bytes(10));

    let qualities: Vec<u8> = outcome.attempts().iter().map(|a| a.quality).collect();
    assert_eq!(qualities, vec![100, 90, 80, 70, 60, 50, 40, 30, 20, 10, 1]);
    assert!(matches!(outcome, QualityOutcome::BudgetNotMet { .. }));
    assert!(outcome.encoded().unwrap().len() > 10);
    assert_eq!(outcome.image().format(), PixelFormat::Rgb888);
}

#[test]
fn reachable_budget_shrinks_output() {
    let compressor = BoundedQualityCompressor::new(StandardCodec::default());
    let image = noisy(128, 128);
    let full = StandardCodec::default()
        .encode(&image, EncodeFormat::Jpeg, Quality::MAX)
        .unwrap();
    let budget = (full.len() / 3) as u64;

    let outcome = compressor.compress(image, &QualitySearch::with_max_bytes(budget));

    assert!(outcome.is_compressed());
    assert!(outcome.encoded().unwrap().len() as u64 <= budget);
    let lens: Vec<usize> = outcome.attempts().iter().map(|a| a.encoded_len).collect();
    assert!(lens.len() > 1);
    assert!(lens[..lens.len() - 1].iter().all(|&len| len as u64 > budget));
}

#[test]
fn encode_failure_returns_the_original() {
    let compressor = BoundedQualityCompressor::new(StandardCodec::default());
    // Wider than a JPEG frame may be
    let image = RasterImage::filled(70_000, 1, PixelFormat::Rgb888, [10, 20, 30, 255]).unwrap();

    let outcome = compressor.compress(image.clone(), &QualitySearch::with_max_bytes(10));

    assert!(matches!(outcome, QualityOutcome::Unchanged { .. }));
    assert_eq!(outcome.into_image(), image);
}

#[test]
fn portrait_boundary_at_twice_the_target_height() {
    let compressor = DimensionalCompressor::new(StandardCodec::default());
    let options = DimensionalOptions::default();

    let short = RasterImage::filled(100, 2559, PixelFormat::Rgb888, [200, 100, 50, 255]).unwrap();
    let outcome = compressor.compress(short, &options);
    assert_eq!(outcome.sample_size(), Some(SampleSize::ONE));
    assert_eq!(outcome.image().dimensions(), (100, 2559));
    assert_eq!(outcome.image().format(), PixelFormat::Rgb565);

    let tall = RasterImage::filled(100, 2560, PixelFormat::Rgb888, [200, 100, 50, 255]).unwrap();
    let outcome = compressor.compress(tall, &options);
    assert_eq!(outcome.sample_size().map(SampleSize::get), Some(2));
    assert_eq!(outcome.image().dimensions(), (50, 1280));
}

#[test]
fn portrait_under_twice_target_is_not_scaled() {
    let compressor = DimensionalCompressor::new(StandardCodec::default());
    let source = RasterImage::filled(1000, 2000, PixelFormat::Argb8888, [0, 0, 255, 255]).unwrap();

    let outcome = compressor.compress(source, &DimensionalOptions::default());

    assert_eq!(outcome.sample_size(), Some(SampleSize::ONE));
    assert_eq!(outcome.image().dimensions(), (1000, 2000));
}

#[test]
fn wide_landscape_uses_width_divisor() {
    let compressor = DimensionalCompressor::new(StandardCodec::default());
    let source = RasterImage::filled(3000, 1000, PixelFormat::Rgb888, [255, 0, 0, 255]).unwrap();

    let outcome = compressor.compress(source, &DimensionalOptions::default());

    assert_eq!(outcome.sample_size().map(SampleSize::get), Some(4));
    assert_eq!(outcome.image().dimensions(), (750, 250));
    // Pure red survives the 565 packing
    assert_eq!(outcome.image().pixel_rgba(10, 10), Some([255, 0, 0, 255]));
}

#[test]
fn explicit_sample_size_wins() {
    let compressor = DimensionalCompressor::new(StandardCodec::default());
    let options = DimensionalOptions {
        sample_size: SampleSize::new(3).unwrap(),
        pixel_format: PixelFormat::Rgb888,
        ..DimensionalOptions::default()
    };

    let outcome = compressor.compress(noisy(30, 12), &options);

    assert!(matches!(outcome, ResampleOutcome::Resampled { .. }));
    assert_eq!(outcome.image().dimensions(), (10, 4));
    assert_eq!(outcome.image().format(), PixelFormat::Rgb888);
}

#[test]
fn empty_source_is_returned_unchanged() {
    let compressor = DimensionalCompressor::new(StandardCodec::default());
    let empty = RasterImage::from_raw(0, 0, PixelFormat::Rgb888, Vec::new()).unwrap();

    let outcome = compressor.compress(empty.clone(), &DimensionalOptions::default());

    assert!(!outcome.is_resampled());
    assert_eq!(outcome.into_image(), empty);
}

use std::fs;

use raster_press::file_ops::{compress_file, load_image, save_png};
use raster_press::{DecodeBudget, PixelFormat, PressError, QualitySearch, RasterImage};

#[test]
fn save_png_replaces_existing_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let first = RasterImage::filled(6, 4, PixelFormat::Argb8888, [1, 2, 3, 255]).unwrap();
    let second = RasterImage::filled(3, 2, PixelFormat::Argb8888, [9, 8, 7, 255]).unwrap();

    let path = save_png(&first, dir.path(), "shot.png").unwrap();
    assert_eq!(path, dir.path().join("shot.png"));
    save_png(&second, dir.path(), "shot.png").unwrap();

    let loaded = load_image(&path, &DecodeBudget::unbounded(), PixelFormat::Argb8888).unwrap();
    assert_eq!(loaded, second);
}

#[test]
fn save_png_creates_missing_directory() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let nested = dir.path().join("a").join("b");
    let image = RasterImage::filled(2, 2, PixelFormat::Rgb888, [0, 0, 0, 255]).unwrap();

    let path = save_png(&image, &nested, "out.png").unwrap();
    assert!(path.is_file());
}

#[test]
fn load_image_honours_pixel_budget() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let image = RasterImage::filled(400, 300, PixelFormat::Rgb888, [50, 60, 70, 255]).unwrap();
    let path = save_png(&image, dir.path(), "big.png").unwrap();

    // sqrt(120000 / 10000) = 3.46 -> 4
    let loaded = load_image(&path, &DecodeBudget::max_pixels(10_000), PixelFormat::Rgb888).unwrap();
    assert_eq!(loaded.dimensions(), (100, 75));
}

#[test]
fn compress_file_writes_jpeg_within_budget() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let image = RasterImage::filled(64, 64, PixelFormat::Rgb888, [120, 30, 200, 255]).unwrap();
    let input = save_png(&image, dir.path(), "in.png").unwrap();
    let output = dir.path().join("nested").join("out.jpg");

    let outcome = compress_file(&input, &output, &QualitySearch::with_max_bytes(64 * 1024)).unwrap();

    assert!(outcome.is_compressed());
    let written = fs::read(&output).unwrap();
    assert_eq!(&written[..2], &[0xFF, 0xD8]);
    assert!(written.len() <= 64 * 1024);
}

#[test]
fn missing_input_is_a_load_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let err = load_image(
        &dir.path().join("none.png"),
        &DecodeBudget::unbounded(),
        PixelFormat::Rgb888,
    )
    .unwrap_err();
    assert!(matches!(err, PressError::Load(_)));
}

//! Raster press CLI
//!
//! Command-line interface for sample-size planning, size-bounded compression,
//! dimensional shrinking and watermarking.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use raster_press::file_ops::{compress_file, load_image, resample_file, save_png_to};
use raster_press::{
    compute_sample_size, Anchor, Compositor, DecodeBudget, DimensionalOptions, DisplayDensity,
    EncodeFormat, ImageCodec, Insets, PixelFormat, Quality, QualityOutcome, QualitySearch,
    ResampleOutcome, SampleSize, StandardCodec, TextStyle, WatermarkScale,
};

/// Compress and watermark raster images
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the decode sample size for an image under a budget
    SampleSize {
        /// Input image file path
        input: PathBuf,

        /// Maximum decoded pixel count (-1 for unbounded)
        #[arg(long, default_value = "-1", allow_hyphen_values = true)]
        max_pixels: i64,

        /// Minimum decoded side length (-1 for unbounded)
        #[arg(long, default_value = "-1", allow_hyphen_values = true)]
        min_side: i32,
    },

    /// Lower JPEG quality until the file fits a byte budget
    Compress {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Byte budget for the output
        #[arg(short, long, default_value = "102400")]
        max_bytes: u64,

        /// Quality floor (1-100)
        #[arg(long, default_value = "1")]
        min_quality: u8,

        /// Quality drop per retry
        #[arg(long, default_value = "10")]
        step: u8,
    },

    /// Shrink by sample size and pixel format, writing PNG
    Shrink {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Decode divisor; 1 derives one from the target bounds
        #[arg(short, long, default_value = "1")]
        sample_size: u32,

        /// Pixel format of the result (rgb888, argb8888, rgb565)
        #[arg(short = 'f', long, default_value = "rgb565")]
        pixel_format: String,

        #[arg(long, default_value = "720")]
        target_width: u32,

        #[arg(long, default_value = "1280")]
        target_height: u32,
    },

    /// Place a watermark image on a base image, writing PNG
    Watermark {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        watermark: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// top-left, top-right, bottom-left, bottom-right, center, center-bottom
        #[arg(short, long, default_value = "bottom-right")]
        anchor: String,

        /// Padding in dp
        #[arg(short, long, default_value = "0")]
        padding: f32,

        /// Screen density (pixels per dp)
        #[arg(short, long, default_value = "1.0")]
        density: f32,

        /// Screen dots per inch; overrides --density
        #[arg(long)]
        dpi: Option<f32>,

        /// Keep the watermark's own size instead of stretching it to a band
        #[arg(long)]
        keep_size: bool,
    },

    /// Draw text on a base image, writing PNG
    Text {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        text: String,

        #[arg(short, long, default_value = "bottom-right")]
        anchor: String,

        /// Font size in sp
        #[arg(long, default_value = "16")]
        size: f32,

        /// Color as AARRGGBB hex
        #[arg(long, default_value = "FFFFFFFF")]
        color: String,

        /// Padding in dp
        #[arg(short, long, default_value = "0")]
        padding: f32,

        /// Screen density (pixels per dp)
        #[arg(short, long, default_value = "1.0")]
        density: f32,

        /// Screen dots per inch; overrides --density
        #[arg(long)]
        dpi: Option<f32>,

        /// User font scale applied to the font size
        #[arg(long, default_value = "1.0")]
        font_scale: f32,
    },
}

fn screen_density(density: f32, dpi: Option<f32>, font_scale: f32) -> DisplayDensity {
    let density = dpi.map(|dpi| DisplayDensity::from_dpi(dpi).density).unwrap_or(density);
    DisplayDensity::with_font_scale(density, font_scale)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn report_quality(outcome: &QualityOutcome, output: &Path) {
    for attempt in outcome.attempts() {
        log::debug!("  quality {:>3}: {} bytes", attempt.quality, attempt.encoded_len);
    }
    match outcome {
        QualityOutcome::Compressed { encoded, .. } => println!(
            "Compressed at quality {} to {} bytes",
            outcome.final_quality().unwrap_or(100),
            encoded.len()
        ),
        QualityOutcome::BudgetNotMet { encoded, .. } => println!(
            "Budget not met; best effort at quality {} is {} bytes",
            outcome.final_quality().unwrap_or(1),
            encoded.len()
        ),
        QualityOutcome::Unchanged { reason, .. } => {
            println!("Left unchanged: {}", reason)
        }
    }
    println!("Output saved to: {:?}", output);
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::SampleSize {
            input,
            max_pixels,
            min_side,
        } => {
            let budget = DecodeBudget::from_signed(max_pixels, min_side)?;
            let bytes = std::fs::read(&input)?;
            let (width, height) = StandardCodec::default().decode_bounds(&bytes)?;
            let sample_size = compute_sample_size(width, height, &budget)?;
            println!(
                "{}x{} -> sample size {} ({}x{})",
                width,
                height,
                sample_size,
                width / sample_size.get(),
                height / sample_size.get()
            );
        }

        Command::Compress {
            input,
            output,
            max_bytes,
            min_quality,
            step,
        } => {
            let search = QualitySearch {
                max_bytes,
                step,
                floor: Quality::new(min_quality)?,
                format: EncodeFormat::Jpeg,
                ..QualitySearch::default()
            };
            let outcome = compress_file(&input, &output, &search)?;
            report_quality(&outcome, &output);
        }

        Command::Shrink {
            input,
            output,
            sample_size,
            pixel_format,
            target_width,
            target_height,
        } => {
            let options = DimensionalOptions {
                sample_size: SampleSize::new(sample_size)
                    .ok_or_else(|| anyhow::anyhow!("sample size must be at least 1"))?,
                pixel_format: PixelFormat::parse(&pixel_format)?,
                target_width,
                target_height,
            };
            match resample_file(&input, &output, &options)? {
                ResampleOutcome::Resampled { image, sample_size } => println!(
                    "Resampled with divisor {} to {}x{} {:?}",
                    sample_size,
                    image.width(),
                    image.height(),
                    image.format()
                ),
                ResampleOutcome::Unchanged { reason, .. } => println!("Left unchanged: {}", reason),
            }
            println!("Output saved to: {:?}", output);
        }

        Command::Watermark {
            input,
            watermark,
            output,
            anchor,
            padding,
            density,
            dpi,
            keep_size,
        } => {
            let anchor = Anchor::parse(&anchor)?;
            let base = load_image(&input, &DecodeBudget::unbounded(), PixelFormat::Argb8888)?;
            let mark = load_image(&watermark, &DecodeBudget::unbounded(), PixelFormat::Argb8888)?;
            let scale = if keep_size {
                WatermarkScale::Original
            } else {
                WatermarkScale::FitBand
            };
            let compositor =
                Compositor::new(screen_density(density, dpi, 1.0)).watermark_scale(scale);

            let composed = compositor
                .place_watermark(Some(&base), Some(&mark), anchor, &Insets::uniform(padding))
                .ok_or_else(|| anyhow::anyhow!("nothing to compose"))?;
            save_png_to(&composed, &output)?;
            println!("Output saved to: {:?}", output);
        }

        Command::Text {
            input,
            output,
            text,
            anchor,
            size,
            color,
            padding,
            density,
            dpi,
            font_scale,
        } => {
            let anchor = Anchor::parse(&anchor)?;
            let color = u32::from_str_radix(color.trim_start_matches('#'), 16)?;
            let base = load_image(&input, &DecodeBudget::unbounded(), PixelFormat::Argb8888)?;
            let compositor = Compositor::new(screen_density(density, dpi, font_scale));

            let composed = compositor
                .draw_text(
                    Some(&base),
                    Some(&text),
                    &TextStyle { size, color },
                    anchor,
                    &Insets::uniform(padding),
                )
                .ok_or_else(|| anyhow::anyhow!("nothing to compose"))?;
            save_png_to(&composed, &output)?;
            println!("Output saved to: {:?}", output);
        }
    }

    Ok(())
}

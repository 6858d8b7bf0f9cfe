//! Exact 4K conversion.
//!
//! decode → normalize color mode → Lanczos3 resample to 3840x2160 → JPEG q95
//! with optimized Huffman tables → temp file in the destination directory →
//! rename into place.
//!
//! The aspect ratio is not preserved: every source is stretched to fill the
//! frame exactly.

use crate::app_error::{AppError, Result};
use crate::config::{JPEG_QUALITY, TARGET_HEIGHT, TARGET_WIDTH};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat, ImageReader, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::{debug, info, warn};

pub const TARGET_SIZE_LABEL: &str = "3840x2160";

/// What the source looked like before conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// `"WxH"` of the source.
    pub original_size: String,
    /// Always `"3840x2160"`.
    pub new_size: String,
    pub original_format: String,
    pub original_mode: String,
    #[serde(skip)]
    pub dimensions: (u32, u32),
}

impl ImageMetadata {
    fn describe(image: &DynamicImage, format: Option<ImageFormat>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            original_size: format!("{}x{}", width, height),
            new_size: TARGET_SIZE_LABEL.to_string(),
            original_format: format_label(format).to_string(),
            original_mode: color_mode_label(image.color()).to_string(),
            dimensions: (width, height),
        }
    }
}

pub fn format_label(format: Option<ImageFormat>) -> &'static str {
    match format {
        Some(ImageFormat::Png) => "PNG",
        Some(ImageFormat::Jpeg) => "JPEG",
        Some(ImageFormat::WebP) => "WEBP",
        Some(ImageFormat::Bmp) => "BMP",
        Some(ImageFormat::Tiff) => "TIFF",
        Some(ImageFormat::Gif) => "GIF",
        Some(_) => "OTHER",
        None => "UNKNOWN",
    }
}

/// Conventional short names for channel layouts (`L`, `RGB`, `RGBA`, ...).
pub fn color_mode_label(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGBF",
        ColorType::Rgba32F => "RGBAF",
        _ => "UNKNOWN",
    }
}

/// Flattens alpha onto opaque white using alpha as the mask.
pub fn composite_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut flat = RgbImage::new(width, height);

    for (src, dst) in rgba.pixels().zip(flat.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *dst = Rgb([blend(r), blend(g), blend(b)]);
    }

    flat
}

/// Alpha modes are composited onto white, 8-bit `L` and `RGB` pass through,
/// every other layout is converted to 8-bit `RGB`.
pub fn normalize_color_mode(image: DynamicImage) -> DynamicImage {
    let color = image.color();
    if color.has_alpha() {
        return DynamicImage::ImageRgb8(composite_on_white(&image));
    }
    match color {
        ColorType::L8 | ColorType::Rgb8 => image,
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

pub fn resize_exact_4k(image: &DynamicImage) -> DynamicImage {
    image.resize_exact(TARGET_WIDTH, TARGET_HEIGHT, FilterType::Lanczos3)
}

/// Encodes a normalized frame. Grayscale stays single channel.
pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    let width = u16::try_from(width)
        .map_err(|_| AppError::Encode(format!("width {} exceeds JPEG limits", width)))?;
    let height = u16::try_from(height)
        .map_err(|_| AppError::Encode(format!("height {} exceeds JPEG limits", height)))?;

    let mut encoded = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut encoded, JPEG_QUALITY);
    encoder.set_optimized_huffman_tables(true);

    match image {
        DynamicImage::ImageLuma8(gray) => {
            encoder.encode(gray.as_raw(), width, height, jpeg_encoder::ColorType::Luma)?
        }
        other => {
            let rgb = other.to_rgb8();
            encoder.encode(rgb.as_raw(), width, height, jpeg_encoder::ColorType::Rgb)?
        }
    }

    Ok(encoded)
}

/// A decoded source, described but not yet converted.
pub struct SourceImage {
    image: DynamicImage,
    pub metadata: ImageMetadata,
}

impl SourceImage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| AppError::Decode(image::ImageError::IoError(e)))?;
        let format = reader.format();
        let image = reader.decode()?;
        let metadata = ImageMetadata::describe(&image, format);
        Ok(Self { image, metadata })
    }

    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| AppError::io(path, e))?;
        Self::from_bytes(&bytes)
    }

    /// Normalize, resample and encode. Returns the JPEG and the source metadata.
    pub fn render(self) -> Result<(Vec<u8>, ImageMetadata)> {
        let normalized = normalize_color_mode(self.image);
        let resized = resize_exact_4k(&normalized);
        let encoded = encode_jpeg(&resized)?;

        debug!(
            original_size = %self.metadata.original_size,
            original_mode = %self.metadata.original_mode,
            encoded_bytes = encoded.len(),
            "Converted frame to 4K"
        );
        Ok((encoded, self.metadata))
    }

    /// Renders and atomically writes the JPEG to `output`.
    pub fn save_4k(self, output: &Path) -> Result<ImageMetadata> {
        let (encoded, metadata) = self.render()?;
        write_atomically(output, &encoded)?;

        info!(
            output = %output.display(),
            original_size = %metadata.original_size,
            original_format = %metadata.original_format,
            "Saved 4K output"
        );
        Ok(metadata)
    }
}

/// Runs the whole pipeline in memory.
pub fn convert_image_bytes(bytes: &[u8]) -> Result<(Vec<u8>, ImageMetadata)> {
    SourceImage::from_bytes(bytes)?.render()
}

/// Reads `source`, converts it and atomically writes the JPEG to `output`.
pub fn convert_to_4k(source: &Path, output: &Path) -> Result<ImageMetadata> {
    debug!(source = %source.display(), "Converting");
    SourceImage::open(source)?.save_4k(output)
}

/// Writes to a dot-prefixed temp file next to `dest`, then renames it over
/// `dest`. Readers never see a partially written output.
pub fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".partial-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| AppError::io(dir, e))?;
    temp.write_all(bytes).map_err(|e| AppError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| AppError::io(temp.path(), e))?;

    if dest.exists() {
        warn!(output = %dest.display(), "Replacing existing output");
    }
    temp.persist(dest).map_err(|e| AppError::io(dest, e.error))?;
    Ok(())
}

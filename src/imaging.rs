//! Image helpers shared by the generation and tagging providers.

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::GenericImageView;
use std::io::Cursor;
use std::path::Path;

/// Load an image, shrink it so neither side exceeds `max_dimension`,
/// re-encode as JPEG and return the base64 payload with its MIME type.
pub fn load_and_encode_image(image_path: &Path, max_dimension: u32) -> Result<(String, &'static str)> {
    let img = image::open(image_path)
        .map_err(|e| anyhow!("Failed to open image {}: {}", image_path.display(), e))?;

    let (width, height) = img.dimensions();
    let img = if width > max_dimension || height > max_dimension {
        img.resize(max_dimension, max_dimension, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel
    let img = image::DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, 85);
    img.write_with_encoder(encoder)
        .map_err(|e| anyhow!("Failed to encode image as JPEG: {}", e))?;

    Ok((BASE64.encode(buf.into_inner()), "image/jpeg"))
}

/// Data URL form used by OpenAI-style vision and edit endpoints.
pub fn encode_data_url(image_path: &Path, max_dimension: u32) -> Result<String> {
    let (payload, mime_type) = load_and_encode_image(image_path, max_dimension)?;
    Ok(format!("data:{};base64,{}", mime_type, payload))
}

/// File extension for raw image bytes, sniffed from their magic number.
pub fn extension_for(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("bin")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use tempfile::tempdir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([200, 180, 160, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("room.png");
        std::fs::write(&path, png_bytes(400, 200)).unwrap();

        let (payload, mime) = load_and_encode_image(&path, 100).unwrap();
        assert_eq!(mime, "image/jpeg");

        let decoded = image::load_from_memory(&BASE64.decode(payload).unwrap()).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));
    }

    #[test]
    fn test_missing_file_errors() {
        let dir = tempdir().unwrap();
        assert!(load_and_encode_image(&dir.path().join("nope.jpg"), 100).is_err());
    }

    #[test]
    fn test_extension_sniffing() {
        assert_eq!(extension_for(&png_bytes(2, 2)), "png");
        assert_eq!(extension_for(b"not an image"), "bin");
    }
}

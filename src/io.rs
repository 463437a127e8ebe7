//! Image plumbing between disk, pixels, and the wire.
//!
//! Uploads keep the original file bytes base64-encoded (that is what the API
//! receives), alongside a decoded RGBA copy for previews. Generated results
//! arrive as base64 payloads and are written back out verbatim on download.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::RgbaImage;
use image::codecs::png::PngEncoder;
use rfd::FileDialog;

use crate::api::types::InlineImage;

/// Extensions accepted by the upload pickers.
pub const UPLOAD_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

/// An uploaded reference image: wire payload plus decoded preview pixels.
pub struct SourceImage {
    pub encoded: InlineImage,
    pub pixels: RgbaImage,
}

/// MIME type for a file extension; unknown extensions fall back to PNG.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/png",
    }
}

/// File extension for a MIME type ("image/webp" -> "webp").
pub fn extension_for_mime(mime: &str) -> &str {
    let ext = mime.split('/').nth(1).unwrap_or("png");
    if ext.is_empty() { "png" } else { ext }
}

pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Default download name: `generated-image-<unix-millis>.<ext>`.
pub fn download_file_name(mime: &str) -> String {
    format!("generated-image-{}.{}", unix_millis(), extension_for_mime(mime))
}

/// Load an upload from disk: original bytes go to the wire payload, decoded
/// pixels to the preview.
pub fn load_source_image(path: &Path) -> Result<SourceImage, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let pixels = image::load_from_memory(&bytes)
        .map_err(|e| e.to_string())?
        .to_rgba8();
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("png");
    Ok(SourceImage {
        encoded: InlineImage {
            data: BASE64.encode(&bytes),
            mime_type: mime_for_extension(ext).to_string(),
        },
        pixels,
    })
}

/// Decode a wire payload into pixels.
pub fn decode_inline(image: &InlineImage) -> Result<RgbaImage, String> {
    let bytes = BASE64.decode(&image.data).map_err(|e| e.to_string())?;
    Ok(image::load_from_memory(&bytes)
        .map_err(|e| e.to_string())?
        .to_rgba8())
}

/// Encode pixels as a PNG wire payload (inpainting references must keep
/// their alpha channel, so PNG always).
pub fn encode_png(image: &RgbaImage) -> Result<InlineImage, String> {
    Ok(InlineImage {
        data: BASE64.encode(png_bytes(image)?),
        mime_type: "image/png".to_string(),
    })
}

/// PNG-encode an RGBA image to memory.
pub fn png_bytes(image: &RgbaImage) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    let encoder = PngEncoder::new(&mut out);
    #[allow(deprecated)]
    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|e| e.to_string())?;
    Ok(out)
}

/// Write a wire payload to disk exactly as received.
pub fn save_inline_to(path: &Path, image: &InlineImage) -> Result<(), String> {
    let bytes = BASE64.decode(&image.data).map_err(|e| e.to_string())?;
    std::fs::write(path, bytes).map_err(|e| e.to_string())
}

/// Native open dialog for reference uploads.
pub fn pick_image_file() -> Option<PathBuf> {
    FileDialog::new()
        .add_filter("Images", UPLOAD_EXTENSIONS)
        .add_filter("All Files", &["*"])
        .pick_file()
}

/// Native save dialog pre-filled with the download name for `mime`.
pub fn pick_download_path(mime: &str) -> Option<PathBuf> {
    FileDialog::new()
        .set_file_name(download_file_name(mime))
        .add_filter("Images", UPLOAD_EXTENSIONS)
        .save_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn mime_mapping_is_symmetric_for_supported_formats() {
        assert_eq!(mime_for_extension("PNG"), "image/png");
        assert_eq!(mime_for_extension("jpeg"), "image/jpeg");
        assert_eq!(extension_for_mime("image/webp"), "webp");
        assert_eq!(extension_for_mime("nonsense"), "png");
    }

    #[test]
    fn download_name_has_timestamp_and_extension() {
        let name = download_file_name("image/jpeg");
        assert!(name.starts_with("generated-image-"));
        assert!(name.ends_with(".jpeg"));
        let stamp = &name["generated-image-".len()..name.len() - ".jpeg".len()];
        assert!(stamp.parse::<u128>().is_ok());
    }

    #[test]
    fn png_payload_survives_decode() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 1, Rgba([200, 100, 50, 0]));

        let encoded = encode_png(&img).unwrap();
        assert_eq!(encoded.mime_type, "image/png");

        let decoded = decode_inline(&encoded).unwrap();
        assert_eq!(decoded, img);
    }
}

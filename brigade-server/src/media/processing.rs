//! Upload validation and JPEG normalization

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use sha2::{Digest, Sha256};
use shared::error::{AppError, ErrorCode};
use std::io::Cursor;

/// Maximum upload size (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

pub const JPEG_QUALITY: u8 = 85;

/// Longest edge after downscaling
pub const MAX_DIMENSION: u32 = 2048;

/// Normalized upload ready for storage
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`
    pub hash: String,
    pub width: u32,
    pub height: u32,
}

/// Storage key for a processed image
pub fn image_key(restaurant_id: i64, hash: &str) -> String {
    format!("{restaurant_id}/{hash}.jpg")
}

fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Lowercased extension from the file name, else from the declared content type
fn detect_extension(filename: Option<&str>, content_type: Option<&str>) -> String {
    let from_name = filename
        .and_then(|f| std::path::Path::new(f).extension())
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    if let Some(ext) = from_name {
        return ext;
    }
    content_type
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|exts| exts.iter().find(|e| SUPPORTED_FORMATS.contains(*e)))
        .map(|e| e.to_string())
        .unwrap_or_default()
}

fn compress(img: &DynamicImage) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        img.to_rgb8().write_with_encoder(encoder).map_err(|e| {
            AppError::with_message(
                ErrorCode::ImageProcessingFailed,
                format!("Image compression failed: {e}"),
            )
        })?;
    }
    Ok(buffer)
}

/// Validate an upload and re-encode it as JPEG with the long edge capped
pub fn process_upload(
    data: &[u8],
    filename: Option<&str>,
    content_type: Option<&str>,
) -> Result<ProcessedImage, AppError> {
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!(
                "File too large: {} bytes (max {}MB)",
                data.len(),
                MAX_FILE_SIZE / 1024 / 1024
            ),
        ));
    }

    let ext = detect_extension(filename, content_type);
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!(
                "Unsupported format '{ext}'. Supported: {}",
                SUPPORTED_FORMATS.join(", ")
            ),
        ));
    }

    let mut img = image::load_from_memory(data).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
    })?;
    if img.width().max(img.height()) > MAX_DIMENSION {
        img = img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Triangle);
    }

    let bytes = compress(&img)?;
    Ok(ProcessedImage {
        hash: calculate_hash(&bytes),
        width: img.width(),
        height: img.height(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn converts_png_to_jpeg() {
        let processed = process_upload(&png(16, 8), Some("photo.PNG"), None).unwrap();
        assert_eq!(&processed.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!((processed.width, processed.height), (16, 8));
        assert_eq!(processed.hash.len(), 64);
    }

    #[test]
    fn identical_uploads_share_a_hash() {
        let a = process_upload(&png(10, 10), Some("a.png"), None).unwrap();
        let b = process_upload(&png(10, 10), Some("b.png"), None).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(image_key(7, &a.hash), format!("7/{}.jpg", a.hash));
    }

    #[test]
    fn caps_long_edge() {
        let processed = process_upload(&png(2100, 1050), Some("wide.png"), None).unwrap();
        assert_eq!(processed.width, MAX_DIMENSION);
        assert_eq!(processed.height, 1024);
    }

    #[test]
    fn extension_from_content_type() {
        assert!(process_upload(&png(4, 4), None, Some("image/png")).is_ok());
        let ext = detect_extension(None, Some("image/jpeg"));
        assert!(ext == "jpg" || ext == "jpeg", "{ext}");
        assert_eq!(detect_extension(Some("scan.WEBP"), Some("image/png")), "webp");
    }

    #[test]
    fn rejects_bad_uploads() {
        assert_eq!(
            process_upload(&[], Some("a.png"), None).unwrap_err().code,
            ErrorCode::EmptyFile
        );
        assert_eq!(
            process_upload(&png(4, 4), Some("a.gif"), None).unwrap_err().code,
            ErrorCode::UnsupportedFileFormat
        );
        assert_eq!(
            process_upload(b"not an image", Some("a.jpg"), None)
                .unwrap_err()
                .code,
            ErrorCode::InvalidImageFile
        );
        let huge = vec![0u8; MAX_FILE_SIZE + 1];
        assert_eq!(
            process_upload(&huge, Some("a.jpg"), None).unwrap_err().code,
            ErrorCode::FileTooLarge
        );
    }
}

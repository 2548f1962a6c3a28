use crate::domain::model::ImageStats;
use crate::utils::error::{Result, SysKitError};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{ImageFormat, ImageReader};
use std::fs;
use std::io::BufWriter;
use std::path::Path;

/// Re-encode an image in place to shrink it. JPEG honors `quality` (1-100),
/// PNG maps quality to a compression level, WebP is re-encoded lossless (the
/// encoder has no lossy mode). Format is detected from content, not the
/// extension.
pub fn optimize(path: &Path, quality: u8) -> Result<ImageStats> {
    if !path.exists() {
        return Err(SysKitError::InvalidPathError {
            path: path.display().to_string(),
            reason: "file not found".to_string(),
        });
    }

    let bytes_before = fs::metadata(path)?.len();
    let quality = quality.clamp(1, 100);

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| SysKitError::UnsupportedImageError {
            path: path.display().to_string(),
        })?;
    // Fully decoded before the output truncates the source file.
    let img = reader.decode()?;

    match format {
        ImageFormat::Jpeg => {
            let mut out = BufWriter::new(fs::File::create(path)?);
            let encoder = JpegEncoder::new_with_quality(&mut out, quality);
            img.write_with_encoder(encoder)?;
        }
        ImageFormat::Png => {
            let compression = if quality >= 70 {
                CompressionType::Fast
            } else if quality >= 40 {
                CompressionType::Default
            } else {
                CompressionType::Best
            };
            let mut out = BufWriter::new(fs::File::create(path)?);
            let encoder = PngEncoder::new_with_quality(&mut out, compression, FilterType::Adaptive);
            img.write_with_encoder(encoder)?;
        }
        ImageFormat::WebP => {
            let mut out = BufWriter::new(fs::File::create(path)?);
            let encoder = WebPEncoder::new_lossless(&mut out);
            img.write_with_encoder(encoder)?;
        }
        _ => {
            return Err(SysKitError::UnsupportedImageError {
                path: path.display().to_string(),
            })
        }
    }

    let bytes_after = fs::metadata(path)?.len();
    tracing::debug!(
        "Re-encoded {}: {} -> {} bytes",
        path.display(),
        bytes_before,
        bytes_after
    );
    Ok(ImageStats {
        bytes_before,
        bytes_after,
    })
}

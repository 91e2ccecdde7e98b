// SPDX-License-Identifier: MPL-2.0
//! Writing composited images to disk and to clipboard buffers.
//!
//! Overwriting an existing file always goes through a temporary sibling file
//! so the original survives any encoder or disk failure.

use crate::config::defaults::{EDITED_COUNTER_START, TEMP_FILE_PREFIX};
use crate::error::{Error, Result, TransformError};
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::{DynamicImage, ImageFormat, RgbaImage};
use std::fs;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveFormat {
    Jpeg,
    Png,
    Bmp,
    Gif,
    Tiff,
    WebP,
    Ico,
}

impl SaveFormat {
    /// Detects the format from a file extension (case-insensitive).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "jfif" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            "tiff" | "tif" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            "ico" => Some(Self::Ico),
            _ => None,
        }
    }

    /// Detects the format from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::UnsupportedFormat`] for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(ext)
            .ok_or_else(|| TransformError::UnsupportedFormat(ext.to_string()).into())
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
            Self::Tiff => ImageFormat::Tiff,
            Self::WebP => ImageFormat::WebP,
            Self::Ico => ImageFormat::Ico,
        }
    }

    /// Whether a file without overlays is written as 24-bit color.
    #[must_use]
    pub fn prefers_opaque(self) -> bool {
        matches!(self, Self::Jpeg | Self::Bmp)
    }
}

/// Encodes `image` into `writer`.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
///
/// # Errors
///
/// Returns [`Error::Composite`] if the encoder rejects the image.
pub fn encode<W: Write + std::io::Seek>(
    image: &DynamicImage,
    format: SaveFormat,
    jpeg_quality: u8,
    writer: &mut W,
) -> Result<()> {
    let result = match format {
        SaveFormat::Jpeg => {
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut *writer, jpeg_quality).encode_image(&rgb)
        }
        _ => image.write_to(writer, format.image_format()),
    };
    result.map_err(|e| Error::Composite(format!("failed to encode {format:?}: {e}")))
}

/// Writes `image` to `path`, replacing any existing file only after the new
/// content was fully written.
///
/// # Errors
///
/// Returns an error if the format is unsupported, encoding fails or the file
/// cannot be written. The previous file is left untouched in every case.
pub fn save_image(image: &DynamicImage, path: &Path, jpeg_quality: u8) -> Result<()> {
    let format = SaveFormat::from_path(path)?;
    let temp = temp_path_for(path);

    if let Err(err) = write_file(image, &temp, format, jpeg_quality) {
        let _ = fs::remove_file(&temp);
        return Err(err);
    }
    if let Err(err) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(err.into());
    }
    log::info!("Saved {}", path.display());
    Ok(())
}

fn write_file(image: &DynamicImage, path: &Path, format: SaveFormat, quality: u8) -> Result<()> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode(image, format, quality, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Staging path used while overwriting `path`: `~temp_<name>` in the same folder.
#[must_use]
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{TEMP_FILE_PREFIX}{name}"))
}

/// First free `<stem><suffix>.<ext>`, `<stem><suffix>2.<ext>`, ... next to `original`.
#[must_use]
pub fn edited_copy_path(original: &Path, suffix: &str) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let first = original.with_file_name(format!("{stem}{suffix}{ext}"));
    if !first.exists() {
        return first;
    }
    (EDITED_COUNTER_START..)
        .map(|n| original.with_file_name(format!("{stem}{suffix}{n}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

// ==========================================================================
// Clipboard buffers
// ==========================================================================

/// Clipboard payload kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipboardFormat {
    /// Device-independent bitmap: header followed by bottom-up BGRA rows.
    #[default]
    Dib,
    /// PNG-encoded bytes.
    Png,
}

/// Size of the `BITMAPINFOHEADER` that starts a DIB.
pub const DIB_HEADER_SIZE: usize = 40;

/// Builds a 32-bit DIB from straight-alpha BGRA rows stored top-down.
///
/// # Errors
///
/// Returns [`Error::Composite`] if the buffer length does not match the
/// dimensions or the dimensions overflow the header fields.
pub fn dib_from_bgra(width: u32, height: u32, bgra: &[u8]) -> Result<Vec<u8>> {
    let row_len = width as usize * 4;
    if bgra.len() != row_len * height as usize {
        return Err(Error::Composite(format!(
            "BGRA buffer of {} bytes does not match {width}x{height}",
            bgra.len()
        )));
    }
    let too_large = || Error::Composite(format!("{width}x{height} is too large for a DIB"));
    let header_width = i32::try_from(width).map_err(|_| too_large())?;
    let header_height = i32::try_from(height).map_err(|_| too_large())?;
    let image_size = u32::try_from(bgra.len()).map_err(|_| too_large())?;

    let mut dib = Vec::with_capacity(DIB_HEADER_SIZE + bgra.len());
    dib.extend_from_slice(&(DIB_HEADER_SIZE as u32).to_le_bytes());
    dib.extend_from_slice(&header_width.to_le_bytes());
    // Positive height: rows are stored bottom-up
    dib.extend_from_slice(&header_height.to_le_bytes());
    dib.extend_from_slice(&1u16.to_le_bytes()); // planes
    dib.extend_from_slice(&32u16.to_le_bytes()); // bits per pixel
    dib.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    dib.extend_from_slice(&image_size.to_le_bytes());
    dib.extend_from_slice(&0i32.to_le_bytes());
    dib.extend_from_slice(&0i32.to_le_bytes());
    dib.extend_from_slice(&0u32.to_le_bytes());
    dib.extend_from_slice(&0u32.to_le_bytes());

    if row_len > 0 {
        for row in bgra.chunks_exact(row_len).rev() {
            dib.extend_from_slice(row);
        }
    }
    Ok(dib)
}

/// PNG bytes of a straight-alpha RGBA image.
///
/// # Errors
///
/// Returns [`Error::Composite`] if encoding fails.
pub fn png_bytes(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| Error::Composite(format!("failed to encode PNG: {e}")))?;
    Ok(cursor.into_inner())
}

//! Image-cell boundary: pull raw bytes out of a page and sniff their format.
//!
//! Actual pixel decoding is the front end's job; this module only classifies
//! bytes so a caller knows whether a cell is renderable and how to label it.
//! Column-level classification (is this column image-like?) lives in the
//! reader's schema extraction.

use polars::prelude::*;

use crate::error::{ParqError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
    Tiff,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Gif => "GIF",
            ImageFormat::Webp => "WEBP",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Tiff => "TIFF",
        }
    }
}

/// A classified image cell: format, header-derived dimensions when cheap to
/// read, and the raw bytes for the decoder on the other side of the boundary.
#[derive(Debug, Clone)]
pub struct ImageCell {
    pub format: ImageFormat,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Vec<u8>,
}

impl ImageCell {
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Sniff the image format from magic bytes.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(ImageFormat::Webp)
    } else if bytes.starts_with(b"BM") {
        Some(ImageFormat::Bmp)
    } else if bytes.starts_with(b"II*\x00") || bytes.starts_with(b"MM\x00*") {
        Some(ImageFormat::Tiff)
    } else {
        None
    }
}

/// Classify cell bytes; unknown signatures fail with
/// `UnsupportedImageFormat` (recoverable per cell — the rest of the page
/// still renders).
pub fn extract(bytes: &[u8]) -> Result<ImageCell> {
    let format = detect_format(bytes).ok_or(ParqError::UnsupportedImageFormat {
        len: bytes.len(),
    })?;
    let (width, height) = match format {
        ImageFormat::Png => png_dimensions(bytes),
        ImageFormat::Jpeg => jpeg_dimensions(bytes),
        ImageFormat::Gif => gif_dimensions(bytes),
        ImageFormat::Bmp => bmp_dimensions(bytes),
        ImageFormat::Webp | ImageFormat::Tiff => (None, None),
    };
    Ok(ImageCell {
        format,
        width,
        height,
        bytes: bytes.to_vec(),
    })
}

/// Raw bytes of a binary cell in a page frame. `Ok(None)` for a null cell or
/// a non-binary column (the caller renders it as a plain value instead).
pub fn cell_bytes(df: &DataFrame, column: &str, row: usize) -> Result<Option<Vec<u8>>> {
    let col = df.column(column).map_err(|_| ParqError::ColumnNotFound {
        column: column.to_string(),
    })?;
    let series = col.as_materialized_series();
    let series = match series.dtype() {
        DataType::Binary => series.clone(),
        DataType::BinaryOffset => series.cast(&DataType::Binary)?,
        _ => return Ok(None),
    };
    Ok(series.binary()?.get(row).map(|b| b.to_vec()))
}

/// Width/height from the IHDR chunk directly after the PNG signature.
fn png_dimensions(bytes: &[u8]) -> (Option<u32>, Option<u32>) {
    if bytes.len() < 24 {
        return (None, None);
    }
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    (Some(width), Some(height))
}

/// Width/height from the logical screen descriptor (little-endian).
fn gif_dimensions(bytes: &[u8]) -> (Option<u32>, Option<u32>) {
    if bytes.len() < 10 {
        return (None, None);
    }
    let width = u16::from_le_bytes([bytes[6], bytes[7]]) as u32;
    let height = u16::from_le_bytes([bytes[8], bytes[9]]) as u32;
    (Some(width), Some(height))
}

fn bmp_dimensions(bytes: &[u8]) -> (Option<u32>, Option<u32>) {
    if bytes.len() < 26 {
        return (None, None);
    }
    let width = i32::from_le_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]);
    // Height may be negative for top-down bitmaps.
    let height = i32::from_le_bytes([bytes[22], bytes[23], bytes[24], bytes[25]]).unsigned_abs();
    (u32::try_from(width).ok(), Some(height))
}

/// Walk JPEG segments to the first start-of-frame marker.
fn jpeg_dimensions(bytes: &[u8]) -> (Option<u32>, Option<u32>) {
    let mut i = 2usize;
    while i + 9 < bytes.len() {
        if bytes[i] != 0xFF {
            return (None, None);
        }
        let marker = bytes[i + 1];
        // Standalone markers without a length field.
        if (0xD0..=0xD9).contains(&marker) || marker == 0x01 {
            i += 2;
            continue;
        }
        let seg_len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            let height = u16::from_be_bytes([bytes[i + 5], bytes[i + 6]]) as u32;
            let width = u16::from_be_bytes([bytes[i + 7], bytes[i + 8]]) as u32;
            return (Some(width), Some(height));
        }
        if seg_len < 2 {
            return (None, None);
        }
        i += 2 + seg_len;
    }
    (None, None)
}

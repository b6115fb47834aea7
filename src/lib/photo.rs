//! Portrait photo handling.
//!
//! A photo arrives either as raw bytes or as a `data:` URL from the editor.
//! Construction only checks that the payload looks like a supported raster
//! format; full decoding happens in the page renderer, which needs pixels.
//! The preview only ever re-embeds the bytes as a data URL.
//!
//! # Example
//!
//! ```rust
//! use cvforge::photo::{PhotoAsset, PhotoFormat};
//!
//! let png_header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
//! let photo = PhotoAsset::from_bytes(png_header.to_vec()).unwrap();
//! assert_eq!(photo.format(), PhotoFormat::Png);
//! assert!(photo.data_url().starts_with("data:image/png;base64,"));
//! ```

use crate::error::RenderError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;

/// Longest edge, in pixels, of a portrait embedded in a PDF.
const MAX_EMBED_EDGE: u32 = 512;

/// Raster formats accepted for the portrait slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl PhotoFormat {
    /// Detects the format from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<PhotoFormat> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(PhotoFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(PhotoFormat::Jpeg)
        } else if bytes.starts_with(b"GIF8") {
            Some(PhotoFormat::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(PhotoFormat::WebP)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            PhotoFormat::Png => "image/png",
            PhotoFormat::Jpeg => "image/jpeg",
            PhotoFormat::Gif => "image/gif",
            PhotoFormat::WebP => "image/webp",
        }
    }
}

/// A portrait photo supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAsset {
    bytes: Vec<u8>,
    format: PhotoFormat,
}

/// Decoded, square, RGB pixels ready for embedding.
#[derive(Debug, Clone)]
pub struct DecodedPhoto {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples.
    pub rgb: Vec<u8>,
}

impl PhotoAsset {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, RenderError> {
        let format = PhotoFormat::sniff(&bytes)
            .ok_or_else(|| RenderError::photo("bytes", "unrecognized image format"))?;
        Ok(Self { bytes, format })
    }

    /// Parses `data:<mime>;base64,<payload>`. The declared MIME type is not
    /// trusted; the format is sniffed from the decoded bytes.
    pub fn from_data_url(url: &str) -> Result<Self, RenderError> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| RenderError::photo("data URL", "missing 'data:' prefix"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| RenderError::photo("data URL", "missing ',' separator"))?;
        if !meta.ends_with(";base64") {
            return Err(RenderError::photo("data URL", "only base64 data URLs are supported"));
        }
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| RenderError::photo("data URL", e.to_string()))?;
        Self::from_bytes(bytes)
    }

    pub fn format(&self) -> PhotoFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }

    /// Decodes the photo, crops it to a centered square and bounds its size.
    pub fn decode(&self) -> Result<DecodedPhoto, RenderError> {
        let image = image::load_from_memory(&self.bytes)
            .map_err(|e| RenderError::photo(self.format.mime_type(), e.to_string()))?;
        let side = image.width().min(image.height());
        if side == 0 {
            return Err(RenderError::photo(self.format.mime_type(), "image has no pixels"));
        }
        let x = (image.width() - side) / 2;
        let y = (image.height() - side) / 2;
        let mut square = image.crop_imm(x, y, side, side);
        if side > MAX_EMBED_EDGE {
            debug!("Downscaling portrait from {}px to {}px", side, MAX_EMBED_EDGE);
            square = square.thumbnail(MAX_EMBED_EDGE, MAX_EMBED_EDGE);
        }
        let rgb = square.to_rgb8();
        Ok(DecodedPhoto {
            width: rgb.width(),
            height: rgb.height(),
            rgb: rgb.into_raw(),
        })
    }
}

/// Placeholder avatar text: the first character of the name, or `?`.
pub fn initial(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "?".to_string())
}

//! Decoding and export of generated portraits
//!
//! The image service returns base64 payloads. This module turns them into
//! bytes, sniffs their format, probes their dimensions and writes them to
//! disk for viewing.

pub mod export;
pub mod mime;
pub mod mock;

pub use export::PortraitExporter;
pub use mime::{detect_image_mime, sniff_image_kind, ImageKind};
pub use mock::MockPortraitExporter;

use crate::Result;
use async_trait::async_trait;
use base64::Engine as _;
use std::io::Cursor;
use std::path::PathBuf;

/// One base64 payload decoded into raw bytes.
#[derive(Debug, Clone)]
pub struct DecodedPortrait {
    pub bytes: Vec<u8>,
    pub kind: Option<ImageKind>,
    pub dimensions: Option<(u32, u32)>,
}

/// Decode a base64 payload, tolerating a leading `data:...;base64,` prefix
/// and embedded whitespace.
pub fn decode_portrait(payload: &str) -> Result<DecodedPortrait> {
    let payload = payload
        .split_once(";base64,")
        .map(|(_, data)| data)
        .unwrap_or(payload);
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = base64::engine::general_purpose::STANDARD.decode(cleaned)?;
    let kind = sniff_image_kind(&bytes);
    let dimensions = probe_dimensions(&bytes);

    Ok(DecodedPortrait {
        bytes,
        kind,
        dimensions,
    })
}

fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ::image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[async_trait]
pub trait ImageService: Send + Sync {
    /// Write every payload to disk, in order, and return the file paths.
    async fn export_portraits(&self, portraits: &[String], base_name: &str)
        -> Result<Vec<PathBuf>>;
}

/// Filesystem-safe stem derived from a character name.
pub fn slugify(name: &str) -> String {
    let slug = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "portrait".to_string()
    } else {
        slug
    }
}

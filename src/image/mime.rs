/// Image container formats recognised by their magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Webp,
    Gif,
}

impl ImageKind {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Webp => "image/webp",
            ImageKind::Gif => "image/gif",
        }
    }
}

pub fn sniff_image_kind(bytes: &[u8]) -> Option<ImageKind> {
    match bytes {
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(ImageKind::Png),
        [0xFF, 0xD8, 0xFF, ..] => Some(ImageKind::Jpeg),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some(ImageKind::Webp),
        [0x47, 0x49, 0x46, 0x38, ..] => Some(ImageKind::Gif),
        _ => None,
    }
}

/// MIME type for a `data:` URI; unknown payloads are labelled as PNG.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match sniff_image_kind(bytes) {
        Some(kind) => kind.mime(),
        None => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/png",
                &bytes[..bytes.len().min(4)]
            );
            ImageKind::Png.mime()
        }
    }
}

//! Textual content-type detection

use crate::clipboard_history::types::ContentType;

/// Extensions treated as images when they end a path or URL
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".tiff", ".svg",
];

const URL_SCHEMES: &[&str] = &["http://", "https://", "ftp://"];

/// Classify content as an image reference, a file reference, or plain text.
///
/// Only the text is inspected; nothing touches the filesystem or network.
pub fn detect_content_type(content: &str) -> ContentType {
    let trimmed = content.trim();

    if looks_like_path(trimmed) {
        return if is_image_format(trimmed) {
            ContentType::Image
        } else {
            ContentType::File
        };
    }

    if URL_SCHEMES.iter().any(|scheme| trimmed.starts_with(scheme)) && is_image_format(trimmed) {
        return ContentType::Image;
    }

    ContentType::Text
}

/// Case-insensitive image extension check on the end of `path`
pub fn is_image_format(path: &str) -> bool {
    let lower = path.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn looks_like_path(s: &str) -> bool {
    s.starts_with('/') || s.starts_with("~/") || s.contains(":\\") || s.starts_with("file://")
}

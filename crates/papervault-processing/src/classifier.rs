//! File kind detection.
//!
//! The extension of the declared name wins; the declared media type is only
//! consulted when the name has no recognised extension. Anything else is
//! `Other` and passes through the pipeline untouched.

use papervault_core::FileKind;
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff",
];

/// Lowercased extension of `filename`, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty())
}

fn kind_from_extension(extension: &str) -> Option<FileKind> {
    if IMAGE_EXTENSIONS.contains(&extension) {
        Some(FileKind::Image)
    } else if extension == "pdf" {
        Some(FileKind::Pdf)
    } else {
        None
    }
}

fn kind_from_media_type(content_type: &str) -> Option<FileKind> {
    // Strip parameters such as "; charset=binary"
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if essence.starts_with("image/") && essence != "image/svg+xml" {
        Some(FileKind::Image)
    } else if essence == "application/pdf" || essence == "application/x-pdf" {
        Some(FileKind::Pdf)
    } else {
        None
    }
}

pub fn classify(filename: &str, content_type: &str) -> FileKind {
    file_extension(filename)
        .and_then(|ext| kind_from_extension(&ext))
        .or_else(|| kind_from_media_type(content_type))
        .unwrap_or(FileKind::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_takes_precedence() {
        assert_eq!(classify("notes.pdf", "image/png"), FileKind::Pdf);
        assert_eq!(classify("scan.JPG", "application/pdf"), FileKind::Image);
    }

    #[test]
    fn test_media_type_fallback() {
        assert_eq!(classify("scan", "image/jpeg"), FileKind::Image);
        assert_eq!(classify("paper.bin", "application/pdf"), FileKind::Pdf);
        assert_eq!(
            classify("paper", "Application/PDF; charset=binary"),
            FileKind::Pdf
        );
    }

    #[test]
    fn test_unknown_is_other() {
        assert_eq!(classify("answers.docx", "application/msword"), FileKind::Other);
        assert_eq!(classify("", ""), FileKind::Other);
        assert_eq!(classify("logo.svg", "image/svg+xml"), FileKind::Other);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.TAR.GZ").as_deref(), Some("gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension(".hidden"), None);
    }
}

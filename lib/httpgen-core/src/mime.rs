//! MIME type lookup by file extension.
//!
//! Every renderer infers content types through this one table, so a plan
//! rendered for two targets never disagrees about a file's type.

use std::path::Path;

/// Guess a content type from a path's extension.
///
/// Returns `None` for unknown or missing extensions; the caller then falls
/// back to its own default (usually `application/octet-stream`).
#[must_use]
pub fn guess_from_path(path: &str) -> Option<&'static str> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();

    let mime = match extension.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "bmp" => "image/bmp",
        // Documents
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        // Text
        "txt" => "text/plain; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "csv" => "text/csv",
        "md" => "text/markdown",
        // Archives
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" | "gzip" => "application/gzip",
        "7z" => "application/x-7z-compressed",
        // Audio/Video
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        // Other
        "wasm" => "application/wasm",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_common_types() {
        assert_eq!(guess_from_path("photo.jpg"), Some("image/jpeg"));
        assert_eq!(guess_from_path("/tmp/doc.pdf"), Some("application/pdf"));
        assert_eq!(guess_from_path("data.json"), Some("application/json"));
        assert_eq!(guess_from_path("/tmp/a.txt"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn guess_is_case_insensitive() {
        assert_eq!(guess_from_path("PHOTO.JPG"), Some("image/jpeg"));
    }

    #[test]
    fn unknown_or_missing_extension() {
        assert_eq!(guess_from_path("unknown.xyz"), None);
        assert_eq!(guess_from_path("Makefile"), None);
        assert_eq!(guess_from_path("archive.d/README"), None);
    }
}

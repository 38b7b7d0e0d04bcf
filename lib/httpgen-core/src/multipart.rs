//! Multipart form layout.
//!
//! [`MultipartBody`] describes a `multipart/form-data` body without reading
//! any file. Renderers walk its parts to emit target code; the reference
//! encoder [`MultipartBody::encode_with`] produces the exact bytes when the
//! caller supplies a file loader.
//!
//! # Example
//!
//! ```
//! use httpgen_core::{MultipartBody, Part};
//!
//! let body = MultipartBody::new("b0")
//!     .part(Part::field("note", "hi"))
//!     .part(Part::file("upload", "/tmp/a.txt"));
//!
//! let bytes = body
//!     .encode_with(|_path| Ok(b"file content".to_vec()))
//!     .expect("encode");
//! assert!(bytes.ends_with(b"--b0--\r\n"));
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use crate::content_type::{ContentTypeSource, MULTIPART_FORM_DATA};
use crate::{Error, Result};

/// Content type sent for a file part whose type cannot be inferred.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A single part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    /// A literal text field.
    Field {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// A field whose value is the content of a file (`name=<path`).
    InlineFile {
        /// Field name.
        name: String,
        /// Path of the file to inline.
        path: String,
        /// Explicit `;type=`, if any.
        content_type: Option<String>,
    },
    /// A file upload (`name=@path`).
    File {
        /// Field name.
        name: String,
        /// Path of the file to upload.
        path: String,
        /// File name sent in `Content-Disposition`.
        filename: String,
        /// Explicit or inferred content type.
        content_type: ContentTypeSource,
    },
}

impl Part {
    /// Create a text field part.
    #[must_use]
    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Field {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create an inline file part.
    #[must_use]
    pub fn inline_file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::InlineFile {
            name: name.into(),
            path: path.into(),
            content_type: None,
        }
    }

    /// Create a file upload part.
    ///
    /// The filename defaults to the last path segment and the content type
    /// is inferred from the path.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self::File {
            name: name.into(),
            filename: basename(&path).to_string(),
            content_type: ContentTypeSource::InferFromPath(path.clone()),
            path,
        }
    }

    /// Field name of the part.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field { name, .. } | Self::InlineFile { name, .. } | Self::File { name, .. } => {
                name
            }
        }
    }

    /// Path of the referenced file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Field { .. } => None,
            Self::InlineFile { path, .. } | Self::File { path, .. } => Some(path),
        }
    }

    /// Returns `true` for file uploads.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }
}

/// The last `/` or `\` separated segment of a path.
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// An ordered multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultipartBody {
    boundary: String,
    parts: Vec<Part>,
}

impl MultipartBody {
    /// Create an empty body with the given boundary.
    #[must_use]
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Add a part.
    #[must_use]
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Add a part in place.
    pub fn push(&mut self, part: Part) {
        self.parts.push(part);
    }

    /// Get the boundary string.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// All parts in order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Non-upload parts (text fields and inlined files), in order.
    pub fn fields(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|part| !part.is_file())
    }

    /// File upload parts, in order.
    pub fn files(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|part| part.is_file())
    }

    /// `multipart/form-data; boundary=<boundary>`.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("{MULTIPART_FORM_DATA}; boundary={}", self.boundary)
    }

    /// Encode the body, reading files through `loader`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileRead`] if the loader fails for a path.
    pub fn encode_with<F>(&self, mut loader: F) -> Result<Bytes>
    where
        F: FnMut(&str) -> std::io::Result<Vec<u8>>,
    {
        let mut buf = BytesMut::new();
        let mut load = |path: &str| loader(path).map_err(|err| Error::file_read(path, err));

        for part in &self.parts {
            buf.put_slice(b"--");
            buf.put_slice(self.boundary.as_bytes());
            buf.put_slice(b"\r\n");

            buf.put_slice(b"Content-Disposition: form-data; name=\"");
            buf.put_slice(part.name().as_bytes());
            buf.put_slice(b"\"");

            let data = match part {
                Part::Field { value, .. } => {
                    buf.put_slice(b"\r\n");
                    value.as_bytes().to_vec()
                }
                Part::InlineFile {
                    path, content_type, ..
                } => {
                    buf.put_slice(b"\r\n");
                    if let Some(content_type) = content_type {
                        put_content_type(&mut buf, content_type);
                    }
                    load(path.as_str())?
                }
                Part::File {
                    path,
                    filename,
                    content_type,
                    ..
                } => {
                    buf.put_slice(b"; filename=\"");
                    buf.put_slice(filename.as_bytes());
                    buf.put_slice(b"\"\r\n");
                    let content_type = content_type
                        .resolve()
                        .unwrap_or_else(|| OCTET_STREAM.to_string());
                    put_content_type(&mut buf, &content_type);
                    load(path.as_str())?
                }
            };

            buf.put_slice(b"\r\n");
            buf.put_slice(&data);
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--\r\n");

        Ok(buf.freeze())
    }
}

fn put_content_type(buf: &mut BytesMut, content_type: &str) {
    buf.put_slice(b"Content-Type: ");
    buf.put_slice(content_type.as_bytes());
    buf.put_slice(b"\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(path: &str) -> std::io::Result<Vec<u8>> {
        match path {
            "/tmp/a.txt" => Ok(b"file content".to_vec()),
            "/tmp/inline" => Ok(b"inlined".to_vec()),
            _ => Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing")),
        }
    }

    #[test]
    fn part_file_defaults() {
        let part = Part::file("upload", "/tmp/dir/photo.jpg");
        assert_eq!(
            part,
            Part::File {
                name: "upload".to_string(),
                path: "/tmp/dir/photo.jpg".to_string(),
                filename: "photo.jpg".to_string(),
                content_type: ContentTypeSource::InferFromPath("/tmp/dir/photo.jpg".to_string()),
            }
        );
    }

    #[test]
    fn basename_handles_separators() {
        assert_eq!(basename("/tmp/a.txt"), "a.txt");
        assert_eq!(basename(r"C:\data\b.bin"), "b.bin");
        assert_eq!(basename("plain"), "plain");
    }

    #[test]
    fn fields_and_files_split() {
        let body = MultipartBody::new("b")
            .part(Part::file("file", "/tmp/a.txt"))
            .part(Part::field("note", "hi"))
            .part(Part::inline_file("raw", "/tmp/inline"));
        let fields: Vec<_> = body.fields().map(Part::name).collect();
        let files: Vec<_> = body.files().map(Part::name).collect();
        assert_eq!(fields, ["note", "raw"]);
        assert_eq!(files, ["file"]);
    }

    #[test]
    fn body_content_type() {
        let body = MultipartBody::new("test-boundary");
        assert_eq!(
            body.content_type(),
            "multipart/form-data; boundary=test-boundary"
        );
    }

    #[test]
    fn encode_field_and_file() {
        let body = MultipartBody::new("boundary123")
            .part(Part::field("field", "value"))
            .part(Part::file("upload", "/tmp/a.txt"));

        let bytes = body.encode_with(loader).expect("encode");
        let text = String::from_utf8_lossy(&bytes);

        assert_eq!(
            text,
            "--boundary123\r\n\
             Content-Disposition: form-data; name=\"field\"\r\n\
             \r\n\
             value\r\n\
             --boundary123\r\n\
             Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n\
             file content\r\n\
             --boundary123--\r\n"
        );
    }

    #[test]
    fn encode_inline_file_with_type() {
        let body = MultipartBody::new("b").part(Part::InlineFile {
            name: "raw".to_string(),
            path: "/tmp/inline".to_string(),
            content_type: Some("text/x".to_string()),
        });
        let bytes = body.encode_with(loader).expect("encode");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("name=\"raw\"\r\nContent-Type: text/x\r\n\r\ninlined\r\n"));
    }

    #[test]
    fn encode_unknown_extension_uses_octet_stream() {
        let body = MultipartBody::new("b").part(Part::File {
            name: "f".to_string(),
            path: "/tmp/a.txt".to_string(),
            filename: "blob".to_string(),
            content_type: ContentTypeSource::InferFromPath("blob".to_string()),
        });
        let bytes = body.encode_with(loader).expect("encode");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("Content-Type: application/octet-stream\r\n"));
    }

    #[test]
    fn encode_reports_loader_failure() {
        let body = MultipartBody::new("b").part(Part::file("f", "/nope"));
        let err = body.encode_with(loader).expect_err("missing file");
        assert_eq!(err.to_string(), "cannot read '/nope': missing");
    }
}

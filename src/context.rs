//! Typed per-request pipeline results.
//!
//! The pipeline never attaches loose ad-hoc properties to the request.
//! Everything it produces lands in a [`RequestContext`] inserted into the
//! request's extensions, keeping the pipeline decoupled from any particular
//! handler signature.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderMap;
use serde::Serialize;
use serde_json::Value;

/// Predicate deciding whether an uploaded file is accepted.
///
/// Consulted once per file part, before any bytes are read. Returning
/// `false` records the part in [`UploadSet::rejected`] and drains it
/// without writing to disk.
pub type FileFilter = Arc<dyn Fn(&FileDescriptor, &HeaderMap) -> bool + Send + Sync>;

/// Per-request result attached to the request extensions on success.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// The merged, schema-validated candidate object. `None` only in the
    /// degenerate case where nothing was attached (validation failures
    /// never reach downstream handlers at all).
    pub valid_json: Option<Value>,

    /// Upload metadata, present only when the request carried multipart
    /// data.
    pub files: Option<UploadSet>,
}

/// Upload metadata for one request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadSet {
    /// The most recently accepted file, if any.
    pub file: Option<FileDescriptor>,

    /// Parts the file filter turned away. Accumulated across all parts of
    /// the request.
    pub rejected: Vec<RejectedUpload>,
}

/// Describes one accepted upload.
///
/// Constructed before any bytes are read; `size` accumulates as chunks
/// stream in and is final once the part ends.
#[derive(Debug, Clone, Serialize)]
pub struct FileDescriptor {
    /// Form field name the file arrived under.
    pub field_name: String,

    /// Client-supplied file name.
    pub original_name: String,

    /// Declared content type of the part.
    pub mime_type: String,

    /// Content transfer encoding of the part.
    pub encoding: String,

    /// Bytes observed so far (final byte count once the stream ends).
    pub size: u64,

    /// `Content-Length` of the enclosing request, when declared.
    pub content_length: Option<u64>,

    /// Directory the file is written into.
    pub destination: PathBuf,

    /// Full path of the written file: `destination/<original_name>`.
    pub path: PathBuf,

    /// File extension taken from the original name, including the dot.
    pub extension: String,
}

impl FileDescriptor {
    /// Build a descriptor for a part before reading its bytes.
    ///
    /// Only the base name of the client-supplied file name is used when
    /// computing the destination path, so a hostile `../../name` cannot
    /// escape the upload directory.
    pub fn new(
        field_name: &str,
        original_name: &str,
        mime_type: &str,
        encoding: &str,
        content_length: Option<u64>,
        destination: &std::path::Path,
    ) -> Self {
        let base_name = std::path::Path::new(original_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| original_name.to_string());

        let extension = std::path::Path::new(&base_name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let path = destination.join(&base_name);

        Self {
            field_name: field_name.to_string(),
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            encoding: encoding.to_string(),
            size: 0,
            content_length,
            destination: destination.to_path_buf(),
            path,
            extension,
        }
    }
}

/// A file part turned away by the file filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedUpload {
    /// Form field name the file arrived under.
    pub field_name: String,

    /// Client-supplied file name.
    pub original_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn descriptor_computes_path_and_extension() {
        let desc = FileDescriptor::new(
            "avatar",
            "photo.png",
            "image/png",
            "7bit",
            Some(1024),
            Path::new("/tmp/uploads"),
        );
        assert_eq!(desc.path, Path::new("/tmp/uploads/photo.png"));
        assert_eq!(desc.extension, ".png");
        assert_eq!(desc.size, 0);
    }

    #[test]
    fn descriptor_strips_directory_components() {
        let desc = FileDescriptor::new(
            "doc",
            "../../etc/passwd",
            "text/plain",
            "7bit",
            None,
            Path::new("/tmp/uploads"),
        );
        assert_eq!(desc.path, Path::new("/tmp/uploads/passwd"));
        assert_eq!(desc.original_name, "../../etc/passwd");
    }

    #[test]
    fn descriptor_without_extension() {
        let desc = FileDescriptor::new(
            "raw",
            "README",
            "text/plain",
            "7bit",
            None,
            Path::new("/tmp"),
        );
        assert_eq!(desc.extension, "");
    }
}

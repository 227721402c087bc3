//! Multipart extraction: form fields and streamed uploads.
//!
//! # Responsibilities
//! - Walk the multipart stream sequentially, field by field
//! - Collect non-file fields into a flat mapping (last write per name wins)
//! - Build a [`FileDescriptor`] for every file part before reading bytes
//! - Consult the file filter; stream accepted files to the temp directory,
//!   drain rejected ones without touching disk
//!
//! # Design Decisions
//! - File writes are chunk-streamed, never buffered wholesale
//! - A part that exceeds the size cap aborts the pipeline
//! - No cleanup of written files; the caller owns their lifecycle
//! - Malformed multipart input is an explicit, distinguishable error rather
//!   than silently yielding empty data

use axum::http::HeaderMap;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;

use crate::config::schema::MultipartConfig;
use crate::context::{FileDescriptor, FileFilter, RejectedUpload, UploadSet};
use crate::error::PipelineError;
use crate::observability::metrics;

/// Everything the extractor produced for one request.
#[derive(Debug, Default)]
pub struct ExtractedMultipart {
    /// Non-file form fields, field name → string value.
    pub fields: Map<String, Value>,

    /// Upload metadata; `None` when the request carried no file parts.
    pub uploads: Option<UploadSet>,
}

/// Drive a multipart parser to completion, extracting fields and uploads.
///
/// `request_headers` are the headers of the enclosing request; they are
/// handed to the file filter alongside each descriptor.
pub async fn extract(
    mut multipart: multer::Multipart<'static>,
    config: &MultipartConfig,
    filter: Option<&FileFilter>,
    request_headers: &HeaderMap,
    content_length: Option<u64>,
) -> Result<ExtractedMultipart, PipelineError> {
    let mut fields = Map::new();
    let mut uploads: Option<UploadSet> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_owned);

        let Some(file_name) = file_name else {
            // Plain form field. Duplicate names: last write wins.
            let value = field.text().await.map_err(malformed)?;
            fields.insert(field_name, Value::String(value));
            continue;
        };

        let mime_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let encoding = field
            .headers()
            .get("content-transfer-encoding")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("7bit")
            .to_string();

        let mut descriptor = FileDescriptor::new(
            &field_name,
            &file_name,
            &mime_type,
            &encoding,
            content_length,
            &config.temp_upload_dir,
        );

        let set = uploads.get_or_insert_with(UploadSet::default);

        let accepted = filter
            .map(|f| f(&descriptor, request_headers))
            .unwrap_or(true);

        if !accepted {
            tracing::debug!(
                field = %field_name,
                file = %file_name,
                "upload rejected by file filter"
            );
            set.rejected.push(RejectedUpload {
                field_name,
                original_name: file_name,
            });
            // Drain the part so the parser can make progress.
            while field.chunk().await.map_err(malformed)?.is_some() {}
            metrics::record_upload("rejected");
            continue;
        }

        let mut file = tokio::fs::File::create(&descriptor.path).await?;
        while let Some(chunk) = field.chunk().await.map_err(malformed)? {
            descriptor.size += chunk.len() as u64;
            if descriptor.size > config.max_file_bytes {
                return Err(PipelineError::FileTooLarge {
                    field: descriptor.field_name,
                    limit: config.max_file_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(
            field = %descriptor.field_name,
            path = %descriptor.path.display(),
            size = descriptor.size,
            "upload written"
        );
        metrics::record_upload("accepted");
        set.file = Some(descriptor);
    }

    Ok(ExtractedMultipart { fields, uploads })
}

fn malformed(err: multer::Error) -> PipelineError {
    PipelineError::MalformedMultipart(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const BOUNDARY: &str = "gate-test-boundary";

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn file_part(name: &str, file_name: &str, content: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
             filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n"
        )
    }

    fn multipart_from(body: String) -> multer::Multipart<'static> {
        let stream = futures_util::stream::once(async move {
            Ok::<_, std::io::Error>(axum::body::Bytes::from(body))
        });
        multer::Multipart::new(stream, BOUNDARY)
    }

    fn close() -> String {
        format!("--{BOUNDARY}--\r\n")
    }

    #[tokio::test]
    async fn collects_fields_last_write_wins() {
        let body = format!(
            "{}{}{}{}",
            text_part("name", "first"),
            text_part("city", "berlin"),
            text_part("name", "second"),
            close()
        );
        let out = extract(
            multipart_from(body),
            &MultipartConfig::default(),
            None,
            &HeaderMap::new(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(out.fields["name"], "second");
        assert_eq!(out.fields["city"], "berlin");
        assert!(out.uploads.is_none());
    }

    #[tokio::test]
    async fn accepted_file_is_written_with_exact_size() {
        let dir = tempfile::tempdir().unwrap();
        let config = MultipartConfig {
            temp_upload_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let content = "hello upload";
        let body = format!("{}{}", file_part("doc", "notes.txt", content), close());

        let out = extract(multipart_from(body), &config, None, &HeaderMap::new(), None)
            .await
            .unwrap();

        let uploads = out.uploads.unwrap();
        let file = uploads.file.unwrap();
        assert_eq!(file.size, content.len() as u64);
        assert_eq!(file.path, dir.path().join("notes.txt"));
        assert_eq!(file.extension, ".txt");
        let written = std::fs::read_to_string(&file.path).unwrap();
        assert_eq!(written, content);
    }

    #[tokio::test]
    async fn rejected_file_is_recorded_and_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = MultipartConfig {
            temp_upload_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let filter: FileFilter =
            Arc::new(|desc, _headers| !desc.original_name.ends_with(".exe"));
        let body = format!(
            "{}{}{}",
            file_part("tool", "virus.exe", "MZ..."),
            file_part("doc", "ok.txt", "fine"),
            close()
        );

        let out = extract(
            multipart_from(body),
            &config,
            Some(&filter),
            &HeaderMap::new(),
            None,
        )
        .await
        .unwrap();

        let uploads = out.uploads.unwrap();
        assert_eq!(
            uploads.rejected,
            vec![RejectedUpload {
                field_name: "tool".into(),
                original_name: "virus.exe".into()
            }]
        );
        assert!(!dir.path().join("virus.exe").exists());
        assert_eq!(uploads.file.unwrap().original_name, "ok.txt");
    }

    #[tokio::test]
    async fn oversize_upload_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let config = MultipartConfig {
            temp_upload_dir: dir.path().to_path_buf(),
            max_file_bytes: 4,
            ..Default::default()
        };
        let body = format!("{}{}", file_part("doc", "big.txt", "way too long"), close());

        let err = extract(multipart_from(body), &config, None, &HeaderMap::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileTooLarge { .. }));
    }

    #[tokio::test]
    async fn truncated_payload_is_malformed() {
        // No closing boundary.
        let body = text_part("name", "value");

        let err = extract(
            multipart_from(body),
            &MultipartConfig::default(),
            None,
            &HeaderMap::new(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::MalformedMultipart(_)));
    }
}

//! Text extraction — turns an uploaded résumé file into plain text.
//!
//! Validation (size, declared MIME type) runs before the byte source is read.
//! The strategy is picked from the declared MIME type alone; file contents are
//! never sniffed.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub mod docx;
pub mod handlers;
pub mod pdf;
pub mod plain;

/// Uploads larger than this are rejected before any parsing.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
pub const MAX_UPLOAD_MB: u64 = MAX_UPLOAD_BYTES / (1024 * 1024);

pub const MIME_PLAIN_TEXT: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("File too large: {size_bytes} bytes exceeds the {max_mb} MB limit")]
    FileTooLarge { size_bytes: u64, max_mb: u64 },

    #[error("Unsupported file format '{0}': upload a PDF, DOCX, or TXT file")]
    UnsupportedType(String),

    #[error("{0}")]
    EmptyDocument(String),

    #[error("{format} error: {cause}")]
    Failed {
        format: DocumentFormat,
        cause: String,
    },
}

impl ExtractError {
    pub fn failed(format: DocumentFormat, cause: impl std::fmt::Display) -> Self {
        ExtractError::Failed {
            format,
            cause: cause.to_string(),
        }
    }

    /// True for precondition violations detected before any bytes are read.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ExtractError::FileTooLarge { .. } | ExtractError::UnsupportedType(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Maps a declared MIME type to a format. Parameters such as `; charset=utf-8`
    /// are ignored; anything outside the accepted set yields `None`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(MIME_PLAIN_TEXT) {
            Some(DocumentFormat::PlainText)
        } else if essence.eq_ignore_ascii_case(MIME_PDF) {
            Some(DocumentFormat::Pdf)
        } else if essence.eq_ignore_ascii_case(MIME_DOCX) {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DocumentFormat::PlainText => "TXT",
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
        };
        f.write_str(label)
    }
}

/// Where an upload's bytes come from. Only read after validation passes.
#[async_trait]
pub trait ByteSource: Send + Sync {
    async fn read_bytes(&self) -> io::Result<Bytes>;
}

#[async_trait]
impl ByteSource for Bytes {
    async fn read_bytes(&self) -> io::Result<Bytes> {
        Ok(self.clone())
    }
}

/// An uploaded file as received from the client.
pub struct UploadedFile<S: ByteSource = Bytes> {
    pub name: String,
    pub declared_mime: String,
    pub size_bytes: u64,
    pub source: S,
}

/// Advisory progress sink. Never affects control flow or output.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, message: &str);
}

/// Discards progress messages.
#[cfg(test)]
pub struct NoProgress;

#[cfg(test)]
impl ProgressObserver for NoProgress {
    fn on_progress(&self, _message: &str) {}
}

/// Logs progress messages against the file being processed.
pub struct LogProgress<'a> {
    pub file_name: &'a str,
}

impl ProgressObserver for LogProgress<'_> {
    fn on_progress(&self, message: &str) {
        info!(file = self.file_name, "{message}");
    }
}

/// Text produced by a format strategy, before the final trim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText {
    pub text: String,
    pub pages: Option<PageCoverage>,
}

/// How much of a paginated document contributed to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCoverage {
    pub pages_read: usize,
    pub total_pages: usize,
}

impl PageCoverage {
    pub fn truncated(&self) -> bool {
        self.total_pages > self.pages_read
    }
}

/// Result of a successful extraction. `text` is trimmed and non-empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub text: String,
    pub file_name: String,
    pub format: DocumentFormat,
    #[serde(flatten)]
    pub pages: Option<PageCoverage>,
    pub truncated: bool,
}

/// One strategy per supported format.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(
        &self,
        bytes: Bytes,
        progress: &dyn ProgressObserver,
    ) -> Result<RawText, ExtractError>;
}

pub fn extractor_for(format: DocumentFormat) -> &'static dyn Extractor {
    match format {
        DocumentFormat::PlainText => &plain::PlainTextExtractor,
        DocumentFormat::Pdf => &pdf::PdfExtractor,
        DocumentFormat::Docx => &docx::DocxExtractor,
    }
}

/// Checks the upload's preconditions without touching its bytes.
pub fn validate_upload<S: ByteSource>(
    file: &UploadedFile<S>,
) -> Result<DocumentFormat, ExtractError> {
    if file.size_bytes > MAX_UPLOAD_BYTES {
        return Err(ExtractError::FileTooLarge {
            size_bytes: file.size_bytes,
            max_mb: MAX_UPLOAD_MB,
        });
    }
    DocumentFormat::from_mime(&file.declared_mime)
        .ok_or_else(|| ExtractError::UnsupportedType(file.declared_mime.clone()))
}

/// Validates, reads, and converts an uploaded file into trimmed plain text.
pub async fn extract_text<S: ByteSource>(
    file: UploadedFile<S>,
    progress: &dyn ProgressObserver,
) -> Result<Extraction, ExtractError> {
    let format = validate_upload(&file)?;

    let bytes = file
        .source
        .read_bytes()
        .await
        .map_err(|e| ExtractError::failed(format, e))?;

    let raw = extractor_for(format).extract(bytes, progress).await?;

    let text = raw.text.trim();
    if text.is_empty() {
        return Err(ExtractError::EmptyDocument(format!(
            "{} file '{}' contains no readable text",
            format, file.name
        )));
    }

    Ok(Extraction {
        text: text.to_string(),
        file_name: file.name,
        format,
        truncated: raw.pages.map(|p| p.truncated()).unwrap_or(false),
        pages: raw.pages,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Byte source that records how often it was read.
    pub struct CountingSource {
        pub bytes: Bytes,
        pub reads: AtomicUsize,
    }

    impl CountingSource {
        pub fn new(bytes: impl Into<Bytes>) -> Arc<Self> {
            Arc::new(Self {
                bytes: bytes.into(),
                reads: AtomicUsize::new(0),
            })
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ByteSource for Arc<CountingSource> {
        async fn read_bytes(&self) -> io::Result<Bytes> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.bytes.clone())
        }
    }

    #[derive(Default)]
    pub struct RecordingProgress {
        pub messages: Mutex<Vec<String>>,
    }

    impl ProgressObserver for RecordingProgress {
        fn on_progress(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }
}

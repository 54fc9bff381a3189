//! Axum route handler for résumé file extraction.

use axum::extract::{multipart::Field, Multipart, State};
use axum::Json;
use bytes::BytesMut;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::{extract_text, Extraction, LogProgress, UploadedFile, MAX_UPLOAD_BYTES};
use crate::state::AppState;

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

const DEFAULT_FILE_NAME: &str = "upload";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// POST /api/v1/extract
///
/// Multipart upload with a `file` field. Size and declared type are validated
/// before the bytes are parsed.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Extraction>, AppError> {
    let _permit = state.extraction_flight.try_begin()?;

    let upload = read_upload(&mut multipart).await?;
    let file_name = upload.name.clone();
    info!(
        "Extracting '{}' ({} bytes, {})",
        file_name, upload.size_bytes, upload.declared_mime
    );

    let extraction = extract_text(upload, &LogProgress { file_name: &file_name })
        .await
        .map_err(|err| {
            if err.is_validation() {
                info!("Rejected upload '{}': {err}", file_name);
            }
            err
        })?;
    info!(
        "Extracted {} characters from '{}'",
        extraction.text.chars().count(),
        file_name
    );
    Ok(Json(extraction))
}

async fn read_upload(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        if field.name() == Some(FILE_FIELD) {
            return buffer_field(field).await;
        }
    }
    Err(AppError::validation(
        "No file uploaded",
        format!("Attach the résumé as the '{FILE_FIELD}' form field."),
    ))
}

/// Buffers the field up to the upload limit. Past the limit the remaining
/// chunks are only counted so the size check can report the real size.
async fn buffer_field(mut field: Field<'_>) -> Result<UploadedFile, AppError> {
    let name = field.file_name().unwrap_or(DEFAULT_FILE_NAME).to_string();
    let declared_mime = field
        .content_type()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    let mut buffer = BytesMut::new();
    let mut size_bytes: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(invalid_upload)? {
        size_bytes += chunk.len() as u64;
        if size_bytes <= MAX_UPLOAD_BYTES {
            buffer.extend_from_slice(&chunk);
        }
    }

    Ok(UploadedFile {
        name,
        declared_mime,
        size_bytes,
        source: buffer.freeze(),
    })
}

fn invalid_upload(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::validation("Invalid upload", err.body_text())
}

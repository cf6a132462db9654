use std::collections::HashMap;

use axum::extract::Multipart;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::services::storage::StorageService;

/// One `files` part read out of a multipart body.
pub(crate) struct UploadedPart {
    pub(crate) filename: String,
    pub(crate) content_type: String,
    pub(crate) bytes: Vec<u8>,
}

/// Drains a multipart body: file parts (field name `file` or `files`) are
/// collected with a running size cap, every other part is kept as text.
pub(crate) async fn read_multipart(
    mut multipart: Multipart,
    state: &AppState,
) -> Result<(Vec<UploadedPart>, HashMap<String, String>), ApiError> {
    let max_bytes = state.settings().storage().max_upload_size_mb * 1024 * 1024;
    let max_files = state.settings().storage().max_files_per_upload as usize;

    let mut parts = Vec::new();
    let mut fields = HashMap::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" || name == "files" {
            if parts.len() >= max_files {
                return Err(ApiError::BadRequest(format!(
                    "At most {max_files} files per upload"
                )));
            }
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .ok_or_else(|| ApiError::BadRequest("File part must have a filename".to_string()))?;
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let mut bytes = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
            {
                let next_size = bytes.len() as u64 + chunk.len() as u64;
                if next_size > max_bytes {
                    return Err(ApiError::BadRequest(format!(
                        "File size exceeds {}MB limit",
                        state.settings().storage().max_upload_size_mb
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }
            parts.push(UploadedPart { filename, content_type, bytes });
        } else {
            let text = field
                .text()
                .await
                .map_err(|_| ApiError::BadRequest(format!("Invalid value for field '{name}'")))?;
            fields.insert(name, text);
        }
    }

    Ok((parts, fields))
}

pub(crate) fn require_storage(state: &AppState) -> Result<&StorageService, ApiError> {
    state.storage().ok_or_else(|| {
        ApiError::ServiceUnavailable("Object storage is not configured".to_string())
    })
}

/// Keeps the extension readable while stripping path separators and
/// anything else that does not belong in an object key.
pub(crate) fn sanitized_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

//! Feature operations built on the backend client and the utilities.
pub mod attachments;
pub mod expenses;
pub mod groups;
pub mod messages;
pub mod notes;
pub mod tasks;
pub mod users;

pub use attachments::{AttachmentParent, AttachmentService};
pub use expenses::ExpenseService;
pub use groups::GroupService;
pub use messages::MessageService;
pub use notes::NoteService;
pub use tasks::TaskService;
pub use users::UserService;

use crate::backend::SupabaseClient;
use crate::error::{AppError, AppResult};
use crate::utils::files::{guess_mime_type, is_image_mime};
use std::path::Path;

/// Bytes ready for object storage.
#[derive(Debug)]
pub(crate) struct UploadPayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub extension: String,
}

/// Read a file for upload. Images go through the normalization pipeline; if
/// that fails the original bytes are sent instead.
pub(crate) async fn prepare_upload(path: &Path) -> AppResult<UploadPayload> {
    let mime = guess_mime_type(path);
    if is_image_mime(mime) {
        if let Some(bytes) = crate::utils::image::compress_image_async(path.to_path_buf()).await {
            return Ok(UploadPayload {
                bytes,
                content_type: "image/jpeg".to_string(),
                extension: "jpg".to_string(),
            });
        }
        log::warn!("Could not compress {:?}; uploading original", path);
    }

    let bytes = tokio::fs::read(path).await?;
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string());
    Ok(UploadPayload {
        bytes,
        content_type: mime.to_string(),
        extension,
    })
}

/// Best-effort removal of an uploaded object whose row could not be written.
pub(crate) async fn discard_object(client: &SupabaseClient, bucket: &str, key: &str) {
    match client.remove_object(bucket, key).await {
        Ok(()) => log::info!("Removed orphaned object {}/{}", bucket, key),
        Err(e) => log::error!("Failed to remove orphaned object {}/{}: {}", bucket, key, e),
    }
}

/// Reject blank required text fields.
pub(crate) fn require_text(value: Option<&str>, field: &str) -> AppResult<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(AppError::InvalidInput(format!("{} is required", field))),
    }
}

pub(crate) fn require_id<'a>(value: Option<&'a str>, what: &str) -> AppResult<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("{} has no id", what)))
}

pub(crate) fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

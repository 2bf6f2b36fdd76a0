use super::{discard_object, prepare_upload};
use crate::backend::storage::object_path;
use crate::backend::{Query, SupabaseClient};
use crate::constants::{ATTACHMENTS_BUCKET, ATTACHMENTS_TABLE};
use crate::error::AppResult;
use crate::models::Attachment;
use std::path::Path;

/// What an attachment hangs off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentParent {
    Task(String),
    Note(String),
    Message(String),
}

impl AttachmentParent {
    fn column(&self) -> &'static str {
        match self {
            AttachmentParent::Task(_) => "task_id",
            AttachmentParent::Note(_) => "note_id",
            AttachmentParent::Message(_) => "message_id",
        }
    }

    fn id(&self) -> &str {
        match self {
            AttachmentParent::Task(id) | AttachmentParent::Note(id) | AttachmentParent::Message(id) => id,
        }
    }

    fn apply(&self, attachment: &mut Attachment) {
        let id = Some(self.id().to_string());
        match self {
            AttachmentParent::Task(_) => attachment.task_id = id,
            AttachmentParent::Note(_) => attachment.note_id = id,
            AttachmentParent::Message(_) => attachment.message_id = id,
        }
    }
}

pub struct AttachmentService;

impl AttachmentService {
    /// Upload a file and record it. Images are normalized before upload.
    pub async fn upload_attachment(
        client: &SupabaseClient,
        owner_id: &str,
        file_path: &Path,
        parent: &AttachmentParent,
    ) -> AppResult<Attachment> {
        let payload = prepare_upload(file_path).await?;
        let key = object_path(owner_id, &payload.extension);
        let size = payload.bytes.len() as i64;
        client
            .upload(ATTACHMENTS_BUCKET, &key, payload.bytes, &payload.content_type)
            .await?;

        let mut row = Attachment {
            owner_id: Some(owner_id.to_string()),
            file_name: file_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string()),
            file_url: Some(client.public_url(ATTACHMENTS_BUCKET, &key)),
            mime_type: Some(payload.content_type),
            size_bytes: Some(size),
            ..Default::default()
        };
        parent.apply(&mut row);
        let stored = client.insert(ATTACHMENTS_TABLE, &row).await;
        if stored.is_err() {
            discard_object(client, ATTACHMENTS_BUCKET, &key).await;
        }
        stored
    }

    pub async fn list_attachments(
        client: &SupabaseClient,
        parent: &AttachmentParent,
    ) -> AppResult<Vec<Attachment>> {
        client
            .select(
                ATTACHMENTS_TABLE,
                &Query::new()
                    .eq(parent.column(), parent.id())
                    .order("created_at", true),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::client_for;
    use crate::error::AppError;
    use crate::services::test_support::png_file;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parent_columns() {
        let mut row = Attachment::default();
        AttachmentParent::Note("n1".to_string()).apply(&mut row);
        assert_eq!(row.note_id.as_deref(), Some("n1"));
        assert!(row.task_id.is_none());
        assert_eq!(AttachmentParent::Message("m1".to_string()).column(), "message_id");
    }

    #[tokio::test]
    async fn test_upload_image_attachment() {
        let server = MockServer::start_async().await;
        let upload = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path_contains("/storage/v1/object/attachments/u1/")
                    .header("content-type", "image/jpeg");
                then.status(200).json_body(json!({}));
            })
            .await;
        let insert = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/attachments")
                    .body_contains("\"task_id\":\"t1\"")
                    .body_contains("\"mime_type\":\"image/jpeg\"");
                then.status(201).json_body(json!([{ "id": "a1", "task_id": "t1" }]));
            })
            .await;

        let client = client_for(&server);
        let image = png_file(64, 64);
        let parent = AttachmentParent::Task("t1".to_string());
        let attachment = AttachmentService::upload_attachment(&client, "u1", image.path(), &parent)
            .await
            .unwrap();
        upload.assert_async().await;
        insert.assert_async().await;
        assert_eq!(attachment.id.as_deref(), Some("a1"));
    }

    #[tokio::test]
    async fn test_upload_document_keeps_bytes() {
        let server = MockServer::start_async().await;
        let upload = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path_contains("/storage/v1/object/attachments/u1/")
                    .header("content-type", "text/plain")
                    .body("lecture notes");
                then.status(200).json_body(json!({}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/attachments")
                    .body_contains("\"size_bytes\":13");
                then.status(201).json_body(json!([{ "id": "a2" }]));
            })
            .await;

        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"lecture notes").unwrap();

        let client = client_for(&server);
        let parent = AttachmentParent::Message("m1".to_string());
        AttachmentService::upload_attachment(&client, "u1", file.path(), &parent)
            .await
            .unwrap();
        upload.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_row_insert_removes_object() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains("/storage/v1/object/attachments/u1/");
                then.status(200).json_body(json!({}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/rest/v1/attachments");
                then.status(403).json_body(json!({ "message": "row-level security" }));
            })
            .await;
        let removal = server
            .mock_async(|when, then| {
                when.method(DELETE).path_contains("/storage/v1/object/attachments/u1/");
                then.status(200).json_body(json!({}));
            })
            .await;

        let client = client_for(&server);
        let image = png_file(16, 16);
        let parent = AttachmentParent::Task("t1".to_string());
        let result = AttachmentService::upload_attachment(&client, "u1", image.path(), &parent).await;
        assert!(matches!(result, Err(AppError::Api { status: 403, .. })));
        removal.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_attachments() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/attachments")
                    .query_param("note_id", "eq.n1");
                then.status(200).json_body(json!([{ "id": "a1" }]));
            })
            .await;

        let client = client_for(&server);
        let parent = AttachmentParent::Note("n1".to_string());
        let rows = AttachmentService::list_attachments(&client, &parent).await.unwrap();
        mock.assert_async().await;
        assert_eq!(rows.len(), 1);
    }
}

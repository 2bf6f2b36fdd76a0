//! Group chat.
use super::{now_iso, require_id};
use crate::backend::{Query, SupabaseClient};
use crate::constants::{DEFAULT_MESSAGE_PAGE_SIZE, GROUP_MESSAGES_TABLE};
use crate::error::{AppError, AppResult};
use crate::models::GroupMessage;
use crate::utils::time::can_edit_message;

pub struct MessageService;

/// Sender-only, and only while the edit window is open.
fn check_can_modify(message: &GroupMessage, user_id: &str) -> AppResult<()> {
    if message.sender_id.as_deref() != Some(user_id) {
        return Err(AppError::PermissionDenied(
            "Only the sender can change a message".to_string(),
        ));
    }
    let sent_at = message.created_at.as_deref().unwrap_or_default();
    if !can_edit_message(sent_at) {
        return Err(AppError::PermissionDenied(
            "Messages can only be changed shortly after sending".to_string(),
        ));
    }
    Ok(())
}

fn clean_content(content: &str) -> AppResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("Message is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

impl MessageService {
    /// The latest `limit` messages, oldest first.
    pub async fn list_messages(
        client: &SupabaseClient,
        group_id: &str,
        limit: Option<usize>,
    ) -> AppResult<Vec<GroupMessage>> {
        let mut messages: Vec<GroupMessage> = client
            .select(
                GROUP_MESSAGES_TABLE,
                &Query::new()
                    .eq("group_id", group_id)
                    .order("created_at", false)
                    .limit(limit.unwrap_or(DEFAULT_MESSAGE_PAGE_SIZE)),
            )
            .await?;
        messages.reverse();
        Ok(messages)
    }

    pub async fn send_message(
        client: &SupabaseClient,
        group_id: &str,
        sender_id: &str,
        content: &str,
    ) -> AppResult<GroupMessage> {
        let row = GroupMessage {
            group_id: Some(group_id.to_string()),
            sender_id: Some(sender_id.to_string()),
            content: Some(clean_content(content)?),
            is_edited: Some(false),
            ..Default::default()
        };
        client.insert(GROUP_MESSAGES_TABLE, &row).await
    }

    pub async fn edit_message(
        client: &SupabaseClient,
        message: &GroupMessage,
        user_id: &str,
        new_content: &str,
    ) -> AppResult<GroupMessage> {
        let id = require_id(message.id.as_deref(), "Message")?;
        check_can_modify(message, user_id)?;
        let content = clean_content(new_content)?;

        let patch = GroupMessage {
            content: Some(content),
            is_edited: Some(true),
            updated_at: Some(now_iso()),
            ..Default::default()
        };
        let rows: Vec<GroupMessage> = client
            .update(GROUP_MESSAGES_TABLE, &Query::new().eq("id", id), &patch)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Message {}", id)))
    }

    pub async fn delete_message(
        client: &SupabaseClient,
        message: &GroupMessage,
        user_id: &str,
    ) -> AppResult<()> {
        let id = require_id(message.id.as_deref(), "Message")?;
        check_can_modify(message, user_id)?;
        client
            .delete(GROUP_MESSAGES_TABLE, &Query::new().eq("id", id))
            .await
    }
}

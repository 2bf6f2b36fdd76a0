use super::{now_iso, require_id};
use crate::backend::{Query, SupabaseClient};
use crate::constants::NOTES_TABLE;
use crate::error::{AppError, AppResult};
use crate::models::Note;

pub struct NoteService;

fn has_body(note: &Note) -> bool {
    [note.title.as_deref(), note.content.as_deref()]
        .iter()
        .flatten()
        .any(|s| !s.trim().is_empty())
}

impl NoteService {
    /// Most recently edited first.
    pub async fn list_notes(client: &SupabaseClient, user_id: &str) -> AppResult<Vec<Note>> {
        client
            .select(
                NOTES_TABLE,
                &Query::new().eq("user_id", user_id).order("updated_at", false),
            )
            .await
    }

    pub async fn create_note(client: &SupabaseClient, note: &Note) -> AppResult<Note> {
        require_id(note.user_id.as_deref(), "Note owner")?;
        if !has_body(note) {
            return Err(AppError::InvalidInput("Note is empty".to_string()));
        }

        let now = now_iso();
        let row = Note {
            id: None,
            created_at: Some(now.clone()),
            updated_at: Some(now),
            ..note.clone()
        };
        client.insert(NOTES_TABLE, &row).await
    }

    pub async fn update_note(client: &SupabaseClient, note: &Note) -> AppResult<Note> {
        let id = require_id(note.id.as_deref(), "Note")?;
        if !has_body(note) {
            return Err(AppError::InvalidInput("Note is empty".to_string()));
        }

        let patch = Note {
            id: None,
            created_at: None,
            updated_at: Some(now_iso()),
            ..note.clone()
        };
        let rows: Vec<Note> = client
            .update(NOTES_TABLE, &Query::new().eq("id", id), &patch)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Note {}", id)))
    }

    pub async fn delete_note(client: &SupabaseClient, note_id: &str) -> AppResult<()> {
        client.delete(NOTES_TABLE, &Query::new().eq("id", note_id)).await
    }
}

use super::{discard_object, prepare_upload, require_id};
use crate::backend::storage::object_path;
use crate::backend::{Query, SupabaseClient};
use crate::constants::{AVATARS_BUCKET, USERS_TABLE};
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::utils::files::{materialize, LocalFile};
use std::path::Path;

pub struct UserService;

impl UserService {
    pub async fn get_profile(client: &SupabaseClient, user_id: &str) -> AppResult<Option<User>> {
        client
            .select_one(USERS_TABLE, &Query::new().eq("id", user_id))
            .await
    }

    /// Create or update the profile row keyed by `profile.id`.
    pub async fn save_profile(client: &SupabaseClient, profile: &User) -> AppResult<User> {
        require_id(profile.id.as_deref(), "Profile")?;
        if let Some(username) = profile.username.as_deref() {
            if username.trim().is_empty() {
                return Err(AppError::InvalidInput("Username cannot be blank".to_string()));
            }
        }
        client.upsert(USERS_TABLE, profile).await
    }

    /// Compress and upload a new avatar, then point the profile at it.
    pub async fn upload_avatar(
        client: &SupabaseClient,
        user_id: &str,
        image_path: &Path,
    ) -> AppResult<User> {
        let payload = prepare_upload(image_path).await?;
        let key = object_path(user_id, &payload.extension);
        client
            .upload(AVATARS_BUCKET, &key, payload.bytes, &payload.content_type)
            .await?;
        let url = client.public_url(AVATARS_BUCKET, &key);

        let updated = client
            .update::<_, User>(
                USERS_TABLE,
                &Query::new().eq("id", user_id),
                &serde_json::json!({ "avatar_url": url }),
            )
            .await
            .and_then(|rows| {
                rows.into_iter()
                    .next()
                    .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
            });
        if updated.is_err() {
            discard_object(client, AVATARS_BUCKET, &key).await;
        }
        updated
    }

    /// Fetch the avatar to a local file. `None` when there is no avatar or the download fails.
    pub async fn download_avatar(profile: &User) -> Option<LocalFile> {
        let url = profile.avatar_url.as_deref().filter(|u| !u.is_empty())?;
        materialize(url).await
    }
}

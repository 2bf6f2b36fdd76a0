//! Object storage (`/storage/v1/object/...`).
use super::{check_response, SupabaseClient};
use crate::constants::STORAGE_PATH;
use crate::error::AppResult;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use uuid::Uuid;

/// Unique object key under the owner's folder, e.g. `u1/6f0c….jpg`.
pub fn object_path(owner_id: &str, extension: &str) -> String {
    format!(
        "{}/{}.{}",
        owner_id,
        Uuid::new_v4(),
        extension.trim_start_matches('.')
    )
}

fn object_endpoint(bucket: &str, path: &str) -> String {
    format!("{}/object/{}/{}", STORAGE_PATH, bucket, path.trim_start_matches('/'))
}

impl SupabaseClient {
    /// Upload (or overwrite) an object. Returns the object key.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<String> {
        let size = bytes.len();
        let response = self
            .request(Method::POST, &object_endpoint(bucket, path))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        check_response(response).await?;
        log::info!("Uploaded {} bytes to {}/{}", size, bucket, path);
        Ok(path.to_string())
    }

    pub async fn download(&self, bucket: &str, path: &str) -> AppResult<Vec<u8>> {
        let response = self
            .request(Method::GET, &object_endpoint(bucket, path))
            .send()
            .await?;
        let response = check_response(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn remove_object(&self, bucket: &str, path: &str) -> AppResult<()> {
        let response = self
            .request(Method::DELETE, &object_endpoint(bucket, path))
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    /// URL for objects in public buckets. No request is made.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        self.config().endpoint(&format!(
            "{}/object/public/{}/{}",
            STORAGE_PATH,
            bucket,
            path.trim_start_matches('/')
        ))
    }
}

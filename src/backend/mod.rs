//! Thin typed client for the hosted backend: auth, REST tables and object storage.
pub mod auth;
pub mod rest;
pub mod storage;

pub use auth::*;
pub use rest::Query;

use crate::config::BackendConfig;
use crate::error::{AppError, AppResult};
use once_cell::sync::Lazy;
use reqwest::{Method, RequestBuilder, Response};
use std::sync::RwLock;
use std::time::Duration;

/// Shared HTTP client so every request reuses the same connection pool.
pub static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(5)
        .build()
        .unwrap_or_else(|e| {
            log::error!("Failed to build HTTP client, using defaults: {}", e);
            reqwest::Client::new()
        })
});

/// Backend handle. Sends the anon key until a session token is installed.
pub struct SupabaseClient {
    config: BackendConfig,
    http: reqwest::Client,
    access_token: RwLock<Option<String>>,
}

impl SupabaseClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            http: HTTP_CLIENT.clone(),
            access_token: RwLock::new(None),
        }
    }

    pub fn from_env() -> AppResult<Self> {
        Ok(Self::new(BackendConfig::from_env()?))
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.access_token.write() {
            *slot = token;
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().ok().and_then(|slot| slot.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.access_token().is_some()
    }

    fn bearer(&self) -> String {
        self.access_token()
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.endpoint(path))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
    }
}

/// Pull a readable message out of a backend error body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}

/// Turn non-2xx responses into [`AppError::Api`].
pub(crate) async fn check_response(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    log::warn!("Backend request failed ({}): {}", status, message);
    Err(AppError::Api {
        status: status.as_u16(),
        message,
    })
}

//! Backend configuration loaded from the environment.
use crate::constants::{SUPABASE_ANON_KEY_VAR, SUPABASE_URL_VAR};
use crate::error::{AppError, AppResult};
use url::Url;

extern crate dotenv;

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project base URL, without a trailing slash.
    pub url: String,
    /// Publishable (anon) API key.
    pub anon_key: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> AppResult<Self> {
        let url = url.into();
        let anon_key = anon_key.into();

        let parsed = Url::parse(&url)
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", SUPABASE_URL_VAR, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "{} must be an http(s) URL, got {}",
                SUPABASE_URL_VAR,
                parsed.scheme()
            )));
        }
        if anon_key.trim().is_empty() {
            return Err(AppError::Config(format!("{} is empty", SUPABASE_ANON_KEY_VAR)));
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY`, loading a `.env` file first if present.
    pub fn from_env() -> AppResult<Self> {
        if let Err(e) = dotenv::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }

        let url = std::env::var(SUPABASE_URL_VAR)
            .map_err(|_| AppError::Config(format!("Missing {}", SUPABASE_URL_VAR)))?;
        let key = std::env::var(SUPABASE_ANON_KEY_VAR)
            .map_err(|_| AppError::Config(format!("Missing {}", SUPABASE_ANON_KEY_VAR)))?;

        Self::new(url, key)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }
}

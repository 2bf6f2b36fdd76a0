use super::types::Preferences;
use crate::backend::{is_token_expired, Session, SupabaseClient};
use crate::constants::{APP_DIR_NAME, PREFERENCES_FILE, SESSION_FILE};
use crate::error::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// JSON-file backed preference store with an in-memory cache.
///
/// Also keeps the signed-in session on disk while "remember me" is on.
pub struct PreferenceStore {
    dir: PathBuf,
    cache: Mutex<Option<Preferences>>,
}

impl PreferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(None),
        }
    }

    /// Store under the platform data directory (e.g. `~/.local/share/pam1`).
    pub fn default_location() -> AppResult<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| AppError::Config("No data directory on this platform".to_string()))?;
        Ok(Self::new(base.join(APP_DIR_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn preferences_path(&self) -> PathBuf {
        self.dir.join(PREFERENCES_FILE)
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Load preferences, falling back to defaults when the file is missing or unreadable.
    pub fn load(&self) -> Preferences {
        if let Ok(cache) = self.cache.lock() {
            if let Some(prefs) = cache.as_ref() {
                return prefs.clone();
            }
        }

        let path = self.preferences_path();
        let prefs = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt preferences file {:?}: {}", path, e);
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        };

        if let Ok(mut cache) = self.cache.lock() {
            *cache = Some(prefs.clone());
        }
        prefs
    }

    pub fn save(&self, prefs: &Preferences) -> AppResult<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(prefs)?;
        fs::write(self.preferences_path(), json)?;

        if let Ok(mut cache) = self.cache.lock() {
            *cache = Some(prefs.clone());
        }
        Ok(())
    }

    /// Drop the cache so the next read goes to disk.
    pub fn refresh_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
    }

    pub fn remember_me(&self) -> bool {
        self.load().remember_me
    }

    /// Turning "remember me" off also forgets any stored session.
    pub fn set_remember_me(&self, value: bool) -> AppResult<()> {
        let mut prefs = self.load();
        prefs.remember_me = value;
        self.save(&prefs)?;
        if !value {
            self.clear_session()?;
        }
        Ok(())
    }

    /// Persist the session if "remember me" is on. Returns whether it was written.
    pub fn store_session(&self, session: &Session) -> AppResult<bool> {
        if !self.remember_me() {
            return Ok(false);
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.session_path();
        fs::write(&path, serde_json::to_string(session)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(true)
    }

    pub fn stored_session(&self) -> Option<Session> {
        let raw = fs::read_to_string(self.session_path()).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("Discarding corrupt session file: {}", e);
                self.forget_session();
                None
            }
        }
    }

    pub fn clear_session(&self) -> AppResult<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// The stored session, if "remember me" is on and its token is still valid.
    /// Anything else is cleared.
    pub fn restore_session(&self) -> Option<Session> {
        let session = self.remembered_session()?;
        if session_expired(&session) {
            log::info!("Stored session has expired");
            self.forget_session();
            return None;
        }
        Some(session)
    }

    fn remembered_session(&self) -> Option<Session> {
        if !self.remember_me() {
            self.forget_session();
            return None;
        }
        self.stored_session()
    }

    fn forget_session(&self) {
        if let Err(e) = self.clear_session() {
            log::warn!("Failed to clear stored session: {}", e);
        }
    }

    /// Like [`restore_session`](Self::restore_session) but refreshes an expired
    /// token instead of discarding it. Installs the session on `client`.
    pub async fn resume_session(&self, client: &SupabaseClient) -> Option<Session> {
        let session = self.remembered_session()?;
        if !session_expired(&session) {
            client.use_session(&session);
            return Some(session);
        }

        match client.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                if let Err(e) = self.store_session(&refreshed) {
                    log::warn!("Failed to store refreshed session: {}", e);
                }
                Some(refreshed)
            }
            Err(e) => {
                log::warn!("Could not refresh stored session: {}", e);
                self.forget_session();
                None
            }
        }
    }
}

fn session_expired(session: &Session) -> bool {
    match is_token_expired(&session.access_token) {
        Ok(expired) => expired,
        Err(_) => match session.expires_at {
            Some(at) => at <= chrono::Utc::now().timestamp(),
            None => true,
        },
    }
}

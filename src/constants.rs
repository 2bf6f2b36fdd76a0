//! Shared constants used across the crate.

// Backend environment variables
pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";

// Backend API prefixes
pub const REST_PATH: &str = "/rest/v1";
pub const AUTH_PATH: &str = "/auth/v1";
pub const STORAGE_PATH: &str = "/storage/v1";

// Table names
pub const USERS_TABLE: &str = "users";
pub const TASKS_TABLE: &str = "tasks";
pub const NOTES_TABLE: &str = "notes";
pub const EXPENSES_TABLE: &str = "expenses";
pub const STUDY_GROUPS_TABLE: &str = "study_groups";
pub const GROUP_MEMBERS_TABLE: &str = "group_members";
pub const INVITES_TABLE: &str = "invites";
pub const GROUP_MESSAGES_TABLE: &str = "group_messages";
pub const ATTACHMENTS_TABLE: &str = "attachments";

// Storage buckets
pub const AVATARS_BUCKET: &str = "avatars";
pub const ATTACHMENTS_BUCKET: &str = "attachments";

// Local persistence
pub const APP_DIR_NAME: &str = "pam1";
pub const PREFERENCES_FILE: &str = "preferences.json";
pub const SESSION_FILE: &str = "session.json";

// Image normalization
pub const MAX_IMAGE_WIDTH: u32 = 1024;
pub const MAX_IMAGE_HEIGHT: u32 = 1024;
pub const JPEG_QUALITY: u8 = 80;

// Chat
pub const DEFAULT_EDIT_WINDOW_MINUTES: i64 = 15;
pub const DEFAULT_MESSAGE_PAGE_SIZE: usize = 50;

// Invite codes
pub const DEFAULT_INVITE_CODE_LENGTH: usize = 8;
pub const MIN_INVITE_CODE_LENGTH: usize = 6;
pub const INVITE_EXPIRY_DAYS: i64 = 7;

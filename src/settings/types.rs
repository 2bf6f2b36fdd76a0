use serde::{Deserialize, Serialize};

/// Locally persisted preferences. Unknown keys in the file are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Keep the user signed in across restarts.
    #[serde(default)]
    pub remember_me: bool,
}

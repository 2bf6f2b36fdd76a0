pub mod service;
pub mod types;

pub use service::PreferenceStore;
pub use types::Preferences;

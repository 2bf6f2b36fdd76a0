//! Client core for the PAM_1 study-group app: backend access, feature
//! services, local preferences and media helpers.
pub mod backend;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod settings;
pub mod utils;

pub use backend::SupabaseClient;
pub use config::BackendConfig;
pub use error::{AppError, AppResult};
pub use settings::PreferenceStore;

/// Install the `env_logger` backend for the `log` facade. Honors `RUST_LOG`,
/// defaulting to `info`. Safe to call more than once.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        log::debug!("Logger already initialized: {}", e);
    }
}

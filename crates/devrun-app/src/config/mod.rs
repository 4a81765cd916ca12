//! Configuration handling for devrun
//!
//! Supports:
//! - `.devrun/config.toml` - Tool settings
//! - `app.json` - Project config, validated before a run
//! - `.devrun/generated.json` - Runtime config written for the app

pub mod generate;
pub mod settings;
pub mod types;
pub mod validate;

pub use generate::{
    detect_lan_ip, generate_config, generated_config_path, packager_host, GenerateOptions,
    GeneratedConfig,
};
pub use settings::{load_settings, settings_path, DEVRUN_DIR};
pub use types::*;
pub use validate::{is_reverse_dns, validate_project};

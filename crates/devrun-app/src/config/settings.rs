//! Settings parser for .devrun/config.toml

use std::path::{Path, PathBuf};

use devrun_core::prelude::*;

use super::types::Settings;

const CONFIG_FILENAME: &str = "config.toml";

/// Per-project directory for devrun files (settings, generated config)
pub const DEVRUN_DIR: &str = ".devrun";

pub fn settings_path(project_path: &Path) -> PathBuf {
    project_path.join(DEVRUN_DIR).join(CONFIG_FILENAME)
}

/// Load settings from `.devrun/config.toml`
///
/// Never fails: a missing or malformed file yields the defaults.
pub fn load_settings(project_path: &Path) -> Settings {
    let config_path = settings_path(project_path);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_settings(dir: &Path, content: &str) {
        let devrun_dir = dir.join(DEVRUN_DIR);
        std::fs::create_dir_all(&devrun_dir).unwrap();
        std::fs::write(devrun_dir.join(CONFIG_FILENAME), content).unwrap();
    }

    #[test]
    fn test_load_settings_missing_file() {
        let temp = tempdir().unwrap();
        assert_eq!(load_settings(temp.path()), Settings::default());
    }

    #[test]
    fn test_load_settings_from_file() {
        let temp = tempdir().unwrap();
        write_settings(
            temp.path(),
            r#"
[packager]
command = ["yarn", "start"]
poll_interval_ms = 250

[android]
main_activity = "com.example.app.LaunchActivity"
"#,
        );

        let settings = load_settings(temp.path());
        assert_eq!(settings.packager.command, vec!["yarn", "start"]);
        assert_eq!(settings.packager.poll_interval_ms, 250);
        assert_eq!(settings.packager.ready_timeout_secs, 120);
        assert_eq!(
            settings.android.main_activity,
            "com.example.app.LaunchActivity"
        );
    }

    #[test]
    fn test_load_settings_malformed_falls_back() {
        let temp = tempdir().unwrap();
        write_settings(temp.path(), "[packager\nready_timeout_secs = ");

        assert_eq!(load_settings(temp.path()), Settings::default());
    }
}

//! Configuration types for devrun
//!
//! Defines:
//! - `Settings` - Per-project tool settings (.devrun/config.toml)
//! - `ProjectConfig` - The app's own project config (app.json)

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use devrun_packager::{PackagerCommand, WatchConfig};

/// Tool settings (.devrun/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub packager: PackagerSettings,

    #[serde(default)]
    pub ios: IosSettings,

    #[serde(default)]
    pub android: AndroidSettings,
}

/// Packager settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PackagerSettings {
    /// Command line used to start the packager; `--port` is appended
    #[serde(default = "default_packager_command")]
    pub command: Vec<String>,

    /// Seconds to wait for the packager to accept connections
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,

    /// Delay between liveness probes in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for PackagerSettings {
    fn default() -> Self {
        Self {
            command: default_packager_command(),
            ready_timeout_secs: default_ready_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl PackagerSettings {
    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            ready_timeout: Duration::from_secs(self.ready_timeout_secs),
            // A zero interval would spin the poll loop
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(10)),
        }
    }

    /// Falls back to the default command when `command` is empty
    pub fn packager_command(&self) -> PackagerCommand {
        PackagerCommand::from_parts(&self.command).unwrap_or_default()
    }
}

fn default_packager_command() -> Vec<String> {
    let default = PackagerCommand::default();
    std::iter::once(default.program)
        .chain(default.args)
        .collect()
}

fn default_ready_timeout_secs() -> u64 {
    devrun_packager::DEFAULT_READY_TIMEOUT.as_secs()
}

fn default_poll_interval_ms() -> u64 {
    devrun_packager::DEFAULT_POLL_INTERVAL.as_millis() as u64
}

/// iOS settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IosSettings {
    /// Simulator name used when no devices are given on the command line
    #[serde(default)]
    pub default_simulator: Option<String>,
}

/// Android settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AndroidSettings {
    /// Activity launched when app.json does not name one
    #[serde(default = "default_main_activity")]
    pub main_activity: String,
}

impl Default for AndroidSettings {
    fn default() -> Self {
        Self {
            main_activity: default_main_activity(),
        }
    }
}

fn default_main_activity() -> String {
    ".MainActivity".to_string()
}

/// Project config (app.json)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub ios: Option<IosProjectConfig>,

    #[serde(default)]
    pub android: Option<AndroidProjectConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IosProjectConfig {
    #[serde(default)]
    pub bundle_identifier: String,

    /// Defaults to the project name
    #[serde(default)]
    pub scheme: Option<String>,

    /// `.xcworkspace` path relative to the project root
    #[serde(default)]
    pub workspace: Option<PathBuf>,

    /// `.xcodeproj` path, used when there is no workspace
    #[serde(default)]
    pub project: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidProjectConfig {
    #[serde(default)]
    pub package: String,

    #[serde(default)]
    pub main_activity: Option<String>,
}

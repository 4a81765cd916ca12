//! Command line arguments

use std::path::PathBuf;

use clap::Parser;

use devrun_core::{DeviceSelector, NativeBuildType, Platform, RunConfig, DEFAULT_PACKAGER_PORT};

/// devrun - Build, install and launch a mobile app with a managed packager
#[derive(Parser, Debug)]
#[command(name = "devrun", version)]
#[command(
    about = "Build, install and launch a mobile app on iOS and Android with a managed packager",
    long_about = None
)]
pub struct Args {
    /// Project root
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Build and launch on iOS simulators
    #[arg(short = 'i', long)]
    pub run_ios: bool,

    /// Build and launch on Android devices
    #[arg(short = 'a', long)]
    pub run_android: bool,

    /// Keep the installed app instead of uninstalling it first
    #[arg(short = 'U', long)]
    pub disable_uninstall: bool,

    /// Native build type: dev or release
    #[arg(short = 'n', long, value_name = "TYPE", default_value = "dev")]
    pub native_build_type: NativeBuildType,

    /// Project config to use instead of <PATH>/app.json
    #[arg(short = 'p', long, value_name = "FILE")]
    pub custom_config_json: Option<PathBuf>,

    /// Comma-separated simulator names
    #[arg(long, value_delimiter = ',', conflicts_with = "ios_udids")]
    pub ios_devices: Vec<String>,

    /// Comma-separated simulator UDIDs
    #[arg(long, value_delimiter = ',')]
    pub ios_udids: Vec<String>,

    /// Do not start the packager (reuse one that is already running)
    #[arg(short = 'P', long)]
    pub no_packager: bool,

    /// Start the packager with a clean cache
    #[arg(long)]
    pub reset_cache: bool,

    /// Port the packager listens on
    #[arg(long, default_value_t = DEFAULT_PACKAGER_PORT)]
    pub packager_port: u16,

    /// Write 127.0.0.1 instead of the LAN address into the generated config
    #[arg(long)]
    pub force_localhost: bool,
}

impl Args {
    /// Build the run configuration rooted at `root_dir`
    pub fn into_run_config(self, root_dir: PathBuf) -> RunConfig {
        let mut config = RunConfig::new(root_dir);

        if let Some(custom) = self.custom_config_json {
            config.config_path = if custom.is_absolute() {
                custom
            } else {
                config.root_dir.join(custom)
            };
        }
        if self.run_ios {
            config.platforms.insert(Platform::Ios);
        }
        if self.run_android {
            config.platforms.insert(Platform::Android);
        }

        config.build_type = self.native_build_type;
        config.ios_devices =
            DeviceSelector::from_lists(trimmed(self.ios_devices), trimmed(self.ios_udids));
        config.skip_uninstall = self.disable_uninstall;
        config.packager_port = self.packager_port;
        config.reset_cache = self.reset_cache;
        config.no_packager = self.no_packager;
        config.force_localhost = self.force_localhost;
        config
    }
}

fn trimmed(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

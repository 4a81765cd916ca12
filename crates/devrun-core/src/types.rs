//! Domain types shared by every devrun crate

use std::collections::BTreeSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default port the packager listens on
pub const DEFAULT_PACKAGER_PORT: u16 = 8081;

/// Default project config file, relative to the project root
pub const DEFAULT_CONFIG_FILE: &str = "app.json";

// ─────────────────────────────────────────────────────────────────
// Platform / Build Type
// ─────────────────────────────────────────────────────────────────

/// Target platform for a native run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => write!(f, "iOS"),
            Platform::Android => write!(f, "Android"),
        }
    }
}

/// Native build variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeBuildType {
    #[default]
    Dev,
    Release,
}

impl NativeBuildType {
    /// Xcode configuration / Gradle variant name ("Debug" or "Release")
    pub fn variant(&self) -> &'static str {
        match self {
            NativeBuildType::Dev => "Debug",
            NativeBuildType::Release => "Release",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NativeBuildType::Dev => "dev",
            NativeBuildType::Release => "release",
        }
    }
}

impl fmt::Display for NativeBuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NativeBuildType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "debug" => Ok(NativeBuildType::Dev),
            "release" => Ok(NativeBuildType::Release),
            other => Err(Error::config_invalid(format!(
                "unknown native build type '{}' (expected 'dev' or 'release')",
                other
            ))),
        }
    }
}

/// How iOS target devices are chosen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// A single simulator picked by platform default
    #[default]
    Default,
    /// Explicit device names
    Names(Vec<String>),
    /// Explicit device UDIDs
    Udids(Vec<String>),
}

impl DeviceSelector {
    /// Build a selector from the raw name / UDID lists. UDIDs win if both are given.
    pub fn from_lists(names: Vec<String>, udids: Vec<String>) -> Self {
        if !udids.is_empty() {
            DeviceSelector::Udids(udids)
        } else if !names.is_empty() {
            DeviceSelector::Names(names)
        } else {
            DeviceSelector::Default
        }
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSelector::Default => write!(f, "default simulator"),
            DeviceSelector::Names(names) => write!(f, "names [{}]", names.join(", ")),
            DeviceSelector::Udids(udids) => write!(f, "udids [{}]", udids.join(", ")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Run Configuration
// ─────────────────────────────────────────────────────────────────

/// Immutable input to one orchestration run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub root_dir: PathBuf,
    pub config_path: PathBuf,
    pub platforms: BTreeSet<Platform>,
    pub build_type: NativeBuildType,
    pub ios_devices: DeviceSelector,
    pub skip_uninstall: bool,
    pub packager_port: u16,
    pub reset_cache: bool,
    pub no_packager: bool,
    pub force_localhost: bool,
}

impl RunConfig {
    /// Defaults for a project root: no platforms, dev build, port 8081
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        let root_dir = root_dir.into();
        Self {
            config_path: root_dir.join(DEFAULT_CONFIG_FILE),
            root_dir,
            platforms: BTreeSet::new(),
            build_type: NativeBuildType::default(),
            ios_devices: DeviceSelector::default(),
            skip_uninstall: false,
            packager_port: DEFAULT_PACKAGER_PORT,
            reset_cache: false,
            no_packager: false,
            force_localhost: false,
        }
    }

    pub fn endpoint(&self) -> PackagerEndpoint {
        PackagerEndpoint::localhost(self.packager_port)
    }

    pub fn wants(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }
}

// ─────────────────────────────────────────────────────────────────
// Packager
// ─────────────────────────────────────────────────────────────────

/// Where the packager is expected to listen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerEndpoint {
    pub host: IpAddr,
    pub port: u16,
}

impl PackagerEndpoint {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self { host, port }
    }

    pub fn localhost(port: u16) -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl fmt::Display for PackagerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

/// Lifecycle of the packager endpoint as seen by the watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackagerState {
    #[default]
    Down,
    Starting,
    Up,
    Failed,
}

impl PackagerState {
    /// Up and Failed never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, PackagerState::Up | PackagerState::Failed)
    }

    /// Only Down→Starting, Starting→Up and Starting→Failed are allowed
    pub fn can_transition_to(&self, next: PackagerState) -> bool {
        matches!(
            (self, next),
            (PackagerState::Down, PackagerState::Starting)
                | (PackagerState::Starting, PackagerState::Up)
                | (PackagerState::Starting, PackagerState::Failed)
        )
    }
}

impl fmt::Display for PackagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PackagerState::Down => "down",
            PackagerState::Starting => "starting",
            PackagerState::Up => "up",
            PackagerState::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ─────────────────────────────────────────────────────────────────
// Platform Task Results
// ─────────────────────────────────────────────────────────────────

/// Outcome of one platform runner
#[derive(Debug)]
pub enum PlatformTaskResult {
    Success,
    Failed(Error),
}

impl PlatformTaskResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PlatformTaskResult::Success)
    }
}

impl From<Result<(), Error>> for PlatformTaskResult {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => PlatformTaskResult::Success,
            Err(e) => PlatformTaskResult::Failed(e),
        }
    }
}

/// A platform paired with the result of its runner
#[derive(Debug)]
pub struct PlatformReport {
    pub platform: Platform,
    pub result: PlatformTaskResult,
}

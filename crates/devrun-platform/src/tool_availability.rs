//! Tool availability checking for native toolchains
//!
//! Resolves the external binaries the platform runners drive: `xcrun` and
//! `xcodebuild` for iOS, `adb` for Android.

use std::path::{Path, PathBuf};

use devrun_core::prelude::*;

/// Resolved paths of external tools (None when unavailable)
#[derive(Debug, Clone, Default)]
pub struct ToolAvailability {
    /// `xcrun` (macOS with Xcode)
    pub xcrun: Option<PathBuf>,

    /// `xcodebuild` (macOS with Xcode)
    pub xcodebuild: Option<PathBuf>,

    /// `adb` from the Android SDK platform-tools
    pub adb: Option<PathBuf>,
}

impl ToolAvailability {
    /// Check tool availability (run once per invocation)
    pub fn check() -> Self {
        let availability = Self {
            xcrun: which::which("xcrun").ok(),
            xcodebuild: which::which("xcodebuild").ok(),
            adb: Self::find_adb(),
        };
        debug!("Tool availability: {:?}", availability);
        availability
    }

    /// `adb` from the SDK env vars first, then PATH
    fn find_adb() -> Option<PathBuf> {
        Self::adb_candidates()
            .into_iter()
            .find(|path| path.is_file())
            .or_else(|| which::which("adb").ok())
    }

    /// SDK locations to try for `adb`
    fn adb_candidates() -> Vec<PathBuf> {
        let binary = if cfg!(windows) { "adb.exe" } else { "adb" };

        ["ANDROID_HOME", "ANDROID_SDK_ROOT"]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .map(|sdk| PathBuf::from(sdk).join("platform-tools").join(binary))
            .collect()
    }

    pub fn require_xcrun(&self) -> Result<&Path> {
        self.xcrun
            .as_deref()
            .ok_or_else(|| Error::tool_not_found("xcrun"))
    }

    pub fn require_xcodebuild(&self) -> Result<&Path> {
        self.xcodebuild
            .as_deref()
            .ok_or_else(|| Error::tool_not_found("xcodebuild"))
    }

    pub fn require_adb(&self) -> Result<&Path> {
        self.adb.as_deref().ok_or_else(|| Error::tool_not_found("adb"))
    }

    /// Get user-friendly message for unavailable iOS tools
    pub fn ios_unavailable_message(&self) -> Option<&'static str> {
        if self.xcrun.is_some() && self.xcodebuild.is_some() {
            None
        } else if cfg!(target_os = "macos") {
            Some("Xcode not installed. Install Xcode to build and run on iOS simulators.")
        } else {
            Some("iOS builds are only available on macOS.")
        }
    }

    /// Get user-friendly message for unavailable Android tools
    pub fn android_unavailable_message(&self) -> Option<&'static str> {
        if self.adb.is_some() {
            None
        } else {
            Some("adb not found. Set ANDROID_HOME or install the Android SDK platform-tools.")
        }
    }
}

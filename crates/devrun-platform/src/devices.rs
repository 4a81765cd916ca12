//! Android device discovery via `adb devices -l`

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use devrun_core::prelude::*;

use crate::commands::run_tool;

/// `model:Pixel_7` in the trailing key/value list of `adb devices -l`
static MODEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmodel:(\S+)").expect("Invalid model pattern regex"));

/// A device attached to adb (physical or emulator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidDevice {
    pub serial: String,
    /// adb state: "device", "offline", "unauthorized", ...
    pub state: String,
    pub model: Option<String>,
}

impl AndroidDevice {
    /// Ready to receive installs
    pub fn is_online(&self) -> bool {
        self.state == "device"
    }

    pub fn is_emulator(&self) -> bool {
        self.serial.starts_with("emulator-")
    }

    pub fn display_name(&self) -> &str {
        self.model.as_deref().unwrap_or(&self.serial)
    }
}

/// List devices known to adb, including offline ones
pub async fn list_android_devices(adb: &Path) -> Result<Vec<AndroidDevice>> {
    let output = run_tool(adb, ["devices", "-l"], None).await?;
    Ok(parse_adb_devices(&output.stdout))
}

/// Parse `adb devices -l` output
///
/// ```text
/// List of devices attached
/// emulator-5554          device product:sdk_gphone64 model:sdk_gphone64_arm64 device:emu64a
/// 1A2B3C4D               unauthorized usb:1-1 transport_id:2
/// ```
pub fn parse_adb_devices(output: &str) -> Vec<AndroidDevice> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            let model = MODEL_PATTERN
                .captures(line)
                .map(|c| c[1].replace('_', " "));
            Some(AndroidDevice {
                serial: serial.to_string(),
                state: state.to_string(),
                model,
            })
        })
        .collect()
}

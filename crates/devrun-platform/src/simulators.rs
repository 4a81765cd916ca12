//! iOS simulator discovery and target resolution using xcrun simctl

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{sleep, Instant};

use devrun_core::prelude::*;
use devrun_core::{DeviceSelector, Platform};

use crate::commands::run_tool;

/// How long to wait for a simulator to report Booted
const BOOT_TIMEOUT: Duration = Duration::from_secs(60);

const BOOT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// An available iOS simulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IosSimulator {
    pub udid: String,
    pub name: String,
    pub runtime: String, // e.g., "iOS 17.2"
    pub state: SimulatorState,
}

impl IosSimulator {
    pub fn is_booted(&self) -> bool {
        self.state == SimulatorState::Booted
    }

    pub fn is_iphone(&self) -> bool {
        self.name.starts_with("iPhone")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorState {
    Shutdown,
    Booted,
    Booting,
    Unknown,
}

impl From<&str> for SimulatorState {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "shutdown" => SimulatorState::Shutdown,
            "booted" => SimulatorState::Booted,
            "booting" => SimulatorState::Booting,
            _ => SimulatorState::Unknown,
        }
    }
}

/// JSON output from `xcrun simctl list devices -j`
#[derive(Debug, Deserialize)]
struct SimctlOutput {
    devices: HashMap<String, Vec<SimctlDevice>>,
}

#[derive(Debug, Deserialize)]
struct SimctlDevice {
    udid: String,
    name: String,
    state: String,
    #[serde(rename = "isAvailable")]
    is_available: Option<bool>,
}

/// List available iOS simulators, newest runtime first
pub async fn list_ios_simulators(xcrun: &Path) -> Result<Vec<IosSimulator>> {
    let output = run_tool(xcrun, ["simctl", "list", "devices", "-j"], None).await?;
    parse_simctl_output(&output.stdout)
}

/// Parse `simctl list devices -j`, keeping available iOS simulators only
pub fn parse_simctl_output(json: &str) -> Result<Vec<IosSimulator>> {
    let parsed: SimctlOutput = serde_json::from_str(json)?;

    let mut simulators: Vec<IosSimulator> = parsed
        .devices
        .into_iter()
        .map(|(key, devices)| (parse_runtime_name(&key), devices))
        .filter(|(runtime, _)| runtime.starts_with("iOS"))
        .flat_map(|(runtime, devices)| {
            devices
                .into_iter()
                .filter(|d| d.is_available != Some(false))
                .map(move |d| IosSimulator {
                    udid: d.udid,
                    name: d.name,
                    runtime: runtime.clone(),
                    state: SimulatorState::from(d.state.as_str()),
                })
        })
        .collect();

    // Newest runtime first, then by name
    simulators.sort_by(|a, b| {
        runtime_version(&b.runtime)
            .cmp(&runtime_version(&a.runtime))
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(simulators)
}

/// "com.apple.CoreSimulator.SimRuntime.iOS-17-2" -> "iOS 17.2"
fn parse_runtime_name(identifier: &str) -> String {
    let suffix = identifier
        .strip_prefix("com.apple.CoreSimulator.SimRuntime.")
        .unwrap_or(identifier);

    match suffix.split_once('-') {
        Some((os_name, version)) => format!("{} {}", os_name, version.replace('-', ".")),
        None => suffix.to_string(),
    }
}

/// "iOS 17.2" -> [17, 2], so 17.x sorts above 9.x
fn runtime_version(runtime: &str) -> Vec<u32> {
    runtime
        .rsplit(' ')
        .next()
        .unwrap_or_default()
        .split('.')
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Pick the simulators a run should target.
///
/// Pure selection over an already-listed set; performs no device actions.
/// - `Names`: every name must match (case-insensitive), first match wins
/// - `Udids`: every UDID must match exactly
/// - `Default`: `default_name` if given, else the first booted iPhone, else the
///   first iPhone, else the first simulator
pub fn resolve_targets(
    simulators: &[IosSimulator],
    selector: &DeviceSelector,
    default_name: Option<&str>,
) -> Result<Vec<IosSimulator>> {
    match selector {
        DeviceSelector::Names(names) => names
            .iter()
            .map(|name| {
                simulators
                    .iter()
                    .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
                    .cloned()
                    .ok_or_else(|| Error::device_not_found(Platform::Ios, name.clone()))
            })
            .collect(),
        DeviceSelector::Udids(udids) => udids
            .iter()
            .map(|udid| {
                simulators
                    .iter()
                    .find(|s| s.udid == udid.trim())
                    .cloned()
                    .ok_or_else(|| Error::device_not_found(Platform::Ios, udid.clone()))
            })
            .collect(),
        DeviceSelector::Default => {
            let chosen = match default_name {
                Some(name) => simulators
                    .iter()
                    .find(|s| s.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| Error::device_not_found(Platform::Ios, name))?,
                None => simulators
                    .iter()
                    .find(|s| s.is_iphone() && s.is_booted())
                    .or_else(|| simulators.iter().find(|s| s.is_iphone()))
                    .or_else(|| simulators.first())
                    .ok_or_else(|| {
                        Error::device_not_found(Platform::Ios, "any available simulator")
                    })?,
            };
            Ok(vec![chosen.clone()])
        }
    }
}

/// Boot a simulator by UDID and wait until it reports Booted
pub async fn boot_simulator(xcrun: &Path, udid: &str) -> Result<()> {
    if is_simulator_booted(xcrun, udid).await? {
        return Ok(());
    }

    info!("[iOS] Booting simulator {}", udid);
    match run_tool(xcrun, ["simctl", "boot", udid], None).await {
        Ok(_) => {}
        // "Unable to boot device in current state: Booted" is not an error
        Err(Error::ToolFailed { stderr, .. }) if stderr.contains("Booted") => {}
        Err(e) => return Err(e),
    }

    wait_for_simulator_boot(xcrun, udid, BOOT_TIMEOUT).await?;

    // Bring the Simulator UI forward; purely cosmetic
    if let Err(e) = run_tool("open", ["-a", "Simulator"], None).await {
        debug!("Could not open Simulator.app: {}", e);
    }

    Ok(())
}

async fn is_simulator_booted(xcrun: &Path, udid: &str) -> Result<bool> {
    let simulators = list_ios_simulators(xcrun).await?;
    Ok(simulators.iter().any(|s| s.udid == udid && s.is_booted()))
}

async fn wait_for_simulator_boot(xcrun: &Path, udid: &str, max_wait: Duration) -> Result<()> {
    let start = Instant::now();

    while start.elapsed() < max_wait {
        if is_simulator_booted(xcrun, udid).await? {
            return Ok(());
        }
        sleep(BOOT_POLL_INTERVAL).await;
    }

    Err(Error::tool_failed(
        format!("xcrun simctl boot {}", udid),
        None,
        format!("simulator did not finish booting within {:?}", max_wait),
    ))
}

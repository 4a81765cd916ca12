//! Runtime config generation (.devrun/generated.json)
//!
//! Tells the app where to reach the packager. Devices other than the local
//! simulator need the machine's LAN address rather than loopback.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use devrun_core::prelude::*;
use devrun_core::NativeBuildType;

use super::settings::DEVRUN_DIR;
use super::types::ProjectConfig;

const GENERATED_FILENAME: &str = "generated.json";

/// Inputs for [`generate_config`]
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub root_dir: PathBuf,
    pub force_localhost: bool,
    pub port: u16,
    pub build_type: NativeBuildType,
}

/// Contents of `.devrun/generated.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedConfig {
    pub name: String,
    pub packager_host: String,
    pub packager_url: String,
    pub build_type: NativeBuildType,
    pub generated_at: DateTime<Local>,
}

pub fn generated_config_path(root_dir: &Path) -> PathBuf {
    root_dir.join(DEVRUN_DIR).join(GENERATED_FILENAME)
}

/// Write the runtime config for an already validated project.
///
/// One-shot; there is no watch mode.
pub fn generate_config(
    options: &GenerateOptions,
    project: &ProjectConfig,
) -> Result<GeneratedConfig> {
    let host = packager_host(options.force_localhost);
    let packager_host = format!("{}:{}", host, options.port);

    let generated = GeneratedConfig {
        name: project.name.clone(),
        packager_url: format!("http://{}", packager_host),
        packager_host,
        build_type: options.build_type,
        generated_at: Local::now(),
    };

    let path = generated_config_path(&options.root_dir);
    write_json(&path, &generated)
        .map_err(|e| Error::config_generation(format!("cannot write {}: {}", path.display(), e)))?;

    info!("Generated {} (packager at {})", path.display(), generated.packager_host);
    Ok(generated)
}

fn write_json(path: &Path, generated: &GeneratedConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(generated)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Loopback when forced or when no LAN address can be found
pub fn packager_host(force_localhost: bool) -> IpAddr {
    let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
    if force_localhost {
        return localhost;
    }

    match detect_lan_ip() {
        Some(ip) => ip,
        None => {
            debug!("No LAN address detected, using {}", localhost);
            localhost
        }
    }
}

/// Address of the interface that routes to the internet.
///
/// Connecting a UDP socket only selects a route; no packet is sent.
pub fn detect_lan_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;
    let ip = socket.local_addr().ok()?.ip();

    (!ip.is_loopback() && !ip.is_unspecified()).then_some(ip)
}

//! Project config validation (app.json)
//!
//! Every problem is collected so the user can fix them in one pass.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use devrun_core::prelude::*;
use devrun_core::Platform;

use super::types::ProjectConfig;

/// `com.example.app`: at least two dot-separated segments, each starting with a letter
static REVERSE_DNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*(\.[A-Za-z][A-Za-z0-9_-]*)+$")
        .expect("Invalid reverse-DNS regex")
});

pub fn is_reverse_dns(id: &str) -> bool {
    REVERSE_DNS.is_match(id)
}

/// Load `config_path` and check it against the selected platforms.
pub fn validate_project(
    config_path: &Path,
    root_dir: &Path,
    platforms: &BTreeSet<Platform>,
) -> Result<ProjectConfig> {
    if !config_path.is_file() {
        return Err(Error::ConfigNotFound {
            path: config_path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(config_path)?;
    let config: ProjectConfig = serde_json::from_str(&content).map_err(|e| {
        Error::config_invalid(format!("{} is not valid JSON: {}", config_path.display(), e))
    })?;

    let issues = collect_issues(&config, root_dir, platforms);
    if !issues.is_empty() {
        return Err(Error::config_invalid(format!(
            "{}: {}",
            config_path.display(),
            issues.join("; ")
        )));
    }

    debug!("Project config {:?} is valid", config_path);
    Ok(config)
}

fn collect_issues(
    config: &ProjectConfig,
    root_dir: &Path,
    platforms: &BTreeSet<Platform>,
) -> Vec<String> {
    let mut issues = Vec::new();

    if config.name.trim().is_empty() {
        issues.push("\"name\" must not be empty".to_string());
    }

    if platforms.contains(&Platform::Ios) {
        if !root_dir.join("ios").is_dir() {
            issues.push("ios/ directory is missing".to_string());
        }

        match &config.ios {
            None => issues.push("\"ios\" section is required to run on iOS".to_string()),
            Some(ios) => {
                if !is_reverse_dns(&ios.bundle_identifier) {
                    issues.push(format!(
                        "ios.bundleIdentifier '{}' is not a reverse-DNS identifier",
                        ios.bundle_identifier
                    ));
                }
                match ios.workspace.as_ref().or(ios.project.as_ref()) {
                    None => issues.push("ios.workspace or ios.project is required".to_string()),
                    Some(path) if !root_dir.join(path).exists() => {
                        issues.push(format!("{} does not exist", path.display()))
                    }
                    Some(_) => {}
                }
            }
        }
    }

    if platforms.contains(&Platform::Android) {
        if !root_dir.join("android").is_dir() {
            issues.push("android/ directory is missing".to_string());
        }

        match &config.android {
            None => issues.push("\"android\" section is required to run on Android".to_string()),
            Some(android) if !is_reverse_dns(&android.package) => issues.push(format!(
                "android.package '{}' is not a reverse-DNS identifier",
                android.package
            )),
            Some(_) => {}
        }
    }

    issues
}

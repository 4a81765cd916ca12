//! devrun - Mobile dev build orchestrator
//!
//! This is the binary entry point. Orchestration lives in `devrun-app`; this
//! file only wires real components together and turns the outcome into an
//! exit status.

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use devrun_app::{load_settings, wait_for_signal, NativeOrchestrator};
use devrun_core::Platform;
use devrun_platform::ToolAvailability;

use cli::Args;

/// Exit status when the run is interrupted by SIGINT / SIGTERM
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();

    let base_path = args
        .path
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let root_dir = dunce::canonicalize(&base_path).unwrap_or(base_path);

    devrun_core::logging::init()?;
    info!("devrun starting in {}", root_dir.display());

    let config = args.into_run_config(root_dir);
    let settings = load_settings(&config.root_dir);
    let tools = ToolAvailability::check();

    if config.wants(Platform::Ios) {
        if let Some(message) = tools.ios_unavailable_message() {
            warn!("{}", message);
        }
    }
    if config.wants(Platform::Android) {
        if let Some(message) = tools.android_unavailable_message() {
            warn!("{}", message);
        }
    }

    let orchestrator = NativeOrchestrator::native(config, settings, tools);

    // Dropping the run future drops the packager handle, which kills it
    let outcome = tokio::select! {
        outcome = orchestrator.run() => outcome,
        _ = shutdown_signal() => {
            warn!("Interrupted, stopping");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };

    match outcome {
        Ok(success) => {
            for report in &success.reports {
                info!("[{}] App launched", report.platform);
            }

            if let Some(mut packager) = success.packager {
                info!("Packager is running. Press Ctrl+C to stop.");
                tokio::select! {
                    _ = packager.wait() => info!("Packager exited"),
                    _ = shutdown_signal() => {}
                }
                if let Err(e) = packager.terminate().await {
                    warn!("Failed to stop packager: {}", e);
                }
            }

            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            error!("{}", failure);
            eprintln!("devrun: {}", failure);
            Ok(ExitCode::from(failure.exit_code()))
        }
    }
}

/// Resolves on SIGINT / SIGTERM. Never resolves if handlers cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = wait_for_signal().await {
        error!("Signal handler error: {}", e);
        std::future::pending::<()>().await;
    }
}

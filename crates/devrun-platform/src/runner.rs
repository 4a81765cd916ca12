//! Platform runner abstraction
//!
//! A runner drives one platform's build → install → launch workflow. The
//! orchestrator only sees [`PlatformRunner`]; [`NativeRunner`] is the enum of
//! the real implementations.

use std::path::PathBuf;

use devrun_core::prelude::*;
use devrun_core::{NativeBuildType, Platform, RunConfig};
use devrun_packager::PackagerReadiness;

use crate::android::AndroidRunner;
use crate::ios::IosRunner;

/// Everything a runner needs from the current run
#[derive(Debug, Clone)]
pub struct PlatformContext {
    pub root_dir: PathBuf,
    pub build_type: NativeBuildType,
    pub skip_uninstall: bool,
    pub packager_port: u16,
    /// `None` when the run skips the packager
    pub packager: Option<PackagerReadiness>,
}

impl PlatformContext {
    pub fn from_run_config(config: &RunConfig, packager: Option<PackagerReadiness>) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            build_type: config.build_type,
            skip_uninstall: config.skip_uninstall,
            packager_port: config.packager_port,
            packager,
        }
    }

    /// Block until the packager is up. Succeeds immediately without one.
    pub async fn wait_for_packager(&self) -> Result<()> {
        match &self.packager {
            Some(readiness) => readiness.require_up().await,
            None => Ok(()),
        }
    }
}

/// One platform's build/install/launch workflow
#[trait_variant::make(PlatformRunner: Send)]
pub trait LocalPlatformRunner {
    fn platform(&self) -> Platform;

    /// Run to completion. Errors are returned, never swallowed.
    async fn run(&self, ctx: &PlatformContext) -> Result<()>;
}

/// The concrete runners
#[derive(Debug)]
pub enum NativeRunner {
    Ios(IosRunner),
    Android(AndroidRunner),
}

impl PlatformRunner for NativeRunner {
    fn platform(&self) -> Platform {
        match self {
            NativeRunner::Ios(_) => Platform::Ios,
            NativeRunner::Android(_) => Platform::Android,
        }
    }

    async fn run(&self, ctx: &PlatformContext) -> Result<()> {
        match self {
            NativeRunner::Ios(runner) => PlatformRunner::run(runner, ctx).await,
            NativeRunner::Android(runner) => PlatformRunner::run(runner, ctx).await,
        }
    }
}

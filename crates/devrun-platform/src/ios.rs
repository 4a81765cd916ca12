//! iOS simulator runner: xcodebuild, then simctl install/launch per target

use std::path::{Path, PathBuf};

use devrun_core::prelude::*;
use devrun_core::{DeviceSelector, NativeBuildType, Platform};

use crate::commands::run_tool;
use crate::runner::{PlatformContext, PlatformRunner};
use crate::simulators::{boot_simulator, list_ios_simulators, resolve_targets, IosSimulator};
use crate::ToolAvailability;

/// Xcode container to build, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XcodeTarget {
    Workspace(PathBuf),
    Project(PathBuf),
}

/// What to build and launch on iOS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IosProject {
    pub target: XcodeTarget,
    pub scheme: String,
    pub bundle_id: String,
}

impl IosProject {
    /// `<root>/ios/build`
    pub fn derived_data_path(root_dir: &Path) -> PathBuf {
        root_dir.join("ios").join("build")
    }

    pub fn build_args(&self, root_dir: &Path, build_type: NativeBuildType) -> Vec<String> {
        let (flag, path) = match &self.target {
            XcodeTarget::Workspace(path) => ("-workspace", path),
            XcodeTarget::Project(path) => ("-project", path),
        };

        vec![
            flag.to_string(),
            root_dir.join(path).to_string_lossy().to_string(),
            "-scheme".to_string(),
            self.scheme.clone(),
            "-configuration".to_string(),
            build_type.variant().to_string(),
            "-sdk".to_string(),
            "iphonesimulator".to_string(),
            "-derivedDataPath".to_string(),
            Self::derived_data_path(root_dir).to_string_lossy().to_string(),
            "build".to_string(),
        ]
    }

    /// `<derived>/Build/Products/<cfg>-iphonesimulator/<scheme>.app`
    pub fn artifact_path(&self, root_dir: &Path, build_type: NativeBuildType) -> PathBuf {
        Self::derived_data_path(root_dir)
            .join("Build")
            .join("Products")
            .join(format!("{}-iphonesimulator", build_type.variant()))
            .join(format!("{}.app", self.scheme))
    }
}

#[derive(Debug, Clone)]
pub struct IosRunner {
    project: IosProject,
    selector: DeviceSelector,
    default_simulator: Option<String>,
    tools: ToolAvailability,
}

impl IosRunner {
    pub fn new(
        project: IosProject,
        selector: DeviceSelector,
        default_simulator: Option<String>,
        tools: ToolAvailability,
    ) -> Self {
        Self {
            project,
            selector,
            default_simulator,
            tools,
        }
    }

    pub fn project(&self) -> &IosProject {
        &self.project
    }

    async fn build(&self, ctx: &PlatformContext) -> Result<PathBuf> {
        let xcodebuild = self.tools.require_xcodebuild()?;

        info!(
            "[iOS] Building scheme {} ({})",
            self.project.scheme,
            ctx.build_type.variant()
        );
        run_tool(
            xcodebuild,
            self.project.build_args(&ctx.root_dir, ctx.build_type),
            Some(ctx.root_dir.as_path()),
        )
        .await?;

        let app = self.project.artifact_path(&ctx.root_dir, ctx.build_type);
        if !app.exists() {
            return Err(Error::artifact_missing(app));
        }
        Ok(app)
    }

    async fn install_and_launch(
        &self,
        xcrun: &Path,
        simulator: &IosSimulator,
        app: &Path,
        ctx: &PlatformContext,
    ) -> Result<()> {
        let udid = simulator.udid.as_str();
        let bundle_id = self.project.bundle_id.as_str();

        boot_simulator(xcrun, udid).await?;

        if !ctx.skip_uninstall {
            info!("[iOS] Uninstalling {} from {}", bundle_id, simulator.name);
            if let Err(e) = run_tool(xcrun, ["simctl", "uninstall", udid, bundle_id], None).await {
                warn!("[iOS] Uninstall failed on {} (ignored): {}", simulator.name, e);
            }
        }

        info!("[iOS] Installing on {}", simulator.name);
        let app = app.to_string_lossy().to_string();
        run_tool(xcrun, ["simctl", "install", udid, app.as_str()], None).await?;

        ctx.wait_for_packager().await?;

        info!("[iOS] Launching {} on {}", bundle_id, simulator.name);
        run_tool(xcrun, ["simctl", "launch", udid, bundle_id], None).await?;
        Ok(())
    }
}

impl PlatformRunner for IosRunner {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    async fn run(&self, ctx: &PlatformContext) -> Result<()> {
        let xcrun = self.tools.require_xcrun()?;

        let simulators = list_ios_simulators(xcrun).await?;
        let targets = resolve_targets(
            &simulators,
            &self.selector,
            self.default_simulator.as_deref(),
        )?;
        debug!(
            "[iOS] Targets for {}: {:?}",
            self.selector,
            targets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
        );

        let app = self.build(ctx).await?;

        for simulator in &targets {
            self.install_and_launch(xcrun, simulator, &app, ctx).await?;
        }

        info!("[iOS] Launched on {} simulator(s)", targets.len());
        Ok(())
    }
}

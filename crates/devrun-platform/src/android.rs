//! Android runner: gradle assemble, then adb install/reverse/launch per device

use std::path::{Path, PathBuf};

use devrun_core::prelude::*;
use devrun_core::{NativeBuildType, Platform};

use crate::commands::run_tool;
use crate::devices::{list_android_devices, AndroidDevice};
use crate::runner::{PlatformContext, PlatformRunner};
use crate::ToolAvailability;

/// What to install and launch on Android
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidProject {
    pub package: String,
    /// Fully qualified, or relative to `package` when it starts with '.'
    pub main_activity: String,
}

impl AndroidProject {
    /// `<package>/<activity>` as accepted by `am start -n`
    pub fn component(&self) -> String {
        format!("{}/{}", self.package, self.main_activity)
    }

    /// `<root>/android`
    pub fn android_dir(root_dir: &Path) -> PathBuf {
        root_dir.join("android")
    }

    pub fn gradle_wrapper(root_dir: &Path) -> PathBuf {
        let name = if cfg!(windows) { "gradlew.bat" } else { "gradlew" };
        Self::android_dir(root_dir).join(name)
    }

    /// `assembleDebug` / `assembleRelease`
    pub fn gradle_task(build_type: NativeBuildType) -> String {
        format!("assemble{}", build_type.variant())
    }

    /// `app/build/outputs/apk/<variant>/app-<variant>.apk`
    pub fn apk_path(root_dir: &Path, build_type: NativeBuildType) -> PathBuf {
        let variant = build_type.variant().to_lowercase();
        Self::android_dir(root_dir)
            .join("app")
            .join("build")
            .join("outputs")
            .join("apk")
            .join(&variant)
            .join(format!("app-{}.apk", variant))
    }
}

#[derive(Debug, Clone)]
pub struct AndroidRunner {
    project: AndroidProject,
    tools: ToolAvailability,
}

impl AndroidRunner {
    pub fn new(project: AndroidProject, tools: ToolAvailability) -> Self {
        Self { project, tools }
    }

    pub fn project(&self) -> &AndroidProject {
        &self.project
    }

    async fn build(&self, ctx: &PlatformContext) -> Result<PathBuf> {
        let gradlew = AndroidProject::gradle_wrapper(&ctx.root_dir);
        let task = AndroidProject::gradle_task(ctx.build_type);

        let android_dir = AndroidProject::android_dir(&ctx.root_dir);

        info!("[Android] Running gradle {}", task);
        run_tool(&gradlew, [task.as_str()], Some(android_dir.as_path())).await?;

        let apk = AndroidProject::apk_path(&ctx.root_dir, ctx.build_type);
        if !apk.exists() {
            return Err(Error::artifact_missing(apk));
        }
        Ok(apk)
    }

    async fn install_and_launch(
        &self,
        adb: &Path,
        device: &AndroidDevice,
        apk: &Path,
        ctx: &PlatformContext,
    ) -> Result<()> {
        let serial = device.serial.as_str();
        let package = self.project.package.as_str();
        let name = device.display_name();

        if !ctx.skip_uninstall {
            info!("[Android] Uninstalling {} from {}", package, name);
            if let Err(e) = run_tool(adb, ["-s", serial, "uninstall", package], None).await {
                warn!("[Android] Uninstall failed on {} (ignored): {}", name, e);
            }
        }

        info!("[Android] Installing on {}", name);
        let apk = apk.to_string_lossy().to_string();
        run_tool(adb, ["-s", serial, "install", "-r", apk.as_str()], None).await?;

        let port = format!("tcp:{}", ctx.packager_port);
        run_tool(adb, ["-s", serial, "reverse", port.as_str(), port.as_str()], None).await?;

        ctx.wait_for_packager().await?;

        info!("[Android] Launching {} on {}", package, name);
        let component = self.project.component();
        let output = run_tool(
            adb,
            ["-s", serial, "shell", "am", "start", "-n", component.as_str()],
            None,
        )
        .await?;

        // `am start` exits 0 even when the activity cannot be resolved
        if let Some(line) = output.stdout.lines().find(|l| l.starts_with("Error")) {
            return Err(Error::tool_failed(
                format!("adb -s {} shell am start -n {}", serial, component),
                None,
                line.trim(),
            ));
        }
        Ok(())
    }
}

impl PlatformRunner for AndroidRunner {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    async fn run(&self, ctx: &PlatformContext) -> Result<()> {
        let adb = self.tools.require_adb()?;

        let devices: Vec<AndroidDevice> = list_android_devices(adb)
            .await?
            .into_iter()
            .filter(|d| {
                if !d.is_online() {
                    warn!("[Android] Skipping {} ({})", d.serial, d.state);
                }
                d.is_online()
            })
            .collect();
        if devices.is_empty() {
            return Err(Error::device_not_found(
                Platform::Android,
                "any online device",
            ));
        }

        let apk = self.build(ctx).await?;

        for device in &devices {
            self.install_and_launch(adb, device, &apk, ctx).await?;
        }

        info!("[Android] Launched on {} device(s)", devices.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devrun_core::RunConfig;

    fn project() -> AndroidProject {
        AndroidProject {
            package: "com.example.app".into(),
            main_activity: ".MainActivity".into(),
        }
    }

    #[test]
    fn test_component() {
        assert_eq!(project().component(), "com.example.app/.MainActivity");
    }

    #[test]
    fn test_gradle_task() {
        assert_eq!(AndroidProject::gradle_task(NativeBuildType::Dev), "assembleDebug");
        assert_eq!(
            AndroidProject::gradle_task(NativeBuildType::Release),
            "assembleRelease"
        );
    }

    #[test]
    fn test_apk_path() {
        assert_eq!(
            AndroidProject::apk_path(Path::new("/p"), NativeBuildType::Dev),
            PathBuf::from("/p/android/app/build/outputs/apk/debug/app-debug.apk")
        );
        assert_eq!(
            AndroidProject::apk_path(Path::new("/p"), NativeBuildType::Release),
            PathBuf::from("/p/android/app/build/outputs/apk/release/app-release.apk")
        );
    }

    #[cfg(unix)]
    fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_no_online_device() {
        let temp = tempfile::tempdir().unwrap();
        let adb = temp.path().join("adb");
        write_script(
            &adb,
            "echo 'List of devices attached'\necho 'emulator-5554 offline'",
        );

        let runner = AndroidRunner::new(
            project(),
            ToolAvailability {
                adb: Some(adb),
                ..Default::default()
            },
        );
        let ctx = PlatformContext::from_run_config(&RunConfig::new(temp.path()), None);

        let err = PlatformRunner::run(&runner, &ctx).await.unwrap_err();
        assert!(matches!(
            err,
            Error::DeviceNotFound {
                platform: Platform::Android,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_apk_after_build() {
        let temp = tempfile::tempdir().unwrap();
        let adb = temp.path().join("adb");
        write_script(
            &adb,
            "echo 'List of devices attached'\necho 'emulator-5554 device model:Pixel_7'",
        );
        std::fs::create_dir_all(temp.path().join("android")).unwrap();
        write_script(&temp.path().join("android").join("gradlew"), "exit 0");

        let runner = AndroidRunner::new(
            project(),
            ToolAvailability {
                adb: Some(adb),
                ..Default::default()
            },
        );
        let ctx = PlatformContext::from_run_config(&RunConfig::new(temp.path()), None);

        let err = PlatformRunner::run(&runner, &ctx).await.unwrap_err();
        assert!(matches!(err, Error::BuildArtifactMissing { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_gradle_failure_propagates() {
        let temp = tempfile::tempdir().unwrap();
        let adb = temp.path().join("adb");
        write_script(
            &adb,
            "echo 'List of devices attached'\necho 'emulator-5554 device'",
        );
        std::fs::create_dir_all(temp.path().join("android")).unwrap();
        write_script(
            &temp.path().join("android").join("gradlew"),
            "echo 'BUILD FAILED' >&2\nexit 1",
        );

        let runner = AndroidRunner::new(
            project(),
            ToolAvailability {
                adb: Some(adb),
                ..Default::default()
            },
        );
        let ctx = PlatformContext::from_run_config(&RunConfig::new(temp.path()), None);

        let err = PlatformRunner::run(&runner, &ctx).await.unwrap_err();
        match err {
            Error::ToolFailed { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("BUILD FAILED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Stub adb that records every invocation and reports one online emulator
    #[cfg(unix)]
    struct RecordingAdb {
        temp: tempfile::TempDir,
        log: PathBuf,
    }

    #[cfg(unix)]
    impl RecordingAdb {
        fn new() -> Self {
            let temp = tempfile::tempdir().unwrap();
            let log = temp.path().join("adb.log");
            write_script(
                &temp.path().join("adb"),
                &format!(
                    "echo \"$*\" >> '{}'\n\
                     if [ \"$1\" = devices ]; then\n\
                     echo 'List of devices attached'\n\
                     echo 'emulator-5554 device model:Pixel_7'\n\
                     fi",
                    log.display()
                ),
            );

            let android = temp.path().join("android");
            std::fs::create_dir_all(&android).unwrap();
            write_script(&android.join("gradlew"), "exit 0");

            let apk = AndroidProject::apk_path(temp.path(), NativeBuildType::Dev);
            std::fs::create_dir_all(apk.parent().unwrap()).unwrap();
            std::fs::write(&apk, "").unwrap();

            Self { temp, log }
        }

        fn runner(&self) -> AndroidRunner {
            AndroidRunner::new(
                project(),
                ToolAvailability {
                    adb: Some(self.temp.path().join("adb")),
                    ..Default::default()
                },
            )
        }

        fn calls(&self) -> Vec<String> {
            std::fs::read_to_string(&self.log)
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }

        fn position(&self, needle: &str) -> Option<usize> {
            self.calls().iter().position(|call| call.contains(needle))
        }
    }

    /// Probe with a fixed answer
    #[cfg(unix)]
    struct FixedProbe(bool);

    #[cfg(unix)]
    impl devrun_packager::EndpointProbe for FixedProbe {
        async fn is_listening(&self, _endpoint: &devrun_core::PackagerEndpoint) -> bool {
            self.0
        }
    }

    #[cfg(unix)]
    fn packager_watcher(listening: bool) -> devrun_packager::PackagerWatcher<FixedProbe> {
        let watcher = devrun_packager::PackagerWatcher::new(
            devrun_core::PackagerEndpoint::localhost(8081),
            FixedProbe(listening),
            devrun_packager::WatchConfig {
                ready_timeout: std::time::Duration::from_millis(200),
                poll_interval: std::time::Duration::from_millis(20),
            },
        );
        watcher.start_watching_until_up();
        watcher
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreachable_packager_blocks_launch() {
        let adb = RecordingAdb::new();
        let watcher = packager_watcher(false);
        let ctx = PlatformContext::from_run_config(
            &RunConfig::new(adb.temp.path()),
            Some(watcher.readiness()),
        );

        let err = PlatformRunner::run(&adb.runner(), &ctx).await.unwrap_err();

        assert!(matches!(err, Error::PackagerUnreachable { .. }));
        assert!(adb.position("install -r").is_some());
        assert!(adb.position("reverse tcp:8081 tcp:8081").is_some());
        assert!(
            adb.position("am start").is_none(),
            "app must not launch without a packager: {:?}",
            adb.calls()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_follows_install_and_reverse() {
        let adb = RecordingAdb::new();
        let watcher = packager_watcher(true);
        let ctx = PlatformContext::from_run_config(
            &RunConfig::new(adb.temp.path()),
            Some(watcher.readiness()),
        );

        PlatformRunner::run(&adb.runner(), &ctx).await.unwrap();

        let uninstall = adb.position("uninstall com.example.app").unwrap();
        let install = adb.position("install -r").unwrap();
        let reverse = adb.position("reverse tcp:8081 tcp:8081").unwrap();
        let launch = adb
            .position("shell am start -n com.example.app/.MainActivity")
            .unwrap();

        assert!(uninstall < install);
        assert!(install < reverse);
        assert!(reverse < launch);
        assert!(adb.calls()[launch].starts_with("-s emulator-5554"));
    }
}

//! Run orchestration
//!
//! Sequences the config gates, brings up the packager, fans out to the
//! platform runners and decides the outcome. This is the only place that
//! terminates the packager.
//!
//! ```text
//! validate → generate → validate_down → start watching + launch
//!          → join_all(runners) → await readiness → Success | Failure (+ terminate)
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use futures_util::future::join_all;

use devrun_core::prelude::*;
use devrun_core::{DeviceSelector, Platform, PlatformReport, PlatformTaskResult, RunConfig};
use devrun_packager::{
    EndpointProbe, PackagerHandle, PackagerLauncher, PackagerWatcher, ProcessLauncher, TcpProbe,
};
use devrun_platform::{
    AndroidProject, AndroidRunner, IosProject, IosRunner, NativeRunner, PlatformContext,
    PlatformRunner, ToolAvailability, XcodeTarget,
};

use crate::config::{generate_config, validate_project, GenerateOptions, ProjectConfig, Settings};

// ─────────────────────────────────────────────────────────────────
// Seams
// ─────────────────────────────────────────────────────────────────

/// Pass/fail checks that run before anything is started
pub trait ConfigGate {
    fn validate(&self) -> Result<ProjectConfig>;

    fn generate(&self, project: &ProjectConfig) -> Result<()>;
}

/// Builds the platform runners for a validated project. Pure construction.
pub trait RunnerFactory {
    type Runner: PlatformRunner;

    fn runners(&self, project: &ProjectConfig) -> Result<Vec<Self::Runner>>;
}

/// [`ConfigGate`] backed by app.json validation and generated.json output
#[derive(Debug, Clone)]
pub struct ProjectGate {
    root_dir: PathBuf,
    config_path: PathBuf,
    platforms: BTreeSet<Platform>,
    generate: GenerateOptions,
}

impl ProjectGate {
    pub fn from_run_config(config: &RunConfig) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            config_path: config.config_path.clone(),
            platforms: config.platforms.clone(),
            generate: GenerateOptions {
                root_dir: config.root_dir.clone(),
                force_localhost: config.force_localhost,
                port: config.packager_port,
                build_type: config.build_type,
            },
        }
    }
}

impl ConfigGate for ProjectGate {
    fn validate(&self) -> Result<ProjectConfig> {
        validate_project(&self.config_path, &self.root_dir, &self.platforms)
    }

    fn generate(&self, project: &ProjectConfig) -> Result<()> {
        generate_config(&self.generate, project).map(|_| ())
    }
}

/// [`RunnerFactory`] producing the real iOS / Android runners
#[derive(Debug, Clone)]
pub struct NativeRunnerFactory {
    platforms: BTreeSet<Platform>,
    ios_devices: DeviceSelector,
    settings: Settings,
    tools: ToolAvailability,
}

impl NativeRunnerFactory {
    pub fn new(config: &RunConfig, settings: Settings, tools: ToolAvailability) -> Self {
        Self {
            platforms: config.platforms.clone(),
            ios_devices: config.ios_devices.clone(),
            settings,
            tools,
        }
    }

    fn ios_project(project: &ProjectConfig) -> Result<IosProject> {
        let ios = project
            .ios
            .as_ref()
            .ok_or_else(|| Error::config_invalid("missing \"ios\" section"))?;

        let target = match (&ios.workspace, &ios.project) {
            (Some(workspace), _) => XcodeTarget::Workspace(workspace.clone()),
            (None, Some(xcodeproj)) => XcodeTarget::Project(xcodeproj.clone()),
            (None, None) => {
                return Err(Error::config_invalid(
                    "ios.workspace or ios.project is required",
                ))
            }
        };

        Ok(IosProject {
            target,
            scheme: ios.scheme.clone().unwrap_or_else(|| project.name.clone()),
            bundle_id: ios.bundle_identifier.clone(),
        })
    }

    fn android_project(&self, project: &ProjectConfig) -> Result<AndroidProject> {
        let android = project
            .android
            .as_ref()
            .ok_or_else(|| Error::config_invalid("missing \"android\" section"))?;

        Ok(AndroidProject {
            package: android.package.clone(),
            main_activity: android
                .main_activity
                .clone()
                .unwrap_or_else(|| self.settings.android.main_activity.clone()),
        })
    }
}

impl RunnerFactory for NativeRunnerFactory {
    type Runner = NativeRunner;

    fn runners(&self, project: &ProjectConfig) -> Result<Vec<NativeRunner>> {
        self.platforms
            .iter()
            .map(|platform| -> Result<NativeRunner> {
                let runner = match platform {
                    Platform::Ios => NativeRunner::Ios(IosRunner::new(
                        Self::ios_project(project)?,
                        self.ios_devices.clone(),
                        self.settings.ios.default_simulator.clone(),
                        self.tools.clone(),
                    )),
                    Platform::Android => NativeRunner::Android(AndroidRunner::new(
                        self.android_project(project)?,
                        self.tools.clone(),
                    )),
                };
                Ok(runner)
            })
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────

/// A completed run. The packager (if launched) is still running.
#[derive(Debug)]
pub struct RunSuccess<H> {
    pub packager: Option<H>,
    pub reports: Vec<PlatformReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Bad config or port conflict; nothing was started
    Usage,
    /// The packager process could not be spawned
    Launch,
    /// The packager never became reachable
    ReadinessTimeout,
    /// A platform runner failed
    PlatformTask,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Usage => "usage error",
            FailureKind::Launch => "packager launch failed",
            FailureKind::ReadinessTimeout => "packager not ready",
            FailureKind::PlatformTask => "platform task failed",
        };
        f.write_str(s)
    }
}

/// A failed run with every error that was collected
#[derive(Debug)]
pub struct RunFailure {
    pub kind: FailureKind,
    pub errors: Vec<Error>,
}

impl RunFailure {
    pub fn new(kind: FailureKind, errors: Vec<Error>) -> Self {
        Self { kind, errors }
    }

    pub fn usage(error: Error) -> Self {
        Self::new(FailureKind::Usage, vec![error])
    }

    /// Readiness timeout wins; otherwise the first error decides
    pub fn from_errors(errors: Vec<Error>) -> Self {
        let kind = if errors
            .iter()
            .any(|e| e.kind() == ErrorKind::ReadinessTimeout)
        {
            FailureKind::ReadinessTimeout
        } else {
            match errors.first().map(Error::kind) {
                Some(ErrorKind::Usage) => FailureKind::Usage,
                _ => FailureKind::PlatformTask,
            }
        };
        Self::new(kind, errors)
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind {
            FailureKind::Usage => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for RunFailure {}

// ─────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────

pub struct Orchestrator<G, P, L, F> {
    config: RunConfig,
    gate: G,
    watcher: PackagerWatcher<P>,
    launcher: L,
    factory: F,
}

/// The orchestrator wired to real components
pub type NativeOrchestrator =
    Orchestrator<ProjectGate, TcpProbe, ProcessLauncher, NativeRunnerFactory>;

impl NativeOrchestrator {
    pub fn native(config: RunConfig, settings: Settings, tools: ToolAvailability) -> Self {
        let gate = ProjectGate::from_run_config(&config);
        let watcher = PackagerWatcher::tcp(config.endpoint(), settings.packager.watch_config());
        let launcher =
            ProcessLauncher::new(config.root_dir.clone(), settings.packager.packager_command());
        let factory = NativeRunnerFactory::new(&config, settings, tools);
        Orchestrator::new(config, gate, watcher, launcher, factory)
    }
}

impl<G, P, L, F> Orchestrator<G, P, L, F>
where
    G: ConfigGate,
    P: EndpointProbe + Sync + 'static,
    L: PackagerLauncher,
    F: RunnerFactory,
{
    pub fn new(
        config: RunConfig,
        gate: G,
        watcher: PackagerWatcher<P>,
        launcher: L,
        factory: F,
    ) -> Self {
        Self {
            config,
            gate,
            watcher,
            launcher,
            factory,
        }
    }

    /// Execute one run. Only returns once every runner has settled.
    pub async fn run(self) -> std::result::Result<RunSuccess<L::Handle>, RunFailure> {
        let Self {
            config,
            gate,
            watcher,
            launcher,
            factory,
        } = self;

        let project = gate.validate().map_err(RunFailure::usage)?;
        gate.generate(&project).map_err(RunFailure::usage)?;
        let runners = factory.runners(&project).map_err(RunFailure::usage)?;

        if !watcher.validate_down(config.no_packager).await {
            return Err(RunFailure::usage(Error::port_in_use(watcher.endpoint())));
        }

        watcher.start_watching_until_up();

        let mut packager: Option<L::Handle> = None;
        if config.no_packager {
            info!("Skipping packager (--no-packager)");
        } else {
            match launcher.launch(watcher.endpoint(), config.reset_cache).await {
                Ok(handle) => packager = Some(handle),
                Err(e) => {
                    error!("Failed to launch packager: {}", e);
                    return Err(RunFailure::new(FailureKind::Launch, vec![e]));
                }
            }
        }

        let readiness = packager.as_ref().map(|_| watcher.readiness());
        let ctx = PlatformContext::from_run_config(&config, readiness);

        let reports = join_all(runners.iter().map(|runner| run_branch(runner, &ctx))).await;

        let mut errors = Vec::new();
        let mut succeeded = Vec::new();
        for report in reports {
            match report.result {
                PlatformTaskResult::Success => succeeded.push(report),
                PlatformTaskResult::Failed(e) => errors.push(e),
            }
        }

        if errors.is_empty() && packager.is_some() {
            if let Err(e) = watcher.readiness().require_up().await {
                errors.push(e);
            }
        }

        if !errors.is_empty() {
            if let Some(mut handle) = packager.take() {
                stop_packager(&mut handle).await;
            }
            return Err(RunFailure::from_errors(errors));
        }

        info!("All platform tasks finished");
        Ok(RunSuccess {
            packager,
            reports: succeeded,
        })
    }
}

async fn run_branch<R: PlatformRunner>(runner: &R, ctx: &PlatformContext) -> PlatformReport {
    let platform = runner.platform();
    info!("[{}] Starting", platform);

    let result = PlatformTaskResult::from(runner.run(ctx).await);
    match &result {
        PlatformTaskResult::Success => info!("[{}] Done", platform),
        PlatformTaskResult::Failed(e) => error!("[{}] Failed: {}", platform, e),
    }

    PlatformReport { platform, result }
}

/// Terminate failures are logged and never replace the primary failure
async fn stop_packager<H: PackagerHandle>(handle: &mut H) {
    info!("Stopping packager (pid {:?})", handle.id());
    if let Err(e) = handle.terminate().await {
        warn!("Failed to stop packager: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use devrun_core::PackagerEndpoint;
    use devrun_packager::WatchConfig;

    // ── fakes ────────────────────────────────────────────────────

    #[derive(Default)]
    struct FakeGate {
        invalid: bool,
    }

    impl ConfigGate for FakeGate {
        fn validate(&self) -> Result<ProjectConfig> {
            if self.invalid {
                Err(Error::config_invalid("\"name\" must not be empty"))
            } else {
                Ok(ProjectConfig::default())
            }
        }

        fn generate(&self, _project: &ProjectConfig) -> Result<()> {
            Ok(())
        }
    }

    /// Listening once `open` is set
    struct FakeProbe {
        open: Arc<AtomicBool>,
        calls: Arc<AtomicUsize>,
    }

    impl EndpointProbe for FakeProbe {
        async fn is_listening(&self, _endpoint: &PackagerEndpoint) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.open.load(Ordering::SeqCst)
        }
    }

    #[derive(Debug)]
    struct FakeHandle {
        terminated: Arc<AtomicUsize>,
    }

    impl PackagerHandle for FakeHandle {
        fn id(&self) -> Option<u32> {
            Some(4242)
        }

        fn has_exited(&self) -> bool {
            self.terminated.load(Ordering::SeqCst) > 0
        }

        async fn terminate(&mut self) -> Result<()> {
            self.terminated.fetch_add(1, Ordering::SeqCst);
            Err(Error::process_kill("already gone"))
        }
    }

    struct FakeLauncher {
        /// Port opens when the packager is launched
        opens_port: Option<Arc<AtomicBool>>,
        fail: bool,
        launched: Arc<AtomicUsize>,
        terminated: Arc<AtomicUsize>,
    }

    impl PackagerLauncher for FakeLauncher {
        type Handle = FakeHandle;

        async fn launch(&self, _endpoint: &PackagerEndpoint, _reset: bool) -> Result<FakeHandle> {
            if self.fail {
                return Err(Error::packager_spawn("npx: not found"));
            }
            self.launched.fetch_add(1, Ordering::SeqCst);
            if let Some(open) = &self.opens_port {
                open.store(true, Ordering::SeqCst);
            }
            Ok(FakeHandle {
                terminated: Arc::clone(&self.terminated),
            })
        }
    }

    #[derive(Clone)]
    struct FakeRunner {
        platform: Platform,
        delay: Duration,
        fail: bool,
        started: Arc<AtomicUsize>,
        finished: Arc<AtomicBool>,
        saw_packager: Arc<AtomicBool>,
    }

    impl FakeRunner {
        fn new(platform: Platform, delay_ms: u64, fail: bool) -> Self {
            Self {
                platform,
                delay: Duration::from_millis(delay_ms),
                fail,
                started: Arc::new(AtomicUsize::new(0)),
                finished: Arc::new(AtomicBool::new(false)),
                saw_packager: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl PlatformRunner for FakeRunner {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn run(&self, ctx: &PlatformContext) -> Result<()> {
            self.started.fetch_add(1, Ordering::SeqCst);
            self.saw_packager
                .store(ctx.packager.is_some(), Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            let result = if self.fail {
                Err(Error::device_not_found(self.platform, "Pixel 99"))
            } else {
                ctx.wait_for_packager().await
            };
            self.finished.store(true, Ordering::SeqCst);
            result
        }
    }

    struct FakeFactory(Vec<FakeRunner>);

    impl RunnerFactory for FakeFactory {
        type Runner = FakeRunner;

        fn runners(&self, _project: &ProjectConfig) -> Result<Vec<FakeRunner>> {
            Ok(self.0.clone())
        }
    }

    // ── harness ──────────────────────────────────────────────────

    struct Harness {
        port_open: Arc<AtomicBool>,
        probes: Arc<AtomicUsize>,
        launched: Arc<AtomicUsize>,
        terminated: Arc<AtomicUsize>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                port_open: Arc::new(AtomicBool::new(false)),
                probes: Arc::new(AtomicUsize::new(0)),
                launched: Arc::new(AtomicUsize::new(0)),
                terminated: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn orchestrator(
            &self,
            config: RunConfig,
            gate: FakeGate,
            runners: Vec<FakeRunner>,
            packager_binds: bool,
        ) -> Orchestrator<FakeGate, FakeProbe, FakeLauncher, FakeFactory> {
            let watcher = PackagerWatcher::new(
                config.endpoint(),
                FakeProbe {
                    open: Arc::clone(&self.port_open),
                    calls: Arc::clone(&self.probes),
                },
                WatchConfig {
                    ready_timeout: Duration::from_secs(5),
                    poll_interval: Duration::from_millis(100),
                },
            );
            let launcher = FakeLauncher {
                opens_port: packager_binds.then(|| Arc::clone(&self.port_open)),
                fail: false,
                launched: Arc::clone(&self.launched),
                terminated: Arc::clone(&self.terminated),
            };
            Orchestrator::new(config, gate, watcher, launcher, FakeFactory(runners))
        }
    }

    fn run_config(platforms: &[Platform]) -> RunConfig {
        let mut config = RunConfig::new("/projects/app");
        config.platforms = platforms.iter().copied().collect();
        config
    }

    // ── tests ────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_success_leaves_packager_running() {
        let h = Harness::new();
        let ios = FakeRunner::new(Platform::Ios, 50, false);
        let orchestrator = h.orchestrator(
            run_config(&[Platform::Ios]),
            FakeGate::default(),
            vec![ios.clone()],
            true,
        );

        let success = orchestrator.run().await.unwrap();
        assert!(success.packager.is_some());
        assert_eq!(success.reports.len(), 1);
        assert_eq!(success.reports[0].platform, Platform::Ios);
        assert!(ios.saw_packager.load(Ordering::SeqCst));
        assert_eq!(h.launched.load(Ordering::SeqCst), 1);
        assert_eq!(h.terminated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_starts_nothing() {
        let h = Harness::new();
        let runner = FakeRunner::new(Platform::Ios, 0, false);
        let orchestrator = h.orchestrator(
            run_config(&[Platform::Ios]),
            FakeGate { invalid: true },
            vec![runner.clone()],
            true,
        );

        let failure = orchestrator.run().await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Usage);
        assert_eq!(failure.exit_code(), 1);
        assert_eq!(h.probes.load(Ordering::SeqCst), 0);
        assert_eq!(h.launched.load(Ordering::SeqCst), 0);
        assert_eq!(runner.started.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_occupied_port_spawns_nothing() {
        let h = Harness::new();
        h.port_open.store(true, Ordering::SeqCst);
        let ios = FakeRunner::new(Platform::Ios, 0, false);
        let android = FakeRunner::new(Platform::Android, 0, false);
        let orchestrator = h.orchestrator(
            run_config(&[Platform::Ios, Platform::Android]),
            FakeGate::default(),
            vec![ios.clone(), android.clone()],
            true,
        );

        let failure = orchestrator.run().await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Usage);
        assert!(matches!(failure.errors[0], Error::PortInUse { .. }));
        assert_eq!(h.probes.load(Ordering::SeqCst), 1);
        assert_eq!(h.launched.load(Ordering::SeqCst), 0);
        assert_eq!(ios.started.load(Ordering::SeqCst), 0);
        assert_eq!(android.started.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_packager_never_probes_or_launches() {
        let h = Harness::new();
        // Something is listening, but it must not matter
        h.port_open.store(true, Ordering::SeqCst);
        let mut config = run_config(&[Platform::Android]);
        config.no_packager = true;
        let android = FakeRunner::new(Platform::Android, 10, false);

        let orchestrator = h.orchestrator(config, FakeGate::default(), vec![android.clone()], true);
        let success = orchestrator.run().await.unwrap();

        assert!(success.packager.is_none());
        assert_eq!(h.launched.load(Ordering::SeqCst), 0);
        assert!(!android.saw_packager.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_waits_for_sibling_then_cleans_up_once() {
        let h = Harness::new();
        let ios = FakeRunner::new(Platform::Ios, 10, true);
        let android = FakeRunner::new(Platform::Android, 2_000, false);
        let orchestrator = h.orchestrator(
            run_config(&[Platform::Ios, Platform::Android]),
            FakeGate::default(),
            vec![ios.clone(), android.clone()],
            true,
        );

        let failure = orchestrator.run().await.unwrap_err();

        assert!(android.finished.load(Ordering::SeqCst));
        assert_eq!(failure.kind, FailureKind::PlatformTask);
        assert_eq!(failure.exit_code(), 2);
        assert_eq!(failure.errors.len(), 1);
        assert_eq!(h.terminated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_errors_collected_cleanup_once() {
        let h = Harness::new();
        let orchestrator = h.orchestrator(
            run_config(&[Platform::Ios, Platform::Android]),
            FakeGate::default(),
            vec![
                FakeRunner::new(Platform::Ios, 10, true),
                FakeRunner::new(Platform::Android, 20, true),
            ],
            true,
        );

        let failure = orchestrator.run().await.unwrap_err();
        assert_eq!(failure.errors.len(), 2);
        assert_eq!(h.terminated.load(Ordering::SeqCst), 1);
        assert!(failure.to_string().contains("No iOS device found"));
        assert!(failure.to_string().contains("No Android device found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_packager_never_ready_is_readiness_timeout() {
        let h = Harness::new();
        let android = FakeRunner::new(Platform::Android, 0, false);
        let orchestrator = h.orchestrator(
            run_config(&[Platform::Android]),
            FakeGate::default(),
            vec![android],
            false,
        );

        let failure = orchestrator.run().await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::ReadinessTimeout);
        assert_eq!(failure.exit_code(), 2);
        assert_eq!(h.terminated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_readiness_checked_without_runners() {
        let h = Harness::new();
        let orchestrator = h.orchestrator(run_config(&[]), FakeGate::default(), vec![], false);

        let failure = orchestrator.run().await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::ReadinessTimeout);
        assert_eq!(h.terminated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_launch_failure_has_nothing_to_clean_up() {
        let h = Harness::new();
        let runner = FakeRunner::new(Platform::Ios, 0, false);
        let mut orchestrator = h.orchestrator(
            run_config(&[Platform::Ios]),
            FakeGate::default(),
            vec![runner.clone()],
            true,
        );
        orchestrator.launcher.fail = true;

        let failure = orchestrator.run().await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Launch);
        assert_eq!(h.terminated.load(Ordering::SeqCst), 0);
        assert_eq!(runner.started.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failure_kind_from_errors() {
        let failure = RunFailure::from_errors(vec![
            Error::device_not_found(Platform::Ios, "iPhone 99"),
            Error::packager_unreachable("127.0.0.1:8081", Duration::from_secs(5)),
        ]);
        assert_eq!(failure.kind, FailureKind::ReadinessTimeout);

        let failure = RunFailure::from_errors(vec![Error::tool_failed("adb", Some(1), "x")]);
        assert_eq!(failure.kind, FailureKind::PlatformTask);

        let failure = RunFailure::from_errors(vec![Error::ChannelClosed]);
        assert_eq!(failure.kind, FailureKind::PlatformTask);
    }

    #[test]
    fn test_native_factory_builds_selected_runners() {
        let mut config = run_config(&[Platform::Ios, Platform::Android]);
        config.ios_devices = DeviceSelector::Names(vec!["iPhone 15".into()]);
        let factory =
            NativeRunnerFactory::new(&config, Settings::default(), ToolAvailability::default());

        let project: ProjectConfig = serde_json::from_str(
            r#"{
                "name": "Example",
                "ios": { "bundleIdentifier": "com.example.app", "project": "ios/Example.xcodeproj" },
                "android": { "package": "com.example.app" }
            }"#,
        )
        .unwrap();

        let runners = factory.runners(&project).unwrap();
        assert_eq!(runners.len(), 2);

        match &runners[0] {
            NativeRunner::Ios(ios) => {
                assert_eq!(ios.project().scheme, "Example");
                assert_eq!(
                    ios.project().target,
                    XcodeTarget::Project("ios/Example.xcodeproj".into())
                );
            }
            other => panic!("expected iOS runner, got {other:?}"),
        }
        match &runners[1] {
            NativeRunner::Android(android) => {
                assert_eq!(android.project().main_activity, ".MainActivity");
            }
            other => panic!("expected Android runner, got {other:?}"),
        }
    }

    #[test]
    fn test_native_factory_missing_section() {
        let factory = NativeRunnerFactory::new(
            &run_config(&[Platform::Android]),
            Settings::default(),
            ToolAvailability::default(),
        );
        let err = factory.runners(&ProjectConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}

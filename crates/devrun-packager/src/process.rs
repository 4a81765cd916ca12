//! Packager process management

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Notify};
use tokio::time::timeout;

use devrun_core::prelude::*;
use devrun_core::PackagerEndpoint;

/// How long `terminate()` waits for the kill to be confirmed
const KILL_TIMEOUT: Duration = Duration::from_secs(5);

/// Reply channel for a kill request, carrying the result of `Child::kill`
type KillReply = oneshot::Sender<std::io::Result<()>>;

/// Command line used to start the packager (port flags are appended)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PackagerCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a `["program", "arg", ...]` list as found in settings
    pub fn from_parts(parts: &[String]) -> Result<Self> {
        match parts.split_first() {
            Some((program, args)) if !program.trim().is_empty() => {
                Ok(Self::new(program.clone(), args.to_vec()))
            }
            _ => Err(Error::config_invalid("packager command must not be empty")),
        }
    }

    /// Full argument list for a launch on `endpoint`
    pub fn build_args(&self, endpoint: &PackagerEndpoint, reset_cache: bool) -> Vec<String> {
        let mut args = self.args.clone();
        args.push("--port".to_string());
        args.push(endpoint.port.to_string());
        if reset_cache {
            args.push("--reset-cache".to_string());
        }
        args
    }
}

impl Default for PackagerCommand {
    fn default() -> Self {
        Self::new(
            "npx",
            vec!["react-native".to_string(), "start".to_string()],
        )
    }
}

impl fmt::Display for PackagerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Cloneable observer for the packager's exit
#[derive(Debug, Clone, Default)]
pub struct ExitSignal {
    exited: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ExitSignal {
    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    /// Resolve once the process has exited
    pub async fn wait(&self) {
        // Create the `notified()` future before checking the flag so a
        // notification between the check and the await is not lost.
        let notified = self.notify.notified();
        if self.has_exited() {
            return;
        }
        notified.await;
    }

    fn mark_exited(&self) {
        self.exited.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }
}

/// Owns the spawned packager process.
///
/// The `Child` lives in a dedicated wait task. This struct keeps a kill channel,
/// the pid for logging and an [`ExitSignal`] for synchronous exit checks.
pub struct PackagerProcess {
    pid: Option<u32>,
    /// Consumed by the first kill request (terminate or drop)
    kill_tx: Option<oneshot::Sender<KillReply>>,
    exit: ExitSignal,
}

impl PackagerProcess {
    /// Spawn the packager in `root_dir`, listening on `endpoint`
    pub fn spawn(
        root_dir: &Path,
        command: &PackagerCommand,
        endpoint: &PackagerEndpoint,
        reset_cache: bool,
    ) -> Result<Self> {
        let args = command.build_args(endpoint, reset_cache);
        info!("Starting packager: {} {}", command.program, args.join(" "));

        let mut child = Command::new(&command.program)
            .args(&args)
            .current_dir(root_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::packager_spawn(format!("'{}' not found in PATH", command.program))
                } else {
                    Error::packager_spawn(e.to_string())
                }
            })?;

        let pid = child.id();
        info!("Packager started with PID: {:?}", pid);

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(Self::stdout_reader(stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(Self::stderr_reader(stderr));
        }

        Ok(Self::from_child(child, pid))
    }

    /// Hand `child` to a wait task and keep the control half
    fn from_child(child: Child, pid: Option<u32>) -> Self {
        let exit = ExitSignal::default();
        let (kill_tx, kill_rx) = oneshot::channel::<KillReply>();

        tokio::spawn(Self::wait_for_exit(child, kill_rx, exit.clone()));

        Self {
            pid,
            kill_tx: Some(kill_tx),
            exit,
        }
    }

    /// Background task: owns `child`, waits for it to exit.
    ///
    /// A kill request (or the control half being dropped) kills the child first.
    async fn wait_for_exit(mut child: Child, kill_rx: oneshot::Receiver<KillReply>, exit: ExitSignal) {
        let mut reply: Option<KillReply> = None;
        let mut kill_result: std::io::Result<()> = Ok(());

        let status = tokio::select! {
            result = child.wait() => result,
            request = kill_rx => {
                info!("Kill requested, stopping packager");
                reply = request.ok();
                kill_result = child.kill().await;
                if let Err(e) = &kill_result {
                    error!("Failed to kill packager: {}", e);
                }
                child.wait().await
            }
        };

        match status {
            Ok(status) => info!("Packager exited with status: {}", status),
            Err(e) => error!("Error waiting for packager: {}", e),
        }

        // Flag before replying so `terminate()` observes the exit.
        exit.mark_exited();

        if let Some(reply) = reply {
            let _ = reply.send(kill_result);
        }
    }

    async fn stdout_reader(stdout: tokio::process::ChildStdout) {
        let mut reader = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = reader.next_line().await {
            info!(target: "packager", "{}", line);
        }
        debug!("packager stdout closed");
    }

    async fn stderr_reader(stderr: tokio::process::ChildStderr) {
        let mut reader = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = reader.next_line().await {
            warn!(target: "packager", "{}", line);
        }
        debug!("packager stderr closed");
    }

    /// Stop the packager. Safe to call on an already-exited process.
    pub async fn terminate(&mut self) -> Result<()> {
        if self.has_exited() {
            info!("Packager already exited, nothing to stop");
            return Ok(());
        }

        let Some(kill_tx) = self.kill_tx.take() else {
            // A kill was requested earlier; just wait for it to land.
            return match timeout(KILL_TIMEOUT, self.exit.wait()).await {
                Ok(()) => Ok(()),
                Err(_) => Err(Error::process_kill(format!(
                    "packager still running {:?} after kill",
                    KILL_TIMEOUT
                ))),
            };
        };

        info!("Stopping packager (PID {:?})", self.pid);
        let (reply_tx, reply_rx) = oneshot::channel();
        if kill_tx.send(reply_tx).is_err() {
            debug!("Packager wait task already finished");
            return Ok(());
        }

        match timeout(KILL_TIMEOUT, reply_rx).await {
            Ok(Ok(Ok(()))) => {
                info!("Packager stopped");
                Ok(())
            }
            Ok(Ok(Err(e))) if self.has_exited() => {
                info!("Packager was already gone ({}), treating as stopped", e);
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(Error::process_kill(e.to_string())),
            // Wait task finished without replying: the process is gone.
            Ok(Err(_)) => Ok(()),
            Err(_) => Err(Error::process_kill(format!(
                "no exit confirmation within {:?}",
                KILL_TIMEOUT
            ))),
        }
    }

    /// Resolve when the packager exits on its own (or is killed)
    pub async fn wait(&self) {
        self.exit.wait().await
    }

    pub fn exit_signal(&self) -> ExitSignal {
        self.exit.clone()
    }

    pub fn has_exited(&self) -> bool {
        self.exit.has_exited()
    }

    pub fn is_running(&self) -> bool {
        !self.has_exited()
    }

    pub fn id(&self) -> Option<u32> {
        self.pid
    }
}

impl Drop for PackagerProcess {
    fn drop(&mut self) {
        if !self.has_exited() {
            if let Some(tx) = self.kill_tx.take() {
                warn!("PackagerProcess dropped while running, stopping it");
                let (reply_tx, _) = oneshot::channel();
                let _ = tx.send(reply_tx);
            }
        }
        // kill_on_drop(true) on the Child is the final safety net.
    }
}

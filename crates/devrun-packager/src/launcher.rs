//! Seams between the orchestrator and the packager process
//!
//! The orchestrator only needs to start a packager and later ask it to stop.
//! Keeping that behind two small traits lets the failure and cleanup policy be
//! exercised with fake handles.

use std::path::PathBuf;

use devrun_core::prelude::*;
use devrun_core::PackagerEndpoint;

use crate::process::{PackagerCommand, PackagerProcess};

/// A running packager the orchestrator may terminate
#[trait_variant::make(PackagerHandle: Send)]
pub trait LocalPackagerHandle {
    fn id(&self) -> Option<u32>;

    fn has_exited(&self) -> bool;

    /// Stop the process. Must succeed (or fail harmlessly) if it already exited.
    async fn terminate(&mut self) -> Result<()>;
}

/// Starts the packager process
#[trait_variant::make(PackagerLauncher: Send)]
pub trait LocalPackagerLauncher {
    type Handle: PackagerHandle;

    async fn launch(&self, endpoint: &PackagerEndpoint, reset_cache: bool) -> Result<Self::Handle>;
}

impl PackagerHandle for PackagerProcess {
    fn id(&self) -> Option<u32> {
        PackagerProcess::id(self)
    }

    fn has_exited(&self) -> bool {
        PackagerProcess::has_exited(self)
    }

    async fn terminate(&mut self) -> Result<()> {
        PackagerProcess::terminate(self).await
    }
}

/// Launches the configured packager command as a child process
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    root_dir: PathBuf,
    command: PackagerCommand,
}

impl ProcessLauncher {
    pub fn new(root_dir: impl Into<PathBuf>, command: PackagerCommand) -> Self {
        Self {
            root_dir: root_dir.into(),
            command,
        }
    }

    pub fn command(&self) -> &PackagerCommand {
        &self.command
    }
}

impl PackagerLauncher for ProcessLauncher {
    type Handle = PackagerProcess;

    async fn launch(&self, endpoint: &PackagerEndpoint, reset_cache: bool) -> Result<PackagerProcess> {
        PackagerProcess::spawn(&self.root_dir, &self.command, endpoint, reset_cache)
    }
}

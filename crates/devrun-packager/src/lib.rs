//! # devrun-packager - Packager Lifecycle
//!
//! Starts the packager (bundler) process and watches its endpoint until it
//! accepts connections.
//!
//! ## Public API
//!
//! ### Readiness
//! - [`PackagerWatcher`] - Down → Starting → {Up | Failed} state machine
//! - [`PackagerReadiness`] - Cloneable handle consumers await before using the packager
//! - [`EndpointProbe`], [`TcpProbe`] - Liveness probes
//!
//! ### Process
//! - [`PackagerProcess`] - Spawned packager with idempotent `terminate()`
//! - [`PackagerLauncher`], [`PackagerHandle`] - Seams used by the orchestrator
//! - [`ProcessLauncher`] - Launcher backed by [`PackagerProcess`]

pub mod launcher;
pub mod probe;
pub mod process;
pub mod watcher;

pub use launcher::{
    LocalPackagerHandle, LocalPackagerLauncher, PackagerHandle, PackagerLauncher, ProcessLauncher,
};
pub use probe::{EndpointProbe, LocalEndpointProbe, TcpProbe};
pub use process::{ExitSignal, PackagerCommand, PackagerProcess};
pub use watcher::{
    PackagerReadiness, PackagerWatcher, WatchConfig, DEFAULT_POLL_INTERVAL, DEFAULT_READY_TIMEOUT,
};
